//! Ordered middleware chains.
//!
//! A [`Pipe`] is built once at startup and shared by every request. It holds
//! no per-request state: each [`Pipe::dispatch`] starts a new traversal with
//! its own [`Next`], so the same pipe can serve any number of requests
//! concurrently.

use std::sync::Arc;

use tracing::trace;

use crate::error::Result;
use crate::middleware::{BoxFuture, BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::server::Server;

/// An ordered chain of middlewares.
///
/// Middlewares run in the order they were added. A pipe is itself a
/// [`Middleware`], so pipes nest: when a nested pipe runs out of
/// middlewares, the request continues in the enclosing chain.
///
/// ```rust
/// use conduit::{Pipe, PrefixRouter, Request, Response, Router, middleware::Trace};
///
/// async fn index(_req: Request) -> Response { Response::text("home") }
/// async fn article(req: Request) -> Response {
///     Response::text(req.attribute("id").unwrap_or_default().to_owned())
/// }
///
/// let app = Pipe::new()
///     .with(Trace)
///     .with(PrefixRouter::new()
///         .mount("/api/", Router::new().get("/api/articles/{id:[0-9]+}", article))
///         .mount("/", Router::new().get("/", index)));
/// ```
#[derive(Clone, Default)]
pub struct Pipe {
    middlewares: Vec<BoxedMiddleware>,
}

impl Pipe {
    pub fn new() -> Self {
        Self { middlewares: Vec::new() }
    }

    /// Appends a middleware to the end of the chain. Returns `self` for chaining.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize { self.middlewares.len() }
    pub fn is_empty(&self) -> bool { self.middlewares.is_empty() }

    /// Runs `req` through the chain from the first middleware.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChainExhausted`](crate::Error::ChainExhausted) if every
    /// middleware delegated onward and none produced a response. That is a
    /// composition bug, not a routing outcome: end a top-level pipe with
    /// something that always answers, such as a [`Router`](crate::Router).
    pub async fn dispatch(&self, req: Request) -> Result<Response> {
        trace!(middlewares = self.middlewares.len(), path = %req.path(), "dispatch");
        Next::new(&self.middlewares, None).handle(req).await
    }

    /// Serves this pipe with `server` until shutdown.
    ///
    /// The server is the request source and the response emitter: it reads
    /// requests off the socket, dispatches each one here and writes the
    /// result back.
    pub async fn run(self, server: Server) -> Result<()> {
        server.serve(self).await
    }
}

impl Middleware for Pipe {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        Next::new(&self.middlewares, Some(next)).handle(req)
    }
}

impl FromIterator<BoxedMiddleware> for Pipe {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware>>(iter: I) -> Self {
        Self { middlewares: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Method, StatusCode};

    struct Forward;

    impl Middleware for Forward {
        fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
            next.handle(req)
        }
    }

    struct Echo;

    impl Middleware for Echo {
        fn process<'a>(&'a self, req: Request, _next: Next<'a>) -> BoxFuture<'a> {
            Box::pin(async move { Ok(Response::text(req.path().to_owned())) })
        }
    }

    #[test]
    fn builder_counts_middlewares() {
        let pipe = Pipe::new().with(Forward).with(Echo);
        assert_eq!(pipe.len(), 2);
        assert!(!pipe.is_empty());
        assert!(Pipe::default().is_empty());
    }

    #[tokio::test]
    async fn empty_pipe_is_exhausted() {
        let err = Pipe::new()
            .dispatch(Request::new(Method::Get, "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChainExhausted));
    }

    #[tokio::test]
    async fn collects_from_boxed_middlewares() {
        let chain: Vec<BoxedMiddleware> = vec![Arc::new(Forward), Arc::new(Echo)];
        let pipe: Pipe = chain.into_iter().collect();

        let res = pipe.dispatch(Request::new(Method::Get, "/x")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"/x");
    }
}
