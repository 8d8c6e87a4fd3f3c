//! Middleware layer.
//!
//! A middleware receives the request and a [`Next`] continuation. It either
//! produces a response itself or hands the request onward with
//! [`Next::handle`]. Work done after `handle` returns runs "on the way out",
//! after every later middleware has finished, which gives the usual onion
//! ordering:
//!
//! ```text
//! Pipe [A, B, C]
//!   A before ─► B before ─► C ─► B after ─► A after
//! ```
//!
//! # Why `Next` is consumed
//!
//! `Next` holds the part of the chain that has not run yet. It is created
//! fresh for every traversal and moved into each middleware, so two requests
//! going through the same [`Pipe`](crate::Pipe) at the same time never share
//! a cursor, and no middleware can resume the chain twice.
//!
//! Built-in middleware:
//! - [`Trace`]: per-request span with method, path, status, latency

mod trace;

pub use trace::Trace;

use std::future::{Future, ready};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;

/// The future every middleware returns.
///
/// `Err` is reserved for broken compositions and infrastructure failures.
/// Routing misses are ordinary `Ok` responses.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'a>>;

/// A type-erased middleware, shareable between pipes and threads.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A unit of request processing.
///
/// ```rust
/// use conduit::middleware::{BoxFuture, Middleware, Next};
/// use conduit::{Request, Response, StatusCode};
///
/// struct RequireToken;
///
/// impl Middleware for RequireToken {
///     fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
///         if req.header("authorization").is_none() {
///             return Box::pin(async { Ok(Response::status(StatusCode::UNAUTHORIZED)) });
///         }
///         next.handle(req)
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        (**self).process(req, next)
    }
}

/// The rest of a middleware chain.
///
/// Passed to every [`Middleware::process`] call. When the local chain is
/// used up, `handle` falls through to the terminal continuation: the `next`
/// an enclosing pipe handed in. A top-level traversal has no terminal, so
/// running off its end is an [`Error::ChainExhausted`].
pub struct Next<'a> {
    chain: &'a [BoxedMiddleware],
    terminal: Option<Box<Next<'a>>>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [BoxedMiddleware], terminal: Option<Next<'a>>) -> Self {
        Self { chain, terminal: terminal.map(Box::new) }
    }

    /// A continuation with nothing left to run.
    ///
    /// Handy for calling a middleware directly, outside any pipe.
    pub fn end() -> Self {
        Self { chain: &[], terminal: None }
    }

    /// Number of middlewares still ahead in the local chain.
    pub(crate) fn remaining(&self) -> usize {
        self.chain.len()
    }

    /// Runs the next middleware, or the terminal continuation once the local
    /// chain is used up.
    pub fn handle(self, req: Request) -> BoxFuture<'a> {
        let Next { chain, terminal } = self;
        match chain.split_first() {
            Some((first, rest)) => first.process(req, Next { chain: rest, terminal }),
            None => match terminal {
                Some(outer) => outer.handle(req),
                None => Box::pin(ready(Err::<Response, _>(Error::ChainExhausted))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;
    use http::StatusCode;

    struct Respond(StatusCode);

    impl Middleware for Respond {
        fn process<'a>(&'a self, _req: Request, _next: Next<'a>) -> BoxFuture<'a> {
            Box::pin(async move { Ok(Response::status(self.0)) })
        }
    }

    struct Forward;

    impl Middleware for Forward {
        fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
            next.handle(req)
        }
    }

    #[tokio::test]
    async fn end_is_exhausted() {
        let next = Next::end();
        assert_eq!(next.remaining(), 0);
        let err = next.handle(Request::new(Method::Get, "/")).await.unwrap_err();
        assert!(matches!(err, Error::ChainExhausted));
    }

    #[tokio::test]
    async fn falls_through_to_terminal() {
        let outer: Vec<BoxedMiddleware> = vec![Arc::new(Respond(StatusCode::ACCEPTED))];
        let inner: Vec<BoxedMiddleware> = vec![Arc::new(Forward)];

        let next = Next::new(&inner, Some(Next::new(&outer, None)));
        let res = next.handle(Request::new(Method::Get, "/")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn arc_wrapped_middleware_delegates() {
        let shared = Arc::new(Respond(StatusCode::IM_A_TEAPOT));
        let res = shared
            .process(Request::new(Method::Get, "/"), Next::end())
            .await
            .unwrap();
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
    }
}
