//! Pattern-based request router.
//!
//! One ordered route list per HTTP method. A request is tried against its
//! method's patterns in registration order and the first full match wins.
//! Named placeholders become request attributes before the handler runs.

use std::collections::HashMap;

use http::StatusCode;
use tracing::{debug, trace};

use crate::error::Result;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pattern::PathPattern;
use crate::request::Request;
use crate::response::Response;

struct Route {
    pattern: PathPattern,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup and mount it in a [`Pipe`](crate::Pipe) or a
/// [`PrefixRouter`](crate::PrefixRouter). Each registration returns `self`
/// so calls chain naturally.
///
/// A router always answers. It never calls the `next` it is given:
///
/// - no route at all for the request's method → `405 Method Not Allowed`
/// - routes for the method, none matching the path → `404 Not Found`
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pattern. Returns `self` for chaining.
    ///
    /// Placeholders use `{name}` or `{name:regex}` syntax, and
    /// `req.attribute("name")` retrieves them:
    ///
    /// ```rust
    /// # use conduit::{Method, Request, Response, Router};
    /// # async fn show(_: Request) -> Response { Response::text("") }
    /// # async fn update(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get, "/articles/{id:[0-9]+}", show)
    ///     .on(Method::Put, "/articles/{id:[0-9]+}", update);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is malformed. Use [`Router::try_on`] to get the
    /// error instead.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.try_on(method, pattern, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`Router::on`].
    ///
    /// Registering a pattern that compiles to the same matcher as an earlier
    /// one for this method (`/x/{id}` and `/x/{id:[^/]+}`, say) replaces the
    /// earlier handler and keeps its place in the match order.
    pub fn try_on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Result<Self> {
        let pattern = PathPattern::parse(pattern)?;
        let handler = handler.into_boxed_handler();
        let routes = self.routes.entry(method).or_default();

        match routes.iter_mut().find(|r| r.pattern.matcher() == pattern.matcher()) {
            Some(existing) => {
                debug!(%method, pattern = pattern.as_str(), "route replaced");
                existing.handler = handler;
            }
            None => {
                debug!(%method, pattern = pattern.as_str(), "route registered");
                routes.push(Route { pattern, handler });
            }
        }
        Ok(self)
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Head, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, pattern, handler)
    }

    pub fn options(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::Options, pattern, handler)
    }

    /// Routes `req` and returns the handler's response, or a 404/405.
    pub async fn handle(&self, req: Request) -> Response {
        let Some(routes) = self.routes.get(&req.method()) else {
            debug!(method = %req.method(), path = req.path(), "no routes for method");
            return Response::status(StatusCode::METHOD_NOT_ALLOWED);
        };

        let matched = routes
            .iter()
            .find_map(|route| route.pattern.captures(req.path()).map(|params| (route, params)));

        let Some((route, params)) = matched else {
            debug!(method = %req.method(), path = req.path(), "no route matched");
            return Response::status(StatusCode::NOT_FOUND);
        };

        trace!(pattern = route.pattern.as_str(), params = params.len(), "route matched");
        let req = params
            .into_iter()
            .fold(req, |req, (name, value)| req.with_attribute(name, value));
        route.handler.call(req).await
    }
}

impl Middleware for Router {
    fn process<'a>(&'a self, req: Request, _next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move { Ok(self.handle(req).await) })
    }
}
