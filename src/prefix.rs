//! Path-prefix dispatch.

use std::future::ready;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::middleware::{BoxFuture, BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Splits an application into zones by URL path prefix.
///
/// Mounts are tried in the order they were added and the first prefix that
/// starts the request path takes the request, so mount more specific
/// prefixes first. `"/"` matches everything and belongs last.
///
/// Whatever the selected middleware returns is passed back untouched,
/// including its own 404 or 405. A request no prefix claims gets a 404.
#[derive(Clone, Default)]
pub struct PrefixRouter {
    mounts: Vec<(String, BoxedMiddleware)>,
}

impl PrefixRouter {
    pub fn new() -> Self {
        Self { mounts: Vec::new() }
    }

    /// Mounts `middleware` under `prefix`. Returns `self` for chaining.
    ///
    /// Mounting the same prefix again replaces the earlier middleware and
    /// keeps its position.
    pub fn mount(mut self, prefix: impl Into<String>, middleware: impl Middleware) -> Self {
        let prefix = prefix.into();
        let middleware: BoxedMiddleware = Arc::new(middleware);

        match self.mounts.iter_mut().find(|(p, _)| *p == prefix) {
            Some((_, existing)) => *existing = middleware,
            None => self.mounts.push((prefix, middleware)),
        }
        self
    }

    /// The mounted prefixes, in match order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|(p, _)| p.as_str())
    }
}

impl Middleware for PrefixRouter {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        let mounted = self
            .mounts
            .iter()
            .find(|(prefix, _)| req.path().starts_with(prefix.as_str()));

        match mounted {
            Some((prefix, middleware)) => {
                debug!(prefix = prefix.as_str(), path = req.path(), "prefix matched");
                middleware.process(req, next)
            }
            None => {
                debug!(path = req.path(), "no prefix matched");
                Box::pin(ready(Ok::<_, crate::Error>(Response::status(StatusCode::NOT_FOUND))))
            }
        }
    }
}
