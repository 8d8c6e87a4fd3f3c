use std::time::Instant;

use tracing::{Instrument, error, info, info_span};

use super::{BoxFuture, Middleware, Next};
use crate::request::Request;

/// Opens a span per request and logs how it ended.
///
/// Mount it first so the span covers the whole chain:
///
/// ```rust
/// use conduit::{Pipe, Router, middleware::Trace};
///
/// let app = Pipe::new().with(Trace).with(Router::new());
/// ```
pub struct Trace;

impl Middleware for Trace {
    fn process<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a> {
        let span = info_span!("request", method = %req.method(), path = %req.path());

        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.handle(req).await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

                match &result {
                    Ok(res) => info!(status = res.status_code().as_u16(), elapsed_ms, "request completed"),
                    Err(e) => error!(error = %e, elapsed_ms, "request failed"),
                }
                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Method, Pipe, Response, StatusCode};

    struct Created;

    impl Middleware for Created {
        fn process<'a>(&'a self, _req: Request, _next: Next<'a>) -> BoxFuture<'a> {
            Box::pin(async { Ok(Response::status(StatusCode::CREATED)) })
        }
    }

    #[tokio::test]
    async fn passes_responses_through() {
        let app = Pipe::new().with(Trace).with(Created);
        let res = app.dispatch(Request::new(Method::Post, "/")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn passes_failures_through() {
        let app = Pipe::new().with(Trace);
        let err = app.dispatch(Request::new(Method::Get, "/")).await.unwrap_err();
        assert!(matches!(err, Error::ChainExhausted));
    }
}
