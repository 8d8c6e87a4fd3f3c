//! Unified error type.

use thiserror::Error;

/// Result alias used by every fallible conduit operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type returned by conduit's fallible operations.
///
/// Routing misses (404, 405) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// configuration mistakes (bad route patterns, a pipe with nowhere to hand
/// off to) and infrastructure failures (binding a port, reading a body).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddr(String),

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid regex in route pattern `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A pipe ran out of middlewares and had no outer handler to delegate to.
    #[error("middleware chain exhausted with no terminal handler")]
    ChainExhausted,

    #[error("failed to read request body: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),
}
