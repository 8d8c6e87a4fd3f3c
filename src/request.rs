//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use http_body_util::BodyExt;

use crate::error::Error;
use crate::method::Method;

/// An incoming HTTP request.
///
/// Requests are values: the `with_*` methods consume the request and return
/// the updated one, so a middleware never observes a change made further
/// down the chain. Cloning is cheap; the body is reference-counted.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    attributes: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            attributes: HashMap::new(),
        }
    }

    /// Builds a request from a hyper request, buffering the whole body.
    ///
    /// Only the path component of the URI is kept.
    pub(crate) async fn from_hyper<B>(method: Method, req: http::Request<B>) -> Result<Self, Error>
    where
        B: hyper::body::Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::Body(e.into()))?
            .to_bytes();
        Ok(Self {
            method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            attributes: HashMap::new(),
        })
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a request attribute, such as a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.attribute("id")` on `/users/42` returns `Some("42")`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> { &self.attributes }

    /// Returns the request with `key` set to `value`, replacing any previous value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the request with a header appended.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid header name or value.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid header value `{value}`: {e}"));
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_attribute_leaves_the_original_untouched() {
        let original = Request::new(Method::Get, "/articles/42");
        let updated = original.clone().with_attribute("id", "42");

        assert_eq!(original.attribute("id"), None);
        assert_eq!(updated.attribute("id"), Some("42"));
        assert_eq!(updated.path(), "/articles/42");
    }

    #[test]
    fn later_attribute_wins() {
        let req = Request::new(Method::Get, "/")
            .with_attribute("id", "1")
            .with_attribute("id", "2");
        assert_eq!(req.attribute("id"), Some("2"));
        assert_eq!(req.attributes().len(), 1);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::Post, "/").with_header("X-Request-Id", "abc");
        assert_eq!(req.header("x-request-id"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[tokio::test]
    async fn from_hyper_keeps_path_and_body() {
        let raw = http::Request::builder()
            .method("POST")
            .uri("/upload?draft=1")
            .header("content-type", "text/plain")
            .body(http_body_util::Full::new(Bytes::from_static(b"hello")))
            .unwrap();
        let req = Request::from_hyper(Method::Post, raw).await.unwrap();

        assert_eq!(req.path(), "/upload");
        assert_eq!(req.body().as_ref(), b"hello");
        assert_eq!(req.header("content-type"), Some("text/plain"));
    }
}
