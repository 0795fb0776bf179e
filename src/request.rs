//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::OnceLock;

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;

use crate::method::Method;

/// An incoming HTTP request with its body fully read.
///
/// Query and form values are decoded on first access and cached for the rest
/// of the request. When a key repeats, the first occurrence wins.
#[derive(Debug)]
pub struct Request {
    method: http::Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    query_values: OnceLock<HashMap<String, String>>,
    form_values: OnceLock<HashMap<String, String>>,
}

impl Request {
    /// Builds a request for `target`, a path with an optional `?query`.
    ///
    /// Hosts other than the bundled hyper server, and tests, construct
    /// requests this way. `method` is a [`Method`] or any `http::Method`,
    /// extension methods included.
    pub fn new(method: impl Into<http::Method>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method: method.into(),
            path: path.to_owned(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
            query_values: OnceLock::new(),
            form_values: OnceLock::new(),
        }
    }

    pub(crate) fn from_parts(
        parts: http::request::Parts,
        body: Bytes,
        remote_addr: SocketAddr,
    ) -> Self {
        let mut req = Self::new(parts.method, parts.uri.path());
        req.query = parts.uri.query().map(str::to_owned);
        req.headers = parts.headers;
        req.body = body;
        req.remote_addr = Some(remote_addr);
        req
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The typed method, or `None` for an extension method.
    pub fn method(&self) -> Option<Method> { Method::try_from(&self.method).ok() }
    /// The method as received on the wire.
    pub fn http_method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Header lookup; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// A decoded query-string value.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query_values
            .get_or_init(|| decode_pairs(self.query.as_deref().unwrap_or_default().as_bytes()))
            .get(key)
            .map(String::as_str)
    }

    /// A form value: the urlencoded body first, then the query string.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form_values
            .get_or_init(|| {
                if self.is_urlencoded_form() {
                    decode_pairs(&self.body)
                } else {
                    HashMap::new()
                }
            })
            .get(key)
            .map(String::as_str)
            .or_else(|| self.query_value(key))
    }

    fn is_urlencoded_form(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
    }
}

fn decode_pairs(input: &[u8]) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for (k, v) in url::form_urlencoded::parse(input) {
        values.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn splits_target_into_path_and_query() {
        let req = Request::new(Method::Get, "/search?q=rust+web&page=2&q=again");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query(), Some("q=rust+web&page=2&q=again"));
        assert_eq!(req.query_value("q"), Some("rust web"));
        assert_eq!(req.query_value("page"), Some("2"));
        assert_eq!(req.query_value("missing"), None);
    }

    #[test]
    fn form_values_prefer_the_body() {
        let mut req = Request::new(Method::Post, "/login?user=query&next=%2Fhome")
            .with_body("user=body&pass=s%26cret");
        req.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert_eq!(req.form_value("user"), Some("body"));
        assert_eq!(req.form_value("pass"), Some("s&cret"));
        assert_eq!(req.form_value("next"), Some("/home"));
    }

    #[test]
    fn extension_methods_are_kept_verbatim() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        let req = Request::new(purge, "/cache/item");
        assert_eq!(req.method(), None);
        assert_eq!(req.http_method().as_str(), "PURGE");
        assert_eq!(Request::new(Method::Put, "/").method(), Some(Method::Put));
    }

    #[test]
    fn non_form_body_is_not_decoded() {
        let req = Request::new(Method::Post, "/login").with_body("user=body");
        assert_eq!(req.form_value("user"), None);
    }
}
