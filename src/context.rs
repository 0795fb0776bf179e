//! Per-request context.
//!
//! A [`Context`] is created for every request and owned by exactly one task.
//! It travels by value through the middleware chain into the handler and
//! back out again, collecting the matched route, path parameters and the
//! staged response on the way. Nothing reaches the client until the flush
//! stage consumes it.
//!
//! ```text
//! Created → Dispatching → Matched ─→ HandlerRan → (flushed)
//!                       ↘ NotFound ───────────────↗
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{Extensions, HeaderMap, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ValueError;
use crate::method::Method;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// Where a request is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Built by the host, not yet handed to the chain.
    Created,
    /// Inside the middleware chain, before routing.
    Dispatching,
    /// A route handler was found and is about to run.
    Matched,
    /// No route handler exists for the method and path; 404 is staged.
    NotFound,
    /// The route handler has returned.
    HandlerRan,
}

/// The request context.
#[derive(Debug)]
pub struct Context {
    request: Request,
    params: HashMap<String, String>,
    matched_route: Option<String>,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    extensions: Extensions,
    state: State,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            params: HashMap::new(),
            matched_route: None,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            extensions: Extensions::new(),
            state: State::Created,
        }
    }

    // ── Request side ─────────────────────────────────────────────────────────

    pub fn request(&self) -> &Request { &self.request }
    /// `None` for an extension method; see [`Request::http_method`].
    pub fn method(&self) -> Option<Method> { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn state(&self) -> State { self.state }

    /// The registration path of the matched route, e.g. `/users/:id`.
    pub fn matched_route(&self) -> Option<&str> {
        self.matched_route.as_deref()
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn path_value(&self, key: &str) -> Result<&str, ValueError> {
        self.params
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ValueError::Missing(key.to_owned()))
    }

    pub fn path_value_as<T: FromStr>(&self, key: &str) -> Result<T, ValueError> {
        parse_value(key, self.path_value(key)?)
    }

    pub fn query_value(&self, key: &str) -> Result<&str, ValueError> {
        self.request
            .query_value(key)
            .ok_or_else(|| ValueError::Missing(key.to_owned()))
    }

    pub fn query_value_as<T: FromStr>(&self, key: &str) -> Result<T, ValueError> {
        parse_value(key, self.query_value(key)?)
    }

    /// A urlencoded form value, falling back to the query string.
    pub fn form_value(&self, key: &str) -> Result<&str, ValueError> {
        self.request
            .form_value(key)
            .ok_or_else(|| ValueError::Missing(key.to_owned()))
    }

    pub fn form_value_as<T: FromStr>(&self, key: &str) -> Result<T, ValueError> {
        parse_value(key, self.form_value(key)?)
    }

    /// Deserializes the request body as JSON.
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, ValueError> {
        if self.request.body().is_empty() {
            return Err(ValueError::EmptyBody);
        }
        Ok(serde_json::from_slice(self.request.body())?)
    }

    /// Typed values attached by middleware and collaborators (sessions,
    /// authenticated users, request ids).
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    // ── Staged response ──────────────────────────────────────────────────────

    pub fn status(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn response_headers(&self) -> &HeaderMap { &self.headers }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Replaces the staged body, leaving status and headers alone.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn text(&mut self, body: impl Into<String>) {
        self.bytes(ContentType::Text, body.into().into_bytes());
    }

    pub fn html(&mut self, body: impl Into<String>) {
        self.bytes(ContentType::Html, body.into().into_bytes());
    }

    pub fn bytes(&mut self, content_type: ContentType, body: Vec<u8>) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.body = body;
    }

    /// Stages `status` and `value` serialized as JSON.
    ///
    /// If serialization fails, `500` is staged instead and the error returned.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), ValueError> {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.status = status;
                self.bytes(ContentType::Json, body);
                Ok(())
            }
            Err(e) => {
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.headers.remove(CONTENT_TYPE);
                self.body.clear();
                Err(e.into())
            }
        }
    }

    pub fn json_ok<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ValueError> {
        self.json(StatusCode::OK, value)
    }

    // ── Lifecycle, driven by the dispatcher ──────────────────────────────────

    pub(crate) fn enter(&mut self) {
        self.state = State::Dispatching;
    }

    pub(crate) fn bind_route(&mut self, route: Option<&str>, params: HashMap<String, String>) {
        self.matched_route = route.map(str::to_owned);
        self.params = params;
        self.state = State::Matched;
    }

    pub(crate) fn not_found(&mut self) {
        self.status = StatusCode::NOT_FOUND;
        self.text("Not Found");
        self.state = State::NotFound;
    }

    pub(crate) fn handler_ran(&mut self) {
        self.state = State::HandlerRan;
    }

    /// The flush stage. Consuming the context makes a second write impossible.
    pub(crate) fn flush(self) -> Response {
        Response::new(self.status, self.headers, Bytes::from(self.body))
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ValueError> {
    value.parse().map_err(|_| ValueError::Parse {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn ctx(target: &str) -> Context {
        Context::new(Request::new(Method::Get, target))
    }

    #[test]
    fn starts_created_with_200_and_empty_body() {
        let c = ctx("/");
        assert_eq!(c.state(), State::Created);
        assert_eq!(c.status(), StatusCode::OK);
        assert!(c.body().is_empty());
        assert!(c.matched_route().is_none());
    }

    #[test]
    fn path_values_after_binding() {
        let mut c = ctx("/users/42");
        c.bind_route(Some("/users/:id"), HashMap::from([("id".to_owned(), "42".to_owned())]));
        assert_eq!(c.state(), State::Matched);
        assert_eq!(c.matched_route(), Some("/users/:id"));
        assert_eq!(c.path_value("id").unwrap(), "42");
        assert_eq!(c.path_value_as::<i64>("id").unwrap(), 42);
        assert!(matches!(c.path_value("name"), Err(ValueError::Missing(k)) if k == "name"));
    }

    #[test]
    fn typed_values_report_parse_failures() {
        let c = ctx("/list?page=two&size=10");
        assert_eq!(c.query_value_as::<u32>("size").unwrap(), 10);
        assert!(matches!(
            c.query_value_as::<u32>("page"),
            Err(ValueError::Parse { ref value, .. }) if value == "two"
        ));
    }

    #[test]
    fn bind_json_decodes_the_body() {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Login {
            user: String,
        }

        let c = Context::new(Request::new(Method::Post, "/").with_body(r#"{"user":"ann"}"#));
        assert_eq!(c.bind_json::<Login>().unwrap().user, "ann");

        let c = Context::new(Request::new(Method::Post, "/").with_body(r#"{"user":"ann","x":1}"#));
        assert!(matches!(c.bind_json::<Login>(), Err(ValueError::Json(_))));

        assert!(matches!(ctx("/").bind_json::<Login>(), Err(ValueError::EmptyBody)));
    }

    #[test]
    fn json_stages_status_type_and_body() {
        let mut c = ctx("/");
        c.json(StatusCode::CREATED, &serde_json::json!({ "id": 7 })).unwrap();
        assert_eq!(c.status(), StatusCode::CREATED);
        assert_eq!(c.response_headers()[CONTENT_TYPE], "application/json");
        assert_eq!(c.body(), br#"{"id":7}"#);
    }

    #[test]
    fn failed_json_stages_a_bare_500() {
        let mut c = ctx("/");
        c.text("partial");
        // Tuple keys cannot become JSON object keys.
        let unserializable = HashMap::from([((1u8, 2u8), 3u8)]);
        assert!(matches!(c.json_ok(&unserializable), Err(ValueError::Json(_))));
        assert_eq!(c.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(c.body().is_empty());
        assert!(c.response_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn not_found_stages_404() {
        let mut c = ctx("/nope");
        c.enter();
        c.not_found();
        assert_eq!(c.state(), State::NotFound);
        let res = c.flush();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"Not Found");
    }

    #[test]
    fn extensions_are_typed() {
        #[derive(Clone, Debug, PartialEq)]
        struct UserId(u64);

        let mut c = ctx("/");
        c.extensions_mut().insert(UserId(9));
        assert_eq!(c.extensions().get::<UserId>(), Some(&UserId(9)));
        assert!(c.extensions().get::<String>().is_none());
    }
}
