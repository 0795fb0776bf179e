//! The flushed response and common content types.
//!
//! Handlers and middleware never build a [`Response`]. They stage status,
//! headers and body on the [`Context`](crate::Context); the flush stage turns
//! the context into a `Response` once, after every middleware has returned.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

/// Common content-type values for [`Context::bytes`](crate::Context::bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    Csv,          // text/csv
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

/// A response ready for the wire.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    /// A bodiless response, for requests rejected before dispatch.
    pub(crate) fn status_only(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Bytes::new())
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Converts into the hyper response type. `content-length` is derived
    /// from the body by hyper.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}
