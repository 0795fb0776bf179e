//! Unified error types.
//!
//! Route registration failures are [`RouteError`]s and surface at setup time,
//! before the server accepts a single connection. Lookup misses are not errors
//! at all: [`Router::find_route`](crate::Router::find_route) returns `None`.

use std::net::AddrParseError;

use thiserror::Error;

use crate::method::Method;

/// Why a route definition was rejected by [`Router::add_route`](crate::Router::add_route).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// Empty path, missing leading `/`, trailing `/`, empty segment or empty
    /// parameter name.
    #[error("malformed route path `{path}`: {reason}")]
    MalformedPath { path: String, reason: &'static str },

    /// The exact method + path already has a handler.
    #[error("route conflict: {method} `{path}` is already registered")]
    RouteConflict { method: Method, path: String },

    /// A param / regex / wildcard segment collides with a differently typed or
    /// differently named sibling at the same tree position.
    #[error("ambiguous route `{path}`: segment `{segment}` conflicts with existing `{existing}`")]
    AmbiguousRouteType {
        path: String,
        segment: String,
        existing: String,
    },

    /// The pattern of a `:name(pattern)` segment does not compile.
    #[error("invalid pattern in segment `{segment}` of `{path}`")]
    InvalidPattern {
        path: String,
        segment: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure to read a value off a [`Context`](crate::Context).
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("no value for key `{0}`")]
    Missing(String),

    #[error("value `{value}` for key `{key}` could not be parsed")]
    Parse { key: String, value: String },

    #[error("request body is empty")]
    EmptyBody,

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// The crate-level error type.
///
/// Application-level errors (404, 422, etc.) are staged on the
/// [`Context`](crate::Context) as status codes, not returned as `Error`s.
/// This type surfaces setup and infrastructure failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("invalid listen address: {0}")]
    Addr(#[from] AddrParseError),
}
