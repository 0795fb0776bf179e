//! HTTP method as a typed enum.
//!
//! Every method owns its own route tree. Extension methods outside this set
//! (`PURGE`, `PROPFIND`, ...) have no tree: they still travel through the
//! middleware chain and resolve to a staged `404`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A known HTTP method (RFC 9110 §9).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

/// Returned by [`Method::from_str`] for an unrecognised method token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported http method `{0}`")]
pub struct UnknownMethod(pub String);

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }
}

/// Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            other     => Err(UnknownMethod(other.to_owned())),
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnknownMethod;

    fn try_from(m: &http::Method) -> Result<Self, Self::Error> {
        m.as_str().parse()
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Connect => http::Method::CONNECT,
            Method::Delete  => http::Method::DELETE,
            Method::Get     => http::Method::GET,
            Method::Head    => http::Method::HEAD,
            Method::Options => http::Method::OPTIONS,
            Method::Patch   => http::Method::PATCH,
            Method::Post    => http::Method::POST,
            Method::Put     => http::Method::PUT,
            Method::Trace   => http::Method::TRACE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_tokens() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!(Method::try_from(&http::Method::PATCH), Ok(Method::Patch));
    }

    #[test]
    fn method_tokens_are_case_sensitive() {
        assert_eq!("get".parse::<Method>(), Err(UnknownMethod("get".into())));
        assert!("PURGE".parse::<Method>().is_err());
    }

    #[test]
    fn converts_to_http_method_and_back() {
        for m in [Method::Connect, Method::Delete, Method::Get, Method::Head, Method::Options,
                  Method::Patch, Method::Post, Method::Put, Method::Trace] {
            let wire = http::Method::from(m);
            assert_eq!(wire.as_str(), m.as_str());
            assert_eq!(Method::try_from(&wire), Ok(m));
        }
    }
}
