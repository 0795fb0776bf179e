//! Classification of a single route-path segment.
//!
//! ```text
//! segment := static | ":" name | ":" name "(" pattern ")" | "*"
//! ```

use regex::Regex;

/// What kind of tree node a registration segment produces.
#[derive(Debug, Clone)]
pub enum SegmentKind {
    /// Literal text, matched by equality.
    Static,
    /// `:name`, binds any non-empty request segment.
    Param { name: String },
    /// `:name(pattern)`, binds request segments the pattern accepts in full.
    Regex { name: String, pattern: Regex },
    /// `*`, absorbs the rest of the request path.
    Wildcard,
}

impl SegmentKind {
    /// Capture name for param and regex segments.
    pub fn capture_name(&self) -> Option<&str> {
        match self {
            Self::Param { name } | Self::Regex { name, .. } => Some(name),
            Self::Static | Self::Wildcard => None,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Param { .. } => "param",
            Self::Regex { .. } => "regex",
            Self::Wildcard => "wildcard",
        }
    }
}

/// A classification failure, turned into a [`RouteError`](crate::RouteError)
/// by the caller that knows the full route path.
#[derive(Debug)]
pub(crate) enum SegmentError {
    Empty,
    EmptyName,
    Pattern(regex::Error),
}

/// Classifies one segment of a registration path.
///
/// Regex patterns are compiled anchored on both ends, so `:id([0-9]+)`
/// rejects `a1b` rather than finding the digit inside it.
pub(crate) fn classify(segment: &str) -> Result<SegmentKind, SegmentError> {
    if segment.is_empty() {
        return Err(SegmentError::Empty);
    }
    if segment == "*" {
        return Ok(SegmentKind::Wildcard);
    }
    let Some(rest) = segment.strip_prefix(':') else {
        return Ok(SegmentKind::Static);
    };

    if let Some((name, pattern)) = rest
        .strip_suffix(')')
        .and_then(|inner| inner.split_once('('))
    {
        if name.is_empty() {
            return Err(SegmentError::EmptyName);
        }
        let pattern = Regex::new(&format!("^(?:{pattern})$")).map_err(SegmentError::Pattern)?;
        return Ok(SegmentKind::Regex { name: name.to_owned(), pattern });
    }

    if rest.is_empty() {
        return Err(SegmentError::EmptyName);
    }
    Ok(SegmentKind::Param { name: rest.to_owned() })
}
