//! Fixed error pages.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;

use crate::context::Context;
use crate::handler::{BoxedHandler, boxed};
use crate::middleware::Middleware;
use crate::response::ContentType;

const NOT_FOUND_PAGE: &str = "<html>\n\t<h1>404 NOT FOUND</h1>\n</html>\n";
const INTERNAL_ERROR_PAGE: &str = "<html>\n\t<h1>500 Internal Server Error</h1>\n</html>\n";

/// Replaces the staged body with an HTML page when the inner chain finishes
/// with a registered status code. The status itself is left alone.
///
/// ```rust
/// use http::StatusCode;
/// use trellis::middleware::ErrorPage;
///
/// let pages = ErrorPage::with_defaults()
///     .register(StatusCode::FORBIDDEN, "<h1>go away</h1>");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ErrorPage {
    pages: HashMap<StatusCode, Arc<str>>,
}

impl ErrorPage {
    /// No pages registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages for `404` and `500`.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(StatusCode::NOT_FOUND, NOT_FOUND_PAGE)
            .register(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_PAGE)
    }

    pub fn register(mut self, status: StatusCode, page: impl Into<String>) -> Self {
        self.pages.insert(status, Arc::from(page.into()));
        self
    }
}

impl Middleware for ErrorPage {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let pages = Arc::new(self.pages.clone());
        boxed(move |ctx: Context| {
            let next = Arc::clone(&next);
            let pages = Arc::clone(&pages);
            async move {
                let mut ctx = next.call(ctx).await;
                if let Some(page) = pages.get(&ctx.status()) {
                    ctx.bytes(ContentType::Html, page.as_bytes().to_vec());
                }
                ctx
            }
        })
    }
}
