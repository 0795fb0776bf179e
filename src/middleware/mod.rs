//! Middleware layer.
//!
//! A middleware turns the next handler into a new handler: it receives the
//! continuation as a [`BoxedHandler`] and returns one that runs code before
//! and after calling it. Middleware talk to each other only through the
//! staged status, headers and body on the [`Context`]; the flush stage
//! writes them once every layer has returned.
//!
//! Registration order is execution order. The chain is folded right-to-left,
//! so the first middleware added is the outermost wrapper: first in, last out.
//!
//! Built-in middleware:
//! - [`trace`]: per-request span with method, path, route, status, latency
//! - [`ErrorPage`]: replaces the body of error responses with fixed pages

mod error_page;
mod trace;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::handler::{BoxedHandler, boxed};

pub use error_page::ErrorPage;
pub use trace::{Trace, trace};

/// A request interceptor: `(next handler) -> handler`.
///
/// Implemented for every `Fn(BoxedHandler) -> BoxedHandler`. For the common
/// "before / call next / after" shape, [`from_fn`] is less ceremony.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// The rest of the chain, as seen from inside a [`from_fn`] middleware.
#[derive(Clone)]
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Runs the remaining middleware and the route handler.
    pub async fn run(self, ctx: Context) -> Context {
        self.inner.call(ctx).await
    }
}

/// Builds a middleware from an async function of the context and the rest
/// of the chain.
///
/// ```rust
/// use http::StatusCode;
/// use trellis::middleware::{Next, from_fn};
/// use trellis::Context;
///
/// let require_key = from_fn(|mut ctx: Context, next: Next| async move {
///     if ctx.request().header("x-api-key").is_none() {
///         ctx.set_status(StatusCode::UNAUTHORIZED);
///         return ctx;
///     }
///     next.run(ctx).await
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    FromFn { f: Arc::new(f) }
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F> {
    f: Arc<F>,
}

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        let f = Arc::clone(&self.f);
        boxed(move |ctx: Context| (*f)(ctx, Next { inner: Arc::clone(&next) }))
    }
}

/// An ordered list of middleware.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends `middleware` as the innermost layer so far.
    pub fn push(&mut self, middleware: impl Middleware) {
        self.stages.push(Arc::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wraps `terminal` in every stage, last registered innermost.
    pub fn compose(&self, terminal: BoxedHandler) -> BoxedHandler {
        self.stages
            .iter()
            .rev()
            .fold(terminal, |next, stage| stage.wrap(next))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("stages", &self.stages.len()).finish()
    }
}
