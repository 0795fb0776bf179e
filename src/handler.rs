//! Handler trait and type erasure.
//!
//! A handler takes the request [`Context`] by value, stages a status and body
//! on it and hands it back:
//!
//! ```text
//! async fn hello(mut ctx: Context) -> Context { … }  ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx)  at request time               ← one vtable dispatch
//! ```
//!
//! Passing the context through by value keeps handler futures `'static`,
//! so they can be boxed and moved across tokio worker threads.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

/// A heap-allocated, type-erased future that resolves to the context it was
/// given.
pub type BoxFuture = Pin<Box<dyn Future<Output = Context> + Send + 'static>>;

/// Object-safe dispatch interface behind [`BoxedHandler`].
///
/// Middleware holds its continuation as a `BoxedHandler` and calls it through
/// this trait.
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

/// A type-erased handler shared by the route tree and every in-flight request.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any
/// `Fn(Context) -> impl Future<Output = Context>`, which covers
/// `async fn name(ctx: Context) -> Context` and closures returning an
/// `async move` block.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Erases any [`Handler`] into a [`BoxedHandler`].
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    handler.into_boxed_handler()
}

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Context> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        Box::pin((self.0)(ctx))
    }
}
