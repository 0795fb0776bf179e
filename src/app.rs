//! Composition of the router and the middleware chain into one dispatcher.
//!
//! ```text
//! flush( mw[0]( mw[1]( … mw[n]( route → handler ) … ) ) )
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::{Chain, Middleware};
use crate::response::Response;
use crate::router::Router;

/// A router plus the middleware to run around it.
///
/// ```rust
/// # use trellis::{App, Context, Router, RouteError};
/// # use trellis::middleware::{self, ErrorPage};
/// # async fn home(ctx: Context) -> Context { ctx }
/// # fn main() -> Result<(), RouteError> {
/// let dispatcher = App::new(Router::new().get("/", home)?)
///     .wrap(middleware::trace())
///     .wrap(ErrorPage::with_defaults())
///     .build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct App {
    router: Router,
    chain: Chain,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self { router, chain: Chain::new() }
    }

    /// Appends a middleware. The first one added runs outermost.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        self.chain.push(middleware);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Freezes the router and composes the chain once.
    pub fn build(self) -> Dispatcher {
        let router = Arc::new(self.router);
        let terminal: BoxedHandler = Arc::new(RouteStage { router: Arc::clone(&router) });
        Dispatcher {
            handler: self.chain.compose(terminal),
            router,
        }
    }
}

/// The composed request pipeline. Cheap to share behind an `Arc`.
pub struct Dispatcher {
    handler: BoxedHandler,
    router: Arc<Router>,
}

impl Dispatcher {
    /// Runs `ctx` through every middleware and the route handler, then
    /// flushes the staged response. Exactly one [`Response`] comes out per
    /// context, after the outermost middleware has returned.
    pub async fn dispatch(&self, mut ctx: Context) -> Response {
        ctx.enter();
        self.handler.call(ctx).await.flush()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Innermost stage: route lookup and handler invocation.
struct RouteStage {
    router: Arc<Router>,
}

impl ErasedHandler for RouteStage {
    fn call(&self, mut ctx: Context) -> BoxFuture {
        let handler = ctx
            .method()
            .and_then(|method| self.router.find_route(method, ctx.path()))
            .and_then(|m| {
                let handler = Arc::clone(m.handler()?);
                ctx.bind_route(m.route(), m.into_params());
                Some(handler)
            });

        match handler {
            Some(handler) => Box::pin(async move {
                let mut ctx = handler.call(ctx).await;
                ctx.handler_ran();
                ctx
            }),
            None => {
                debug!(method = %ctx.request().http_method(), path = ctx.path(), "no route");
                ctx.not_found();
                Box::pin(std::future::ready(ctx))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::context::State;
    use crate::method::Method;
    use crate::middleware::{Next, from_fn};
    use crate::request::Request;

    async fn show_user(mut ctx: Context) -> Context {
        let id = ctx.path_value("id").unwrap_or("?").to_owned();
        ctx.text(format!("user {id}"));
        ctx
    }

    fn ctx(method: Method, target: &str) -> Context {
        Context::new(Request::new(method, target))
    }

    #[tokio::test]
    async fn dispatches_to_the_matched_handler() {
        let d = App::new(Router::new().get("/users/:id", show_user).unwrap()).build();
        let res = d.dispatch(ctx(Method::Get, "/users/7")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body(), b"user 7");
    }

    #[tokio::test]
    async fn intermediate_node_without_handler_is_not_found() {
        let d = App::new(Router::new().get("/a/b", show_user).unwrap()).build();
        for target in ["/a", "/a/c", "/x"] {
            let res = d.dispatch(ctx(Method::Get, target)).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{target}");
            assert_eq!(res.body(), b"Not Found");
        }
        let res = d.dispatch(ctx(Method::Post, "/a/b")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn middleware_observes_route_state_on_the_way_out() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let probe = {
            let seen = Arc::clone(&seen);
            from_fn(move |ctx: Context, next: Next| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().unwrap().push(ctx.state());
                    let ctx = next.run(ctx).await;
                    seen.lock().unwrap().push(ctx.state());
                    ctx
                }
            })
        };
        let d = App::new(Router::new().get("/", show_user).unwrap()).wrap(probe).build();

        d.dispatch(ctx(Method::Get, "/")).await;
        d.dispatch(ctx(Method::Get, "/missing")).await;
        assert_eq!(
            *seen.lock().unwrap(),
            [State::Dispatching, State::HandlerRan, State::Dispatching, State::NotFound]
        );
    }
}
