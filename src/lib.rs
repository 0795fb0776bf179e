//! # trellis
//!
//! A small HTTP framework built around two ideas: a per-method segment trie
//! for routing, and a middleware chain that communicates only through a
//! per-request [`Context`].
//!
//! - **Routing**: `/users/:id`, `/users/:id([0-9]+)` and `/files/*`, with
//!   static > regex > param > wildcard precedence. Conflicting definitions are
//!   rejected with a [`RouteError`] while the router is built, never mid-traffic.
//! - **Middleware**: `(next) -> handler` wrappers, first registered runs
//!   outermost. The staged response is flushed exactly once, after the
//!   outermost layer returns.
//! - **Serving**: hyper underneath, HTTP/1.1 and HTTP/2, graceful shutdown
//!   on SIGTERM / Ctrl-C.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use trellis::{App, Context, Router, Server, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trellis::Error> {
//!     let router = Router::new()
//!         .get("/users/:id([0-9]+)", get_user)?
//!         .post("/users", create_user)?;
//!
//!     let app = App::new(router).wrap(middleware::trace());
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(mut ctx: Context) -> Context {
//!     let id = ctx.path_value("id").unwrap_or_default().to_owned();
//!     ctx.text(format!("user {id}"));
//!     ctx
//! }
//!
//! async fn create_user(mut ctx: Context) -> Context {
//!     if ctx.request().body().is_empty() {
//!         ctx.set_status(StatusCode::BAD_REQUEST);
//!         return ctx;
//!     }
//!     ctx.set_status(StatusCode::CREATED);
//!     ctx
//! }
//! ```

mod app;
mod context;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use app::{App, Dispatcher};
pub use context::{Context, State};
pub use error::{Error, RouteError, ValueError};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, boxed};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, Response};
pub use router::{MatchInfo, Node, Router, SegmentKind};
pub use server::Server;
