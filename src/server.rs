//! HTTP server and graceful shutdown.
//!
//! The server owns the wire: it accepts connections, lets hyper parse
//! HTTP/1.1 and HTTP/2, reads each request body to the end and hands a
//! [`Context`] to the [`Dispatcher`]. The flushed [`Response`] goes back to
//! hyper unchanged.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`: no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::app::{App, Dispatcher};
use crate::context::Context;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// # fn main() -> Result<(), trellis::Error> {
    /// let server = trellis::Server::bind("0.0.0.0:3000")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { bind: Bind::Addr(addr.parse()?) })
    }

    /// Serves on an already bound listener, e.g. one on port 0 in tests.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener) }
    }

    /// Serves `app` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections and returns.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        self.serve_with_shutdown(app, shutdown_signal()).await
    }

    /// Serves `app` until `signal` resolves, then drains in-flight
    /// connections and returns.
    pub async fn serve_with_shutdown(
        self,
        app: App,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let addr = listener.local_addr()?;

        for (method, route) in app.router().routes() {
            debug!(%method, route, "serving route");
        }
        let dispatcher = Arc::new(app.build());

        info!(%addr, "trellis listening");

        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown is checked first so a pending signal stops
                // accepting even while connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let dispatcher = Arc::clone(&dispatcher);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let dispatcher = Arc::clone(&dispatcher);
                            async move { handle(&dispatcher, req, remote_addr).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("trellis stopped");
        Ok(())
    }
}

/// Converts one hyper request into a [`Context`], dispatches it and converts
/// the flushed response back. Never fails: a body that cannot be read becomes
/// `400`, everything else goes through the chain.
async fn handle<B>(
    dispatcher: &Dispatcher,
    req: hyper::Request<B>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: fmt::Display,
{
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(
                peer = %remote_addr,
                method = %parts.method,
                path = parts.uri.path(),
                "failed to read request body: {e}"
            );
            return Ok(Response::status_only(StatusCode::BAD_REQUEST).into_http());
        }
    };

    let request = Request::from_parts(parts, body, remote_addr);
    Ok(dispatcher.dispatch(Context::new(request)).await.into_http())
}

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};

    use hyper::body::Frame;

    use super::*;
    use crate::middleware::ErrorPage;
    use crate::router::Router;

    /// A request body whose peer vanished mid-stream.
    struct Truncated;

    impl Body for Truncated {
        type Data = Bytes;
        type Error = io::Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
            Poll::Ready(Some(Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection reset"))))
        }
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    async fn ok(mut ctx: Context) -> Context {
        ctx.text("ok");
        ctx
    }

    fn dispatcher() -> Dispatcher {
        App::new(Router::new().post("/upload", ok).unwrap())
            .wrap(ErrorPage::with_defaults())
            .build()
    }

    #[tokio::test]
    async fn unreadable_body_is_a_bad_request() {
        let req = http::Request::post("/upload").body(Truncated).unwrap();
        let res = handle(&dispatcher(), req, peer()).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readable_body_reaches_the_handler() {
        let req = http::Request::post("/upload").body(Full::new(Bytes::from_static(b"data"))).unwrap();
        let res = handle(&dispatcher(), req, peer()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.into_body().collect().await.unwrap().to_bytes(), "ok");
    }

    #[tokio::test]
    async fn extension_method_runs_the_chain_and_gets_404() {
        let req = http::Request::builder()
            .method("PURGE")
            .uri("/upload")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let res = handle(&dispatcher(), req, peer()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("404 NOT FOUND"));
    }
}
