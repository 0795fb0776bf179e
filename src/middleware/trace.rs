//! Request tracing.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, field, info, info_span};

use crate::context::Context;
use crate::handler::{BoxedHandler, boxed};
use crate::middleware::Middleware;

/// Opens an `info` span per request with `method` and `path`, records the
/// matched `route` and final `status` on it, and logs the latency once the
/// inner chain returns.
///
/// Register it first so the span covers every other middleware.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

pub fn trace() -> Trace {
    Trace
}

impl Middleware for Trace {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        boxed(move |ctx: Context| {
            let next = Arc::clone(&next);
            let span = info_span!(
                "request",
                method = %ctx.request().http_method(),
                path = ctx.path(),
                route = field::Empty,
                status = field::Empty,
            );
            let recorder = span.clone();
            async move {
                let start = Instant::now();
                let ctx = next.call(ctx).await;
                recorder.record("route", ctx.matched_route().unwrap_or("-"));
                recorder.record("status", ctx.status().as_u16());
                info!(latency_us = start.elapsed().as_micros() as u64, "request completed");
                ctx
            }
            .instrument(span)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::request::Request;

    #[tokio::test]
    async fn passes_the_context_through_untouched() {
        let terminal = boxed(|mut ctx: Context| async move {
            ctx.set_status(http::StatusCode::ACCEPTED);
            ctx
        });
        let ctx = Trace
            .wrap(terminal)
            .call(Context::new(Request::new(Method::Get, "/jobs")))
            .await;
        assert_eq!(ctx.status(), http::StatusCode::ACCEPTED);
    }
}
