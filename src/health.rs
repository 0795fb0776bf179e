//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! ```rust
//! use trellis::{Router, health};
//!
//! let router = Router::new()
//!     .get("/healthz", health::liveness)
//!     .and_then(|r| r.get("/readyz", health::readiness));
//! assert!(router.is_ok());
//! ```
//!
//! Replace `readiness` with your own handler to gate on dependencies.

use crate::Context;

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(mut ctx: Context) -> Context {
    ctx.text("ok");
    ctx
}

/// `200 OK` with body `"ready"`.
pub async fn readiness(mut ctx: Context) -> Context {
    ctx.text("ready");
    ctx
}
