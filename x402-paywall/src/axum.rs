//! Axum integration.
//!
//! ```rust,no_run
//! use axum::{Router, middleware::from_fn_with_state, routing::post};
//! use x402_kit::mock::MockFacilitator;
//! use x402_paywall::{axum::paywall_middleware, paywall::PayWall};
//!
//! let paywall = PayWall::builder()
//!     .facilitator(MockFacilitator::valid())
//!     .routes([])
//!     .build();
//!
//! let app: Router = Router::new()
//!     .route("/api/random", post(|| async { "paid" }))
//!     .layer(from_fn_with_state(paywall, paywall_middleware::<MockFacilitator>));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use x402_core::facilitator::Facilitator;

use crate::paywall::PayWall;

/// Middleware for [`axum::middleware::from_fn_with_state`].
///
/// Requests outside the paywall's routes reach `next` unchanged.
pub async fn paywall_middleware<F>(
    State(paywall): State<PayWall<F>>,
    request: Request,
    next: Next,
) -> Response
where
    F: Facilitator + Clone + Send + Sync + 'static,
{
    paywall
        .handle(request, |req| next.run(req))
        .await
        .unwrap_or_else(IntoResponse::into_response)
}
