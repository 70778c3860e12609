//! # X402 Paywall
//!
//! An x402 v1 payment gate for HTTP routes.
//!
//! [`PayWall`](paywall::PayWall) holds a fixed table of
//! [`ProtectedRoute`](routes::ProtectedRoute)s and a facilitator. A request to
//! a protected route is admitted only after its `X-PAYMENT` proof verifies;
//! the handler then runs exactly once and the payment settles if the handler
//! succeeded. Everything else passes through.
//!
//! ## Modules
//!
//! - [`routes`]: Route patterns and the payment each protected route costs.
//! - [`paywall`]: The [`PayWall`](paywall::PayWall) and its [`Admission`](paywall::Admission) stage.
//! - [`processor`]: Admitted requests, settlement and [`PaymentState`](processor::PaymentState).
//! - [`errors`]: 402 responses and their [`ErrorKind`](errors::ErrorKind).
//! - `axum`: Middleware for axum (feature `axum`).
//!
//! ## Error Handling
//!
//! Every refusal is a `402 Payment Required` with a JSON
//! `PaymentRequirementsResponse` body. Malformed proofs, rejected proofs and
//! facilitator failures all refuse the request; nothing is admitted on
//! uncertainty.

pub mod errors;
pub mod paywall;
pub mod processor;
pub mod routes;

#[cfg(feature = "axum")]
pub mod axum;
