//! # x402 Random
//!
//! A random number service that charges per call with x402.
//!
//! `POST /api/random` takes an optional `{"min": .., "max": ..}` body and
//! answers with a uniformly drawn integer. The route sits behind an
//! [`x402_paywall`] gate: unpaid calls get a `402 Payment Required` challenge,
//! and paid calls are verified with a facilitator before the draw and settled
//! after it.

pub mod app;
pub mod config;
pub mod random;
pub mod request;
pub mod response;
pub mod telemetry;
