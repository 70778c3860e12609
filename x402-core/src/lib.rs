//! x402 core types.
//!
//! Wire types for version 1 of the x402 payment protocol, as spoken by the
//! `X-PAYMENT` / `X-PAYMENT-RESPONSE` headers and by HTTP facilitators, plus
//! the [`Facilitator`](facilitator::Facilitator) capability that payment gates
//! delegate verification and settlement to.

pub mod errors;
pub mod facilitator;
pub mod transport;
pub mod types;
