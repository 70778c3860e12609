//! Re-usable building blocks of the x402 wire format.

mod amount;
mod common;
mod schema;

pub use amount::*;
pub use common::*;
pub use schema::*;
