//! Payment schemes.

pub mod exact_evm;
