//! # X402 Kit
//!
//! Seller-side building blocks for charging per request with x402 v1:
//!
//! - **[`networks`]**: EVM networks, addresses and the USDC deployment on each.
//! - **[`price`]**: Dollar prices and their conversion to asset atomic units.
//! - **[`core`]**: The description of a paid resource.
//! - **[`schemes`]**: Payment schemes that turn a price and a resource into
//!   [`PaymentRequirements`](x402_core::transport::PaymentRequirements).
//! - **[`facilitator_client`]**: An HTTP client for hosted facilitators
//!   (feature `facilitator-client`, on by default).
//! - **[`mock`]**: A scriptable in-process facilitator for tests (feature `mock`).
//!
//! ## Example
//!
//! ```
//! use url_macro::url;
//! use x402_kit::{
//!     core::Resource,
//!     networks::evm::{EvmAddress, KnownNetwork},
//!     schemes::exact_evm::ExactEvm,
//! };
//!
//! let requirements = ExactEvm::builder()
//!     .network(KnownNetwork::BaseSepolia)
//!     .pay_to(EvmAddress::ZERO)
//!     .price("$0.01".parse().unwrap())
//!     .resource(
//!         Resource::builder()
//!             .url(url!("https://example.com/api/random"))
//!             .description("Random Number Generation Service")
//!             .mime_type("application/json")
//!             .build(),
//!     )
//!     .build()
//!     .requirements()
//!     .unwrap();
//!
//! assert_eq!(requirements.max_amount_required.to_string(), "10000");
//! ```

pub mod core;
pub mod networks;
pub mod price;
pub mod schemes;

#[cfg(feature = "facilitator-client")]
pub mod facilitator_client;

#[cfg(feature = "mock")]
pub mod mock;
