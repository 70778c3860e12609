//! The `exact` scheme on EVM networks: the client signs an EIP-3009
//! `transferWithAuthorization` for exactly the quoted amount of USDC.

use bon::Builder;
use serde_json::json;
use x402_core::transport::PaymentRequirements;

use crate::{
    core::Resource,
    networks::evm::{EvmAddress, KnownNetwork},
    price::{Price, PriceError},
};

pub const SCHEME_NAME: &str = "exact";

/// Default payment window, matching the x402 reference middleware.
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 60;

/// An exact-amount USDC payment requirement.
#[derive(Builder, Debug, Clone)]
pub struct ExactEvm {
    #[builder(default)]
    pub network: KnownNetwork,
    /// Recipient of the payment.
    #[builder(into)]
    pub pay_to: EvmAddress,
    pub price: Price,
    #[builder(default = DEFAULT_MAX_TIMEOUT_SECONDS)]
    pub max_timeout_seconds: u64,
    pub resource: Resource,
}

impl ExactEvm {
    /// Build the wire-level requirement, converting the price to USDC atomic units.
    pub fn requirements(&self) -> Result<PaymentRequirements, PriceError> {
        let asset = self.network.usdc();
        let amount = self.price.to_atomic_units(asset.decimals)?;

        Ok(PaymentRequirements {
            scheme: SCHEME_NAME.to_string(),
            network: self.network.name().to_string(),
            max_amount_required: amount,
            resource: self.resource.url.clone(),
            description: self.resource.description.clone(),
            mime_type: self.resource.mime_type.clone(),
            pay_to: self.pay_to.to_string(),
            max_timeout_seconds: self.max_timeout_seconds,
            asset: asset.address.to_string(),
            output_schema: self.resource.output_schema.clone(),
            extra: asset
                .eip712_domain
                .map(|domain| json!({ "name": domain.name, "version": domain.version })),
        })
    }
}
