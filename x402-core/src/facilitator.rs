//! The facilitator capability.
//!
//! A facilitator checks payment proofs and settles them on-chain on behalf of
//! a seller. Sellers never verify signatures themselves; they hand the proof
//! and the requirement it claims to satisfy to a [`Facilitator`].

use serde::{Deserialize, Serialize};

use crate::{
    transport::{PaymentPayload, PaymentRequirements, SettlementResponse},
    types::{AnyJson, Base64EncodedHeader, X402Version},
};

/// A payment proof paired with the requirement it is checked against.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// The raw `X-PAYMENT` header, as received.
    pub payment_header: Base64EncodedHeader,
    pub payment_payload: PaymentPayload,
    pub payment_requirements: PaymentRequirements,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Valid(VerifyValid),
    Invalid(VerifyInvalid),
}

impl VerifyResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyResult::Valid(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyValid {
    pub payer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyInvalid {
    pub invalid_reason: String,
    pub payer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleResult {
    Success(SettleSuccess),
    Failed(SettleFailed),
}

impl SettleResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SettleResult::Success(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleSuccess {
    pub payer: String,
    pub transaction: String,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleFailed {
    pub error_reason: String,
    pub payer: Option<String>,
}

impl From<SettleSuccess> for SettlementResponse {
    fn from(success: SettleSuccess) -> Self {
        SettlementResponse {
            success: true,
            transaction: success.transaction,
            network: success.network,
            payer: success.payer,
        }
    }
}

/// A `(version, scheme, network)` combination a facilitator can process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedKind {
    pub x402_version: X402Version,
    pub scheme: String,
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<AnyJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedResponse {
    pub kinds: Vec<SupportedKind>,
}

impl SupportedResponse {
    /// Whether this facilitator processes v1 payments for `requirements`.
    pub fn supports(&self, requirements: &PaymentRequirements) -> bool {
        self.kinds.iter().any(|kind| {
            kind.x402_version.is_v1()
                && kind.scheme == requirements.scheme
                && kind.network == requirements.network
        })
    }
}

/// Verification and settlement of payment proofs.
///
/// Errors mean the facilitator could not be asked (transport failure, bad
/// response); a definite "no" is reported through [`VerifyResult::Invalid`]
/// or [`SettleResult::Failed`] instead.
pub trait Facilitator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn supported(&self) -> impl Future<Output = Result<SupportedResponse, Self::Error>> + Send;

    fn verify(
        &self,
        request: PaymentRequest,
    ) -> impl Future<Output = Result<VerifyResult, Self::Error>> + Send;

    fn settle(
        &self,
        request: PaymentRequest,
    ) -> impl Future<Output = Result<SettleResult, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn supports_matches_v1_scheme_and_network() {
        let supported: SupportedResponse = serde_json::from_value(json!({
            "kinds": [
                { "x402Version": 1, "scheme": "exact", "network": "base-sepolia" },
                { "x402Version": 2, "scheme": "exact", "network": "eip155:8453" },
                {
                    "x402Version": 1,
                    "scheme": "exact",
                    "network": "solana-devnet",
                    "extra": { "feePayer": "2wKupLR9q6wXYppw8Gr2NvWxKBUqm4PPJKkQfoxHDBg4" }
                }
            ]
        }))
        .unwrap();

        let mut requirements: PaymentRequirements = serde_json::from_value(json!({
            "scheme": "exact",
            "network": "base-sepolia",
            "maxAmountRequired": "10000",
            "resource": "http://localhost:3000/api/random",
            "description": "",
            "mimeType": "application/json",
            "payTo": "0x0000000000000000000000000000000000000000",
            "maxTimeoutSeconds": 60,
            "asset": "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
        }))
        .unwrap();

        assert!(supported.supports(&requirements));

        requirements.network = "base".to_string();
        assert!(!supported.supports(&requirements));
    }
}
