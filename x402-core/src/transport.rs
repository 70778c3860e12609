//! x402 v1 HTTP transport types.
//!
//! A protected resource answers unpaid requests with `402 Payment Required` and
//! a [`PaymentRequirementsResponse`] body. The client retries with an
//! `X-PAYMENT` header holding a base64-encoded [`PaymentPayload`]; once the
//! payment settles, the server attaches an `X-PAYMENT-RESPONSE` header holding
//! a base64-encoded [`SettlementResponse`].

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{AmountValue, AnyJson, Base64EncodedHeader, OutputSchema, X402V1};

/// Request header carrying the client's payment proof.
pub const PAYMENT_HEADER: &str = "x-payment";

/// Response header carrying the settlement receipt.
pub const PAYMENT_RESPONSE_HEADER: &str = "x-payment-response";

/// One way of paying for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Scheme name, e.g. `exact`.
    pub scheme: String,
    /// Network name, e.g. `base-sepolia`.
    pub network: String,
    /// Price in the asset's atomic units.
    pub max_amount_required: AmountValue,
    /// URL of the resource being paid for.
    pub resource: Url,
    pub description: String,
    /// MIME type of the resource response.
    pub mime_type: String,
    /// Recipient address.
    pub pay_to: String,
    /// Upper bound on how long the payment may take to verify and settle.
    pub max_timeout_seconds: u64,
    /// Asset contract address.
    pub asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<OutputSchema>,
    /// Scheme-specific data, e.g. the EIP-712 domain of the asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<AnyJson>,
}

/// The decoded content of an `X-PAYMENT` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: X402V1,
    pub scheme: String,
    pub network: String,
    /// Scheme-specific signed authorization; opaque to the seller.
    pub payload: AnyJson,
}

impl TryFrom<&Base64EncodedHeader> for PaymentPayload {
    type Error = crate::errors::Error;

    fn try_from(header: &Base64EncodedHeader) -> Result<Self, Self::Error> {
        header.decode()
    }
}

impl TryFrom<&PaymentPayload> for Base64EncodedHeader {
    type Error = serde_json::Error;

    fn try_from(payload: &PaymentPayload) -> Result<Self, Self::Error> {
        Base64EncodedHeader::encode(payload)
    }
}

/// Body of a `402 Payment Required` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirementsResponse {
    pub x402_version: X402V1,
    pub error: String,
    pub accepts: Vec<PaymentRequirements>,
}

/// The decoded content of an `X-PAYMENT-RESPONSE` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub success: bool,
    pub transaction: String,
    pub network: String,
    pub payer: String,
}

impl TryFrom<&SettlementResponse> for Base64EncodedHeader {
    type Error = serde_json::Error;

    fn try_from(response: &SettlementResponse) -> Result<Self, Self::Error> {
        Base64EncodedHeader::encode(response)
    }
}

impl TryFrom<&Base64EncodedHeader> for SettlementResponse {
    type Error = crate::errors::Error;

    fn try_from(header: &Base64EncodedHeader) -> Result<Self, Self::Error> {
        header.decode()
    }
}
