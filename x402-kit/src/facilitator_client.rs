//! An HTTP client for remote x402 v1 facilitators.
//!
//! All hosted facilitators speak the same three endpoints relative to a base
//! URL: `GET supported`, `POST verify` and `POST settle`. They differ only in
//! where they live and how callers authenticate, so each one is a preset of
//! the same [`FacilitatorClient`].

use std::time::Duration;

use http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;
use x402_core::{
    facilitator::{
        Facilitator, PaymentRequest, SettleFailed, SettleResult, SettleSuccess, SupportedResponse,
        VerifyInvalid, VerifyResult, VerifyValid,
    },
    transport::{PaymentPayload, PaymentRequirements},
    types::X402V1,
};

/// Public facilitator run by x402.org. Serves testnets without credentials.
pub const X402_ORG_FACILITATOR_URL: &str = "https://x402.org/facilitator/";

/// PayAI facilitator. Serves testnets and mainnets without credentials.
pub const PAYAI_FACILITATOR_URL: &str = "https://facilitator.payai.network/";


const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FacilitatorClientError {
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("HTTP request error: {0}")]
    HttpRequestError(#[from] reqwest::Error),
    #[error("Serialization/Deserialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("facilitator responded with status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

/// Body of `POST verify` and `POST settle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorRequestBody {
    pub x402_version: X402V1,
    pub payment_payload: PaymentPayload,
    pub payment_requirements: PaymentRequirements,
}

impl From<PaymentRequest> for FacilitatorRequestBody {
    fn from(request: PaymentRequest) -> Self {
        FacilitatorRequestBody {
            x402_version: X402V1,
            payment_payload: request.payment_payload,
            payment_requirements: request.payment_requirements,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponseBody {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(default)]
    pub payer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponseBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(default)]
    pub payer: Option<String>,
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

impl From<VerifyResponseBody> for VerifyResult {
    fn from(body: VerifyResponseBody) -> Self {
        if body.is_valid {
            VerifyResult::Valid(VerifyValid {
                payer: body.payer.unwrap_or_default(),
            })
        } else {
            VerifyResult::Invalid(VerifyInvalid {
                invalid_reason: body
                    .invalid_reason
                    .unwrap_or_else(|| "unspecified".to_string()),
                payer: body.payer,
            })
        }
    }
}

impl From<SettleResponseBody> for SettleResult {
    fn from(body: SettleResponseBody) -> Self {
        if body.success {
            SettleResult::Success(SettleSuccess {
                payer: body.payer.unwrap_or_default(),
                transaction: body.transaction.unwrap_or_default(),
                network: body.network.unwrap_or_default(),
            })
        } else {
            SettleResult::Failed(SettleFailed {
                error_reason: body
                    .error_reason
                    .unwrap_or_else(|| "unspecified".to_string()),
                payer: body.payer,
            })
        }
    }
}

/// A remote facilitator reached over HTTP.
#[derive(Debug, Clone)]
pub struct FacilitatorClient {
    pub base_url: Url,
    pub client: reqwest::Client,
    pub headers: HeaderMap,
}

impl FacilitatorClient {
    /// Create a client for the facilitator at `base_url`.
    ///
    /// A trailing slash is added when missing so that endpoint paths resolve
    /// beneath the base rather than replacing its last segment.
    pub fn from_url(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        FacilitatorClient {
            base_url,
            client: default_http_client(),
            headers: HeaderMap::new(),
        }
    }

    pub fn x402_org() -> Result<Self, FacilitatorClientError> {
        Ok(Self::from_url(Url::parse(X402_ORG_FACILITATOR_URL)?))
    }

    pub fn payai() -> Result<Self, FacilitatorClientError> {
        Ok(Self::from_url(Url::parse(PAYAI_FACILITATOR_URL)?))
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: &str) -> Result<Self, FacilitatorClientError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, FacilitatorClientError> {
        let response = self
            .client
            .post(self.base_url.join(endpoint)?)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await?;

        read_body(response).await
    }
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Decode a facilitator response.
///
/// Some facilitators answer a rejected payment with `400` and a regular
/// verify/settle body, so a non-success status is only an error when the body
/// does not decode as the expected type.
async fn read_body<R: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<R, FacilitatorClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    match serde_json::from_slice::<R>(&bytes) {
        Ok(body) => Ok(body),
        Err(err) if status.is_success() => Err(err.into()),
        Err(_) => Err(FacilitatorClientError::UnexpectedStatus {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }),
    }
}

impl Facilitator for FacilitatorClient {
    type Error = FacilitatorClientError;

    async fn supported(&self) -> Result<SupportedResponse, Self::Error> {
        let response = self
            .client
            .get(self.base_url.join("supported")?)
            .headers(self.headers.clone())
            .send()
            .await?;

        read_body(response).await
    }

    async fn verify(&self, request: PaymentRequest) -> Result<VerifyResult, Self::Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            scheme = %request.payment_requirements.scheme,
            network = %request.payment_requirements.network,
            "Verifying payment with facilitator at {}",
            self.base_url
        );

        let body = FacilitatorRequestBody::from(request);
        let result: VerifyResponseBody = self.post("verify", &body).await?;
        Ok(result.into())
    }

    async fn settle(&self, request: PaymentRequest) -> Result<SettleResult, Self::Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            scheme = %request.payment_requirements.scheme,
            network = %request.payment_requirements.network,
            "Settling payment with facilitator at {}",
            self.base_url
        );

        let body = FacilitatorRequestBody::from(request);
        let result: SettleResponseBody = self.post("settle", &body).await?;
        Ok(result.into())
    }
}
