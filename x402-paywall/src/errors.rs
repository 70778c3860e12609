use std::fmt::Display;

use bytes::Bytes;
use http::{HeaderValue, Response, StatusCode, header::CONTENT_TYPE};
use http_body_util::Full;
use x402_core::{
    transport::{PaymentRequirements, PaymentRequirementsResponse},
    types::X402V1,
};

/// Why the paywall refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No payment was attached.
    ChallengeRequired,
    /// A payment was attached but is malformed, mismatched or rejected.
    VerificationFailed,
    /// The facilitator could not be reached or did not answer in time.
    UpstreamUnavailable,
    /// The handler ran but the payment could not be settled.
    SettlementFailed,
}

/// Represents an error response from the paywall.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub status: StatusCode,
    /// The body of the error response.
    ///
    /// Body is Boxed to reduce size of the struct.
    pub body: Box<PaymentRequirementsResponse>,
}

impl ErrorResponse {
    fn new(kind: ErrorKind, error: String, accepts: Vec<PaymentRequirements>) -> Self {
        ErrorResponse {
            kind,
            status: StatusCode::PAYMENT_REQUIRED,
            body: Box::new(PaymentRequirementsResponse {
                x402_version: X402V1,
                error,
                accepts,
            }),
        }
    }

    /// Payment needed to access resource
    pub fn payment_required(accepts: Vec<PaymentRequirements>) -> Self {
        Self::new(
            ErrorKind::ChallengeRequired,
            "X-PAYMENT header is required".to_string(),
            accepts,
        )
    }

    /// Malformed, mismatched or rejected payment
    pub fn invalid_payment(reason: impl Display, accepts: Vec<PaymentRequirements>) -> Self {
        Self::new(ErrorKind::VerificationFailed, reason.to_string(), accepts)
    }

    /// Facilitator unreachable or timed out
    pub fn upstream_unavailable(reason: impl Display, accepts: Vec<PaymentRequirements>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, reason.to_string(), accepts)
    }

    pub fn settlement_failed(reason: impl Display, accepts: Vec<PaymentRequirements>) -> Self {
        Self::new(
            ErrorKind::SettlementFailed,
            format!("settlement failed: {reason}"),
            accepts,
        )
    }
}

impl From<ErrorResponse> for Response<Full<Bytes>> {
    fn from(err: ErrorResponse) -> Self {
        let (status, body) = match serde_json::to_vec(&err.body) {
            Ok(body) => (err.status, body),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Vec::new()),
        };

        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status, axum::extract::Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use super::*;

    #[tokio::test]
    async fn converts_to_json_http_response() {
        let response: Response<Full<Bytes>> =
            ErrorResponse::invalid_payment("bad signature", Vec::new()).into();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({ "x402Version": 1, "error": "bad signature", "accepts": [] })
        );
    }

    #[test]
    fn every_refusal_is_payment_required() {
        let errors = [
            ErrorResponse::payment_required(Vec::new()),
            ErrorResponse::invalid_payment("x", Vec::new()),
            ErrorResponse::upstream_unavailable("x", Vec::new()),
            ErrorResponse::settlement_failed("x", Vec::new()),
        ];
        for err in errors {
            assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED, "{:?}", err.kind);
        }
    }
}
