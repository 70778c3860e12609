//! The JSON envelope returned by the random number endpoint.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use http::StatusCode;
use serde::Serialize;
use x402_paywall::processor::PaymentState;

use crate::request::{Range, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Price paid for the call, e.g. `$0.01`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(
        random_number: i64,
        range: Range,
        at: DateTime<Utc>,
        payment: Option<&PaymentState>,
    ) -> Self {
        ResponseEnvelope {
            success: true,
            random_number: Some(random_number),
            range: Some(range),
            timestamp: Some(format_timestamp(at)),
            cost: payment.map(|p| p.cost.clone()),
            network: payment.map(|p| p.network.clone()),
            error: None,
        }
    }

    pub fn failure(error: &ValidationError) -> Self {
        ResponseEnvelope {
            success: false,
            random_number: None,
            range: None,
            timestamp: None,
            cost: None,
            network: None,
            error: Some(error.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2025-11-02T00:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::{Value, json};
    use x402_core::facilitator::VerifyValid;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(at()), "2025-11-02T00:00:00.000Z");
    }

    #[test]
    fn unpaid_success_omits_payment_fields() {
        let envelope = ResponseEnvelope::success(42, Range::default(), at(), None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": true,
                "randomNumber": 42,
                "range": { "min": 1, "max": 100 },
                "timestamp": "2025-11-02T00:00:00.000Z"
            })
        );
        assert_eq!(envelope.status(), StatusCode::OK);
    }

    #[test]
    fn paid_success_includes_cost_and_network() {
        let payment = PaymentState {
            verified: VerifyValid {
                payer: "0xpayer".to_string(),
            },
            cost: "$0.01".to_string(),
            network: "base-sepolia".to_string(),
        };
        let envelope =
            ResponseEnvelope::success(7, Range::new(5, 10).unwrap(), at(), Some(&payment));
        let value: Value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["cost"], "$0.01");
        assert_eq!(value["network"], "base-sepolia");
        assert_eq!(value["range"], json!({ "min": 5, "max": 10 }));
    }

    #[test]
    fn failure_is_bad_request() {
        let envelope = ResponseEnvelope::failure(&ValidationError::InvalidJson);
        assert_eq!(envelope.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": false, "error": "request body must be valid JSON" })
        );
    }
}
