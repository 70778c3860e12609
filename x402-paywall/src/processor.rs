use std::time::Duration;

use http::{HeaderName, HeaderValue, Request, Response, header::ACCESS_CONTROL_EXPOSE_HEADERS};
use x402_core::{
    facilitator::{Facilitator, PaymentRequest, SettleResult, SettleSuccess, VerifyValid},
    transport::{PAYMENT_RESPONSE_HEADER, SettlementResponse},
    types::Base64EncodedHeader,
};

use crate::{errors::ErrorResponse, paywall::PayWall, routes::ProtectedRoute};

/// The state of a verified payment, attached to the request extensions before
/// the protected handler runs.
///
/// # Example
///
/// ```rust
/// use axum::{extract::Extension, Json};
/// use serde_json::{json, Value};
/// use x402_paywall::processor::PaymentState;
///
/// async fn handler(Extension(payment): Extension<PaymentState>) -> Json<Value> {
///     Json(json!({ "cost": payment.cost, "network": payment.network }))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentState {
    pub verified: VerifyValid,
    /// Configured price of the route, e.g. `$0.01`.
    pub cost: String,
    /// Network the payment is made on, e.g. `base-sepolia`.
    pub network: String,
}

/// A verified payment that settles once the handler succeeds.
pub struct Settlement<'pw> {
    pub route: &'pw ProtectedRoute,
    pub request: PaymentRequest,
    pub state: PaymentState,
}

impl Settlement<'_> {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.route.requirements.max_timeout_seconds)
    }
}

/// A request the paywall let through.
///
/// Requests to unprotected paths carry no settlement and reach the handler
/// untouched.
pub struct AdmittedRequest<'pw, F: Facilitator, Req> {
    pub paywall: &'pw PayWall<F>,
    pub request: Request<Req>,
    pub settlement: Option<Settlement<'pw>>,
}

impl<'pw, F: Facilitator, Req> AdmittedRequest<'pw, F, Req> {
    pub fn is_paid(&self) -> bool {
        self.settlement.is_some()
    }

    /// Run the handler once, then settle the payment if the response is a
    /// success (2xx).
    ///
    /// Unsuccessful responses are returned as they are and nothing is settled.
    /// A failed settlement replaces the handler's response with a 402.
    pub async fn run<Fun, Fut, Res>(self, handler: Fun) -> Result<Response<Res>, ErrorResponse>
    where
        Fun: FnOnce(Request<Req>) -> Fut,
        Fut: Future<Output = Response<Res>>,
    {
        let AdmittedRequest {
            paywall,
            mut request,
            settlement,
        } = self;

        let Some(settlement) = settlement else {
            return Ok(handler(request).await);
        };

        request.extensions_mut().insert(settlement.state.clone());
        let response = handler(request).await;

        if !response.status().is_success() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                status = %response.status(),
                "Handler did not succeed; skipping settlement"
            );
            return Ok(response);
        }

        let settled = paywall.settle(&settlement).await?;
        Ok(attach_settlement(response, settled))
    }
}

impl<F: Facilitator> PayWall<F> {
    async fn settle(&self, settlement: &Settlement<'_>) -> Result<SettleSuccess, ErrorResponse> {
        let accepts = || vec![settlement.route.requirements.clone()];

        let result = tokio::time::timeout(
            settlement.timeout(),
            self.facilitator.settle(settlement.request.clone()),
        )
        .await;

        let settled = match result {
            Ok(Ok(SettleResult::Success(settled))) => settled,
            Ok(Ok(SettleResult::Failed(failed))) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(reason = %failed.error_reason, "Payment settlement rejected");
                return Err(ErrorResponse::settlement_failed(
                    failed.error_reason,
                    accepts(),
                ));
            }
            Ok(Err(err)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "Payment settlement request failed");
                return Err(ErrorResponse::settlement_failed(err, accepts()));
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    timeout_secs = settlement.route.requirements.max_timeout_seconds,
                    "Payment settlement timed out"
                );
                return Err(ErrorResponse::settlement_failed(
                    "facilitator did not respond in time",
                    accepts(),
                ));
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Payment settled: payer='{}', transaction='{}', network='{}'",
            settled.payer,
            settled.transaction,
            settled.network
        );

        Ok(settled)
    }
}

/// Add the `X-PAYMENT-RESPONSE` header to a settled response.
fn attach_settlement<Res>(mut response: Response<Res>, settled: SettleSuccess) -> Response<Res> {
    let settlement_response = SettlementResponse::from(settled);

    let value = Base64EncodedHeader::try_from(&settlement_response)
        .inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to encode X-PAYMENT-RESPONSE header: {_err}; skipping");
        })
        .ok()
        .and_then(|header| HeaderValue::from_str(header.as_str()).ok());

    if let Some(value) = value {
        let headers = response.headers_mut();
        headers.insert(HeaderName::from_static(PAYMENT_RESPONSE_HEADER), value);
        headers.insert(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(PAYMENT_RESPONSE_HEADER),
        );
    }

    response
}
