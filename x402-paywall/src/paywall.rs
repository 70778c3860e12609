//! HTTP Paywall using x402 payments and a facilitator.
//!
//! For details, see the [`PayWall`] struct documentation.

use std::{sync::Arc, time::Duration};

use bon::Builder;
use http::{HeaderMap, Method, Request, Response};
use x402_core::{
    facilitator::{Facilitator, PaymentRequest, VerifyResult},
    transport::{PAYMENT_HEADER, PaymentPayload, PaymentRequirements},
    types::Base64EncodedHeader,
};

use crate::{
    errors::ErrorResponse,
    processor::{AdmittedRequest, PaymentState, Settlement},
    routes::ProtectedRoute,
};

/// A HTTP paywall that uses a facilitator to verify and settle payments.
///
/// The route table is fixed when the paywall is built. Every request goes
/// through two steps:
///
/// 1. **Admit** ([`admit`](PayWall::admit)): match the request against the
///    protected routes and, for a protected route, decode the `X-PAYMENT`
///    header and verify it with the facilitator. The result is an explicit
///    [`Admission`].
/// 2. **Run** ([`AdmittedRequest::run`]): run the handler exactly once and
///    settle the payment if the handler succeeded.
///
/// [`handle`](PayWall::handle) runs both steps.
///
/// Verification and settlement are each bounded by the route's
/// `maxTimeoutSeconds`. Timeouts and facilitator errors reject the request.
#[derive(Builder, Debug, Clone)]
pub struct PayWall<F: Facilitator> {
    /// The facilitator to use for payment verification and settlement.
    pub facilitator: F,
    /// Protected routes, checked in order; the first match wins.
    #[builder(with = |routes: impl IntoIterator<Item = ProtectedRoute>| routes.into_iter().collect::<Arc<[ProtectedRoute]>>())]
    pub routes: Arc<[ProtectedRoute]>,
}

/// The outcome of [`PayWall::admit`].
pub enum Admission<'pw, F: Facilitator, Req> {
    /// Forward to the handler.
    Admit(AdmittedRequest<'pw, F, Req>),
    /// Answer with the error response; the handler must not run.
    Reject(ErrorResponse),
}

impl<F: Facilitator> PayWall<F> {
    /// The protected route covering `method` and `path`, if any.
    pub fn route_for(&self, method: &Method, path: &str) -> Option<&ProtectedRoute> {
        self.routes.iter().find(|route| route.matches(method, path))
    }

    /// Decide whether a request may reach the handler.
    pub async fn admit<Req>(&self, request: Request<Req>) -> Admission<'_, F, Req> {
        let Some(route) = self.route_for(request.method(), request.uri().path()) else {
            return Admission::Admit(AdmittedRequest {
                paywall: self,
                request,
                settlement: None,
            });
        };

        let verified = self.verify(route, request.headers()).await;
        match verified {
            Ok(settlement) => Admission::Admit(AdmittedRequest {
                paywall: self,
                request,
                settlement: Some(settlement),
            }),
            Err(err) => Admission::Reject(err),
        }
    }

    /// Standard payment handling flow: admit, then run the handler.
    pub async fn handle<Fun, Fut, Req, Res>(
        &self,
        request: Request<Req>,
        handler: Fun,
    ) -> Result<Response<Res>, ErrorResponse>
    where
        Fun: FnOnce(Request<Req>) -> Fut,
        Fut: Future<Output = Response<Res>>,
    {
        match self.admit(request).await {
            Admission::Admit(admitted) => admitted.run(handler).await,
            Admission::Reject(err) => Err(err),
        }
    }

    /// Ask the facilitator which payment kinds it supports and warn about
    /// configured routes it cannot process.
    ///
    /// Returns the routes that are not supported. The configuration is left
    /// untouched either way.
    pub async fn check_supported(&self) -> Result<Vec<&ProtectedRoute>, F::Error> {
        let supported = self.facilitator.supported().await?;

        let unsupported: Vec<&ProtectedRoute> = self
            .routes
            .iter()
            .filter(|route| !supported.supports(&route.requirements))
            .collect();

        #[cfg(feature = "tracing")]
        for route in &unsupported {
            tracing::warn!(
                route = %route.pattern,
                scheme = %route.requirements.scheme,
                network = %route.requirements.network,
                "Facilitator does not support the payment kind of this route"
            );
        }

        Ok(unsupported)
    }

    async fn verify<'pw>(
        &self,
        route: &'pw ProtectedRoute,
        headers: &HeaderMap,
    ) -> Result<Settlement<'pw>, ErrorResponse> {
        let requirements = &route.requirements;
        let accepts = || vec![requirements.clone()];

        let Some(header) = headers.get(PAYMENT_HEADER) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(route = %route.pattern, "No payment attached; sending challenge");
            return Err(ErrorResponse::payment_required(accepts()));
        };

        let payment_header = header
            .to_str()
            .map(|s| Base64EncodedHeader(s.to_string()))
            .map_err(|err| {
                reject(ErrorResponse::invalid_payment(
                    format!("failed to read X-PAYMENT header: {err}"),
                    accepts(),
                ))
            })?;

        let payment_payload = PaymentPayload::try_from(&payment_header).map_err(|err| {
            reject(ErrorResponse::invalid_payment(
                format!("failed to decode X-PAYMENT header: {err}"),
                accepts(),
            ))
        })?;

        if !payload_matches(&payment_payload, requirements) {
            return Err(reject(ErrorResponse::invalid_payment(
                "payment payload does not match any accepted payment requirements",
                accepts(),
            )));
        }

        let payment_request = PaymentRequest {
            payment_header,
            payment_payload,
            payment_requirements: requirements.clone(),
        };

        let timeout = Duration::from_secs(requirements.max_timeout_seconds);
        let result =
            tokio::time::timeout(timeout, self.facilitator.verify(payment_request.clone())).await;

        let verified = match result {
            Ok(Ok(VerifyResult::Valid(valid))) => valid,
            Ok(Ok(VerifyResult::Invalid(invalid))) => {
                return Err(reject(ErrorResponse::invalid_payment(
                    invalid.invalid_reason,
                    accepts(),
                )));
            }
            Ok(Err(err)) => {
                return Err(reject(ErrorResponse::upstream_unavailable(
                    format!("payment verification failed: {err}"),
                    accepts(),
                )));
            }
            Err(_) => {
                return Err(reject(ErrorResponse::upstream_unavailable(
                    "payment verification timed out",
                    accepts(),
                )));
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Payment verified: payer='{}'", verified.payer);

        Ok(Settlement {
            route,
            request: payment_request,
            state: PaymentState {
                verified,
                cost: route.price.to_string(),
                network: requirements.network.clone(),
            },
        })
    }
}

fn payload_matches(payload: &PaymentPayload, requirements: &PaymentRequirements) -> bool {
    payload.scheme == requirements.scheme && payload.network == requirements.network
}

fn reject(err: ErrorResponse) -> ErrorResponse {
    #[cfg(feature = "tracing")]
    tracing::warn!(kind = ?err.kind, error = %err.body.error, "Payment rejected");
    err
}
