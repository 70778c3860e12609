//! The HTTP application: routes, the paywall and request tracing.

use axum::{
    Router,
    body::Bytes,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use http::Extensions;
use serde_json::json;
use tower_http::trace::TraceLayer;
use x402_core::{
    facilitator::Facilitator,
    types::{FieldDefinition, HttpInput, Input, InputBodyType, Method, OutputSchema},
};
use x402_kit::{core::Resource, price::PriceError, schemes::exact_evm::ExactEvm};
use x402_paywall::{
    axum::paywall_middleware,
    paywall::PayWall,
    processor::PaymentState,
    routes::{ProtectedRoute, RouteError, RoutePattern},
};

use crate::{
    config::{AppConfig, RANDOM_PATH},
    random,
    request::{self, DEFAULT_MAX, DEFAULT_MIN},
    response::ResponseEnvelope,
};

pub const DESCRIPTION: &str =
    "Random Number Generation Service - Returns a random number within the specified range";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// `POST /api/random`.
pub async fn random_number(extensions: Extensions, body: Bytes) -> Response {
    let range = match request::parse_range(&body) {
        Ok(range) => range,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected random number request");
            return ResponseEnvelope::failure(&err).into_response();
        }
    };

    let n = random::draw_thread_local(range);
    let payment = extensions.get::<PaymentState>();
    tracing::info!(
        random_number = n,
        min = range.min(),
        max = range.max(),
        payer = payment.map(|p| p.verified.payer.as_str()),
        "Served random number"
    );

    ResponseEnvelope::success(n, range, Utc::now(), payment).into_response()
}

/// Discovery metadata for the paid endpoint.
pub fn output_schema() -> OutputSchema {
    let number = |description: &str| {
        FieldDefinition::builder()
            .field_type("number")
            .description(description)
            .build()
    };

    OutputSchema::builder()
        .input(Input::Http(
            HttpInput::builder()
                .discoverable(true)
                .method(Method::Post)
                .body_type(InputBodyType::Json)
                .body_fields([
                    (
                        "min",
                        FieldDefinition::builder()
                            .field_type("number")
                            .description("Minimum value for random number (default: 1)")
                            .default_value(DEFAULT_MIN)
                            .build(),
                    ),
                    (
                        "max",
                        FieldDefinition::builder()
                            .field_type("number")
                            .description("Maximum value for random number (default: 100)")
                            .default_value(DEFAULT_MAX)
                            .build(),
                    ),
                ])
                .build(),
        ))
        .output([
            (
                "success",
                FieldDefinition::builder().field_type("boolean").build(),
            ),
            ("randomNumber", number("The drawn number")),
            (
                "range",
                FieldDefinition::builder()
                    .field_type("object")
                    .properties([("min", number("Lower bound")), ("max", number("Upper bound"))])
                    .build(),
            ),
            (
                "timestamp",
                FieldDefinition::builder()
                    .field_type("string")
                    .format("date-time")
                    .build(),
            ),
            ("cost", FieldDefinition::builder().field_type("string").build()),
            (
                "network",
                FieldDefinition::builder().field_type("string").build(),
            ),
        ])
        .build()
}

/// The protected route for `POST /api/random` under `config`.
pub fn protected_route(config: &AppConfig) -> Result<ProtectedRoute, AppError> {
    let scheme = ExactEvm::builder()
        .network(config.network)
        .pay_to(config.pay_to)
        .price(config.price)
        .max_timeout_seconds(config.max_timeout_seconds)
        .resource(
            Resource::builder()
                .url(config.resource_url.clone())
                .description(DESCRIPTION)
                .mime_type("application/json")
                .output_schema(output_schema())
                .build(),
        )
        .build();

    let pattern = format!("POST {RANDOM_PATH}").parse::<RoutePattern>()?;
    Ok(ProtectedRoute::exact_evm(pattern, &scheme)?)
}

pub fn paywall<F: Facilitator>(config: &AppConfig, facilitator: F) -> Result<PayWall<F>, AppError> {
    Ok(PayWall::builder()
        .facilitator(facilitator)
        .routes([protected_route(config)?])
        .build())
}

/// Put `router` behind `paywall` and trace every request.
pub fn protect<F>(router: Router, paywall: PayWall<F>) -> Router
where
    F: Facilitator + Clone + Send + Sync + 'static,
{
    router
        .layer(from_fn_with_state(paywall, paywall_middleware::<F>))
        .layer(TraceLayer::new_for_http())
}

/// The full application.
pub fn router<F>(paywall: PayWall<F>) -> Router
where
    F: Facilitator + Clone + Send + Sync + 'static,
{
    protect(
        Router::new()
            .route(RANDOM_PATH, post(random_number))
            .route("/health", get(health)),
        paywall,
    )
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}
