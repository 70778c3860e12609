use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Router, body::Body, routing::post};
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use x402_core::{
    transport::{PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER, PaymentPayload, SettlementResponse},
    types::{Base64EncodedHeader, X402V1},
};
use x402_kit::{
    mock::{MOCK_PAYER, MockFacilitator, MockOutcome},
    networks::evm::{EvmAddress, KnownNetwork},
};
use x402_random::{
    app,
    config::{AppConfig, FacilitatorConfig, FacilitatorPreset, LogFormat},
};

fn config() -> AppConfig {
    AppConfig {
        pay_to: EvmAddress::ZERO,
        network: KnownNetwork::BaseSepolia,
        price: "$0.01".parse().unwrap(),
        max_timeout_seconds: 60,
        facilitator: FacilitatorConfig {
            preset: FacilitatorPreset::X402Org,
            url: None,
            api_key: None,
        },
        resource_url: Url::parse("http://localhost:3000/api/random").unwrap(),
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        log_format: LogFormat::Compact,
    }
}

fn service(facilitator: MockFacilitator) -> Router {
    app::router(app::paywall(&config(), facilitator).unwrap())
}

/// The paywall in front of a handler that only counts its invocations.
fn counting_service(facilitator: MockFacilitator) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let router = Router::new().route(
        "/api/random",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "drawn"
            }
        }),
    );
    let paywall = app::paywall(&config(), facilitator).unwrap();
    (app::protect(router, paywall), calls)
}

fn payment(network: &str) -> String {
    let payload = PaymentPayload {
        x402_version: X402V1,
        scheme: "exact".to_string(),
        network: network.to_string(),
        payload: json!({
            "signature": "0x2d6a7588d6acca505cbf0d9a4a227e0c52c6c34008c8e8986a1283259764173608a2ce6496642e377d6da8dbbf5836e9bd15092f9ecab05ded3d6293af148b571c",
            "authorization": {
                "from": MOCK_PAYER,
                "to": "0x0000000000000000000000000000000000000000",
                "value": "10000",
                "validAfter": "1740672089",
                "validBefore": "1740672154",
                "nonce": "0xf3746613c2d920b5fdabc0856f2aeb2d4f88ee6037b8cc5d04a71a4462f13480"
            }
        }),
    };
    Base64EncodedHeader::try_from(&payload).unwrap().0
}

fn random_request(body: &str, payment: Option<String>) -> Request<Body> {
    let mut builder = Request::post("/api/random").header("content-type", "application/json");
    if let Some(payment) = payment {
        builder = builder.header(PAYMENT_HEADER, payment);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unpaid_request_gets_challenge_and_handler_never_runs() {
    let facilitator = MockFacilitator::valid();
    let (router, calls) = counting_service(facilitator.clone());

    let response = router.oneshot(random_request("{}", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(facilitator.verify_calls(), 0);

    let body = json_body(response).await;
    assert_eq!(body["x402Version"], 1);
    assert_eq!(body["error"], "X-PAYMENT header is required");

    let accepts = body["accepts"].as_array().unwrap();
    assert_eq!(accepts.len(), 1);
    let requirement = &accepts[0];
    assert_eq!(requirement["scheme"], "exact");
    assert_eq!(requirement["network"], "base-sepolia");
    assert_eq!(requirement["maxAmountRequired"], "10000");
    assert_eq!(requirement["resource"], "http://localhost:3000/api/random");
    assert_eq!(requirement["mimeType"], "application/json");
    assert_eq!(requirement["maxTimeoutSeconds"], 60);
    assert_eq!(
        requirement["asset"],
        "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
    );
    assert_eq!(requirement["extra"], json!({ "name": "USDC", "version": "2" }));
    assert_eq!(requirement["outputSchema"]["input"]["discoverable"], true);
}

#[tokio::test]
async fn invalid_payment_never_runs_handler() {
    let facilitator = MockFacilitator::invalid("invalid_exact_evm_payload_signature");
    let (router, calls) = counting_service(facilitator.clone());

    let response = router
        .oneshot(random_request("{}", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(facilitator.verify_calls(), 1);
    assert_eq!(facilitator.settle_calls(), 0);
    assert_eq!(
        json_body(response).await["error"],
        "invalid_exact_evm_payload_signature"
    );
}

#[tokio::test]
async fn valid_payment_runs_handler_exactly_once() {
    let facilitator = MockFacilitator::valid();
    let (router, calls) = counting_service(facilitator.clone());

    let response = router
        .oneshot(random_request("{}", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(facilitator.verify_calls(), 1);
    assert_eq!(facilitator.settle_calls(), 1);
}

#[tokio::test]
async fn facilitator_outage_fails_closed() {
    let facilitator = MockFacilitator::unreachable("connection refused");
    let (router, calls) = counting_service(facilitator.clone());

    let response = router
        .oneshot(random_request("{}", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn verification_timeout_fails_closed() {
    let facilitator = MockFacilitator::valid().with_delay(Duration::from_secs(120));
    let (router, calls) = counting_service(facilitator.clone());

    let response = router
        .oneshot(random_request("{}", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        json_body(response).await["error"],
        "payment verification timed out"
    );
}

#[tokio::test]
async fn duplicate_requests_are_each_verified() {
    let facilitator = MockFacilitator::valid();
    let (router, calls) = counting_service(facilitator.clone());
    let proof = payment("base-sepolia");

    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(random_request("{}", Some(proof.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(facilitator.verify_calls(), 3);
}

#[tokio::test]
async fn paid_default_range_returns_number_with_payment_metadata() {
    let facilitator = MockFacilitator::valid();
    let response = service(facilitator)
        .oneshot(random_request("{}", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let header = response
        .headers()
        .get(PAYMENT_RESPONSE_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let settlement = SettlementResponse::try_from(&Base64EncodedHeader(header)).unwrap();
    assert!(settlement.success);
    assert_eq!(settlement.payer, MOCK_PAYER);
    assert_eq!(settlement.network, "base-sepolia");

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let n = body["randomNumber"].as_i64().unwrap();
    assert!((1..=100).contains(&n));
    assert_eq!(body["range"], json!({ "min": 1, "max": 100 }));
    assert_eq!(body["cost"], "$0.01");
    assert_eq!(body["network"], "base-sepolia");

    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn empty_body_uses_default_range() {
    let response = service(MockFacilitator::valid())
        .oneshot(random_request("", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["range"],
        json!({ "min": 1, "max": 100 })
    );
}

#[tokio::test]
async fn single_point_range_always_returns_it() {
    let router = service(MockFacilitator::valid());

    for _ in 0..5 {
        let response = router
            .clone()
            .oneshot(random_request(
                r#"{"min": 5, "max": 5}"#,
                Some(payment("base-sepolia")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["randomNumber"], 5);
    }
}

#[tokio::test]
async fn inverted_range_is_bad_request_and_not_settled() {
    let facilitator = MockFacilitator::valid();
    let response = service(facilitator.clone())
        .oneshot(random_request(
            r#"{"min": 10, "max": 1}"#,
            Some(payment("base-sepolia")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(PAYMENT_RESPONSE_HEADER).is_none());
    assert_eq!(facilitator.settle_calls(), 0);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "`min` (10) must be less than or equal to `max` (1)"
    );
}

#[tokio::test]
async fn non_numeric_bound_is_bad_request() {
    let response = service(MockFacilitator::valid())
        .oneshot(random_request(
            r#"{"min": "one"}"#,
            Some(payment("base-sepolia")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "error": "`min` must be a finite number" })
    );
}

#[tokio::test]
async fn settlement_failure_returns_payment_required() {
    let facilitator =
        MockFacilitator::valid().with_settle(MockOutcome::Error("facilitator down".to_string()));
    let response = service(facilitator.clone())
        .oneshot(random_request("{}", Some(payment("base-sepolia"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(facilitator.settle_calls(), 1);
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("settlement failed")
    );
}

#[tokio::test]
async fn unprotected_routes_never_contact_facilitator() {
    let facilitator = MockFacilitator::invalid("unused");
    let router = service(facilitator.clone());

    let health = router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await, json!({ "status": "ok" }));

    let wrong_method = router
        .oneshot(Request::get("/api/random").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(facilitator.verify_calls(), 0);
}
