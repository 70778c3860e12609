//! A scriptable in-process facilitator.
//!
//! [`MockFacilitator`] answers every call with a preconfigured outcome and
//! counts how often it was asked, so admission behavior can be exercised
//! without a network. Clones share their call counters.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use x402_core::{
    facilitator::{
        Facilitator, PaymentRequest, SettleFailed, SettleResult, SettleSuccess, SupportedKind,
        SupportedResponse, VerifyInvalid, VerifyResult, VerifyValid,
    },
    types::X402Version,
};

/// Payer reported for every accepted payment.
pub const MOCK_PAYER: &str = "0x1111111111111111111111111111111111111111";

/// Transaction hash reported for every settlement.
pub const MOCK_TRANSACTION: &str =
    "0x2222222222222222222222222222222222222222222222222222222222222222";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// VALID for verify, success for settle.
    Accept,
    /// INVALID for verify, failure for settle, with the given reason.
    Reject(String),
    /// The call itself fails, as a transport error would.
    Error(String),
}

#[derive(Debug, thiserror::Error)]
#[error("mock facilitator error: {0}")]
pub struct MockFacilitatorError(pub String);

#[derive(Debug, Default)]
struct CallCounts {
    supported: AtomicUsize,
    verify: AtomicUsize,
    settle: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct MockFacilitator {
    verify: MockOutcome,
    settle: MockOutcome,
    delay: Option<Duration>,
    kinds: Vec<SupportedKind>,
    calls: Arc<CallCounts>,
}

impl MockFacilitator {
    /// Verifies and settles everything.
    pub fn valid() -> Self {
        MockFacilitator {
            verify: MockOutcome::Accept,
            settle: MockOutcome::Accept,
            delay: None,
            kinds: default_kinds(),
            calls: Arc::default(),
        }
    }

    /// Reports every proof as INVALID.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::valid().with_verify(MockOutcome::Reject(reason.into()))
    }

    /// Fails every verify call without an answer.
    pub fn unreachable(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::valid()
            .with_verify(MockOutcome::Error(message.clone()))
            .with_settle(MockOutcome::Error(message))
    }

    pub fn with_verify(mut self, outcome: MockOutcome) -> Self {
        self.verify = outcome;
        self
    }

    pub fn with_settle(mut self, outcome: MockOutcome) -> Self {
        self.settle = outcome;
        self
    }

    /// Sleep before answering verify and settle.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_supported(mut self, kinds: Vec<SupportedKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn supported_calls(&self) -> usize {
        self.calls.supported.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.calls.verify.load(Ordering::SeqCst)
    }

    pub fn settle_calls(&self) -> usize {
        self.calls.settle.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockFacilitator {
    fn default() -> Self {
        Self::valid()
    }
}

fn default_kinds() -> Vec<SupportedKind> {
    ["base", "base-sepolia"]
        .into_iter()
        .map(|network| SupportedKind {
            x402_version: X402Version::V1,
            scheme: "exact".to_string(),
            network: network.to_string(),
            extra: None,
        })
        .collect()
}

impl Facilitator for MockFacilitator {
    type Error = MockFacilitatorError;

    async fn supported(&self) -> Result<SupportedResponse, Self::Error> {
        self.calls.supported.fetch_add(1, Ordering::SeqCst);
        Ok(SupportedResponse {
            kinds: self.kinds.clone(),
        })
    }

    async fn verify(&self, _request: PaymentRequest) -> Result<VerifyResult, Self::Error> {
        self.calls.verify.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        match &self.verify {
            MockOutcome::Accept => Ok(VerifyResult::Valid(VerifyValid {
                payer: MOCK_PAYER.to_string(),
            })),
            MockOutcome::Reject(reason) => Ok(VerifyResult::Invalid(VerifyInvalid {
                invalid_reason: reason.clone(),
                payer: Some(MOCK_PAYER.to_string()),
            })),
            MockOutcome::Error(message) => Err(MockFacilitatorError(message.clone())),
        }
    }

    async fn settle(&self, request: PaymentRequest) -> Result<SettleResult, Self::Error> {
        self.calls.settle.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        match &self.settle {
            MockOutcome::Accept => Ok(SettleResult::Success(SettleSuccess {
                payer: MOCK_PAYER.to_string(),
                transaction: MOCK_TRANSACTION.to_string(),
                network: request.payment_requirements.network,
            })),
            MockOutcome::Reject(reason) => Ok(SettleResult::Failed(SettleFailed {
                error_reason: reason.clone(),
                payer: Some(MOCK_PAYER.to_string()),
            })),
            MockOutcome::Error(message) => Err(MockFacilitatorError(message.clone())),
        }
    }
}
