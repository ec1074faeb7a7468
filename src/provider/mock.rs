use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::{
    error::VerificationError,
    utils::{epoch_millis, epoch_seconds},
    BurntAttributeCertificate, Claims, InitiatedSession, VerificationRequestOptions,
};

use super::VerificationProvider;

pub const MOCK_VERIFICATION_URL: &str = "http://localhost:8080/mock-verification-page";
pub const MOCK_VERIFICATION_DELAY: Duration = Duration::from_secs(2);

const MOCK_VERIFICATION_TYPE: &str = "mock-provider";

/// A provider that never talks to an external system.
///
/// Sessions are not tracked: every session id resolves, after [MOCK_VERIFICATION_DELAY], to the
/// same fixed set of claims.
#[derive(Debug, Default)]
pub struct MockProvider {
    last_issued_ms: AtomicU64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Millisecond timestamp for a new session id, strictly greater than any issued before.
    fn next_stamp(&self) -> u64 {
        let now = epoch_millis();
        let (Ok(last) | Err(last)) = self
            .last_issued_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            });
        now.max(last + 1)
    }
}

pub fn mock_claims() -> Claims {
    [
        ("companyName", "Mock Company Inc."),
        ("email", "test@mockcompany.com"),
        ("employmentStatus", "Active"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.into()))
    .collect()
}

#[async_trait]
impl VerificationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn initialize_session(
        &self,
        options: &VerificationRequestOptions,
    ) -> Result<InitiatedSession, VerificationError> {
        let session_id = format!("mock_session_{}", self.next_stamp());
        debug!(
            %session_id,
            verification_type_id = %options.verification_type_id,
            "initialized mock session"
        );
        Ok(InitiatedSession {
            url: MOCK_VERIFICATION_URL.to_owned(),
            session_id,
        })
    }

    async fn wait_for_verification(
        &self,
        session_id: &str,
    ) -> Result<BurntAttributeCertificate, VerificationError> {
        debug!(%session_id, "waiting for mock verification");
        tokio::time::sleep(MOCK_VERIFICATION_DELAY).await;

        Ok(BurntAttributeCertificate {
            verification_type_id: MOCK_VERIFICATION_TYPE.to_owned(),
            claims: mock_claims(),
            timestamp_s: epoch_seconds(),
            session_id: session_id.to_owned(),
            created_at: epoch_millis(),
            context: Some(json!({ "mock": true })),
        })
    }
}
