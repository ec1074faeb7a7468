use async_trait::async_trait;

use crate::{
    error::VerificationError, BurntAttributeCertificate, InitiatedSession,
    VerificationRequestOptions,
};

pub use mock::MockProvider;
pub use reclaim::ReclaimProvider;

pub mod mock;
pub mod reclaim;

/// A verification backend able to start sessions and wait for their outcome.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// The name of the provider, e.g. `reclaim`.
    fn name(&self) -> &str;

    /// Start a session with the external proof system.
    ///
    /// ## Returns
    /// - URL the user must open to complete the proof flow.
    /// - Session id to pass to [wait_for_verification](Self::wait_for_verification).
    async fn initialize_session(
        &self,
        options: &VerificationRequestOptions,
    ) -> Result<InitiatedSession, VerificationError>;

    /// Wait until the user has completed (or failed) the proof flow of a session.
    ///
    /// Each session resolves at most once; later calls fail with
    /// [SessionNotFound](VerificationError::SessionNotFound).
    async fn wait_for_verification(
        &self,
        session_id: &str,
    ) -> Result<BurntAttributeCertificate, VerificationError>;
}

/// The closed set of provider adapters, selected once when the verifier is built.
#[derive(Debug)]
pub enum ProviderAdapter {
    Reclaim(ReclaimProvider),
    Mock(MockProvider),
}

impl ProviderAdapter {
    fn inner(&self) -> &dyn VerificationProvider {
        match self {
            ProviderAdapter::Reclaim(p) => p,
            ProviderAdapter::Mock(p) => p,
        }
    }
}

#[async_trait]
impl VerificationProvider for ProviderAdapter {
    fn name(&self) -> &str {
        self.inner().name()
    }

    async fn initialize_session(
        &self,
        options: &VerificationRequestOptions,
    ) -> Result<InitiatedSession, VerificationError> {
        self.inner().initialize_session(options).await
    }

    async fn wait_for_verification(
        &self,
        session_id: &str,
    ) -> Result<BurntAttributeCertificate, VerificationError> {
        self.inner().wait_for_verification(session_id).await
    }
}
