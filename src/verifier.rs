use std::sync::Arc;

use tracing::debug;

use crate::{
    config::{Mode, ProofRequestSetup, ProviderSelection, VerifierConfig},
    error::VerificationError,
    proof_request::ProofRequestBackend,
    provider::{MockProvider, ProviderAdapter, ReclaimProvider, VerificationProvider},
    BurntAttributeCertificate, InitiatedSession, VerificationRequestOptions,
};

/// Entry point for requesting attribute attestations.
///
/// The verifier holds no session state itself; it forwards both lifecycle calls to the provider
/// adapter chosen when it was built.
#[derive(Debug)]
pub struct Verifier {
    provider: ProviderAdapter,
}

impl Verifier {
    /// Build a new verifier.
    pub fn builder() -> VerifierBuilder {
        VerifierBuilder::default()
    }

    /// Name of the selected provider adapter.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Start a new verification session.
    ///
    /// ## Returns
    /// The URL the user must open (typically rendered as a link or QR code) and the session id
    /// to pass to [verify](Self::verify).
    pub async fn initialize_session(
        &self,
        options: &VerificationRequestOptions,
    ) -> Result<InitiatedSession, VerificationError> {
        self.provider.initialize_session(options).await
    }

    /// Wait for the outcome of a session.
    ///
    /// Suspends until the user completes the proof flow or the provider reports an error. There
    /// is no timeout: dropping the returned future abandons the session, and a new one must be
    /// initialized to try again.
    pub async fn verify(
        &self,
        session_id: &str,
    ) -> Result<BurntAttributeCertificate, VerificationError> {
        self.provider.wait_for_verification(session_id).await
    }
}

/// Builder struct for [Verifier].
#[derive(Debug, Clone, Default)]
pub struct VerifierBuilder {
    config: Option<VerifierConfig>,
    backend: Option<Arc<dyn ProofRequestBackend + Send + Sync>>,
    setup: Option<ProofRequestSetup>,
}

impl VerifierBuilder {
    /// Build the verifier, selecting the provider adapter from the configuration.
    ///
    /// No I/O is performed; unsupported selections fail with
    /// [Configuration](VerificationError::Configuration).
    pub fn build(self) -> Result<Verifier, VerificationError> {
        let Self {
            config,
            backend,
            setup,
        } = self;

        let Some(config) = config else {
            return Err(VerificationError::configuration(
                "config is required, see `with_config`",
            ));
        };

        let provider = match (&config.default_provider, config.mode) {
            (Some(ProviderSelection::Primus), _) => {
                return Err(VerificationError::configuration(
                    "primus provider not yet implemented",
                ))
            }
            (Some(ProviderSelection::Unsupported(p)), _) => {
                return Err(VerificationError::configuration(format!(
                    "unsupported provider '{p}'"
                )))
            }
            (Some(ProviderSelection::Mock), _) | (_, Some(Mode::Mock)) => {
                ProviderAdapter::Mock(MockProvider::new())
            }
            (Some(ProviderSelection::Reclaim) | None, Some(Mode::Reclaim) | None) => {
                let Some(backend) = backend else {
                    return Err(VerificationError::configuration(
                        "proof request backend is required, see `with_backend`",
                    ));
                };
                let provider = ReclaimProvider::new(config.app_id, config.app_secret, backend)?;
                ProviderAdapter::Reclaim(provider.with_setup(setup.unwrap_or_default()))
            }
        };

        debug!(provider = provider.name(), "built verifier");

        Ok(Verifier { provider })
    }

    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the proof-request system used by the Reclaim provider.
    pub fn with_backend(mut self, backend: Arc<dyn ProofRequestBackend + Send + Sync>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Override the default [ProofRequestSetup] of the Reclaim provider.
    pub fn with_setup(mut self, setup: ProofRequestSetup) -> Self {
        self.setup = Some(setup);
        self
    }
}
