/// Errors surfaced by the [Verifier](crate::verifier::Verifier) and the provider adapters.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The configuration selects a provider that cannot be constructed. Raised before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The external proof-request system could not produce a session.
    #[error("provider failed to initialize the session: {0:#}")]
    ProviderInitialization(anyhow::Error),

    /// The session id is unknown, expired or was already consumed.
    #[error("session {0} not found or expired")]
    SessionNotFound(String),

    /// The external proof-request system reported a failure.
    #[error("provider verification failed: {0:#}")]
    ProviderVerification(anyhow::Error),
}

impl VerificationError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
