use std::{fmt, sync::Arc};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::ProofRequestSetup,
    error::VerificationError,
    normalize,
    proof_request::{ProofRequest, ProofRequestBackend, SessionListener},
    registry::SessionRegistry,
    BurntAttributeCertificate, InitiatedSession, VerificationRequestOptions,
};

use super::VerificationProvider;

/// Address under which caller metadata is attached to a proof request.
const CONTEXT_ADDRESS: &str = "0x0";

type Handle = Box<dyn ProofRequest + Send + Sync>;

/// Adapter for the Reclaim proof-request system.
///
/// Every initialized session keeps its [ProofRequest] handle in a [SessionRegistry] until
/// [wait_for_verification](VerificationProvider::wait_for_verification) takes it out.
pub struct ReclaimProvider {
    app_id: String,
    app_secret: String,
    setup: ProofRequestSetup,
    backend: Arc<dyn ProofRequestBackend + Send + Sync>,
    sessions: SessionRegistry<Handle>,
}

impl ReclaimProvider {
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        backend: Arc<dyn ProofRequestBackend + Send + Sync>,
    ) -> Result<Self, VerificationError> {
        let app_id = app_id.into();
        let app_secret = app_secret.into();

        if app_id.is_empty() {
            return Err(VerificationError::configuration(
                "reclaim provider requires an app id",
            ));
        }
        if app_secret.is_empty() {
            return Err(VerificationError::configuration(
                "reclaim provider requires an app secret",
            ));
        }

        Ok(Self {
            app_id,
            app_secret,
            setup: ProofRequestSetup::default(),
            backend,
            sessions: SessionRegistry::new(),
        })
    }

    /// Override the options passed to the proof-request system for every session.
    pub fn with_setup(mut self, setup: ProofRequestSetup) -> Self {
        self.setup = setup;
        self
    }
}

impl fmt::Debug for ReclaimProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReclaimProvider")
            .field("app_id", &self.app_id)
            .field("setup", &self.setup)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl VerificationProvider for ReclaimProvider {
    fn name(&self) -> &str {
        "reclaim"
    }

    async fn initialize_session(
        &self,
        options: &VerificationRequestOptions,
    ) -> Result<InitiatedSession, VerificationError> {
        let mut request = self
            .backend
            .init(
                &self.app_id,
                &self.app_secret,
                &options.verification_type_id,
                &self.setup,
            )
            .await
            .context("unable to initialize the proof request")
            .map_err(VerificationError::ProviderInitialization)?;

        if let Some(callback_url) = &options.callback_url {
            request.set_app_callback_url(callback_url);
        }

        if let Some(metadata) = options.metadata.as_ref().filter(|m| !m.is_empty()) {
            let message = serde_json::to_string(metadata)
                .context("unable to serialize session metadata")
                .map_err(VerificationError::ProviderInitialization)?;
            request.add_context(CONTEXT_ADDRESS, message);
        }

        let url = request
            .request_url()
            .await
            .context("unable to generate the request URL")
            .map_err(VerificationError::ProviderInitialization)?;

        let session_id = request
            .session_id()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("reclaim_session_{}", Uuid::new_v4()));

        self.sessions.register(&session_id, request).await?;

        info!(
            %session_id,
            verification_type_id = %options.verification_type_id,
            "initialized reclaim session"
        );

        Ok(InitiatedSession {
            url: url.into(),
            session_id,
        })
    }

    async fn wait_for_verification(
        &self,
        session_id: &str,
    ) -> Result<BurntAttributeCertificate, VerificationError> {
        let request = self.sessions.consume(session_id).await?;

        debug!(%session_id, "waiting for reclaim proof");

        let (listener, outcome) = SessionListener::channel();
        let response = match request.start_session(listener).await {
            Ok(()) => outcome.await.unwrap_or_else(|_| {
                Err(anyhow!("proof request session closed without a result"))
            }),
            Err(e) => Err(e.context("unable to start the proof request session")),
        };
        drop(request);

        let response = response.map_err(|e| {
            warn!(%session_id, "reclaim verification failed: {e:#}");
            VerificationError::ProviderVerification(e)
        })?;

        let proofs = normalize::proofs_from_response(response).map_err(|e| {
            warn!(%session_id, "reclaim verification failed: {e}");
            VerificationError::ProviderVerification(e.into())
        })?;
        let certificate = normalize::certificate_from_proofs(session_id, proofs);

        info!(
            %session_id,
            verification_type_id = %certificate.verification_type_id,
            claims = certificate.claims.len(),
            "reclaim verification succeeded"
        );

        Ok(certificate)
    }
}
