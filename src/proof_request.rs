//! Boundary of the third-party proof-request system.
//!
//! The system is consumed as an opaque capability: a [ProofRequestBackend] initializes
//! requests, and each [ProofRequest] handle produces a URL for the user and reports the outcome
//! of the out-of-process proof flow through a [SessionListener].
use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as Json;
use tokio::sync::oneshot;
use url::Url;

use crate::config::ProofRequestSetup;

/// Entry point of the proof-request system.
#[async_trait]
pub trait ProofRequestBackend: Debug {
    async fn init(
        &self,
        app_id: &str,
        app_secret: &str,
        verification_type_id: &str,
        setup: &ProofRequestSetup,
    ) -> Result<Box<dyn ProofRequest + Send + Sync>>;
}

/// A single in-flight proof request.
#[async_trait]
pub trait ProofRequest: Debug {
    /// The session id assigned by the proof-request system, if it exposes one.
    fn session_id(&self) -> Option<String>;

    fn set_app_callback_url(&mut self, url: &str);

    /// Attach caller context to the request. `message` is serialized JSON.
    fn add_context(&mut self, address: &str, message: String);

    async fn request_url(&self) -> Result<Url>;

    /// Start listening for the outcome of the proof flow.
    ///
    /// Implementations report the outcome through exactly one of
    /// [SessionListener::on_success] or [SessionListener::on_error]. The call itself may return
    /// as soon as the listener is installed.
    async fn start_session(&self, listener: SessionListener) -> Result<()>;
}

/// The success/error callback pair handed to [ProofRequest::start_session].
///
/// Both callbacks consume the listener, so at most one outcome is ever delivered.
#[derive(Debug)]
pub struct SessionListener(oneshot::Sender<Result<Json>>);

/// Receiving side of a [SessionListener].
pub(crate) type SessionOutcome = oneshot::Receiver<Result<Json>>;

impl SessionListener {
    pub(crate) fn channel() -> (Self, SessionOutcome) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Deliver the proof response: a single proof object or an array of proofs.
    pub fn on_success(self, response: Json) {
        // The receiver is gone when the caller stopped waiting.
        let _ = self.0.send(Ok(response));
    }

    pub fn on_error(self, error: anyhow::Error) {
        let _ = self.0.send(Err(error));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn listener_delivers_single_outcome() {
        let (listener, outcome) = SessionListener::channel();
        listener.on_success(json!({ "ok": true }));
        assert_eq!(outcome.await.unwrap().unwrap(), json!({ "ok": true }));
    }

    #[tokio::test]
    async fn dropped_listener_closes_outcome() {
        let (listener, outcome) = SessionListener::channel();
        drop(listener);
        assert!(outcome.await.is_err());
    }
}
