use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use tokio::sync::Mutex;

use crate::error::VerificationError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The id is active or was issued before. Indicates a bug in the issuing adapter.
    #[error("session {0} was already registered")]
    AlreadyRegistered(String),
    #[error("session {0} not found or expired")]
    NotFound(String),
}

impl From<RegistryError> for VerificationError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(id) => VerificationError::SessionNotFound(id),
            e @ RegistryError::AlreadyRegistered(_) => {
                VerificationError::ProviderInitialization(e.into())
            }
        }
    }
}

/// Tracks the adapter-owned handle of every session awaiting an external proof.
///
/// A session is active from [register](Self::register) until [consume](Self::consume) removes
/// it. Consumed ids can never be registered again, so a terminal session cannot be revived.
/// They are remembered for the lifetime of the registry, which therefore grows by one id per
/// resolved session.
#[derive(Debug)]
pub struct SessionRegistry<H> {
    sessions: Mutex<Sessions<H>>,
}

#[derive(Debug)]
struct Sessions<H> {
    active: BTreeMap<String, H>,
    /// Every consumed id. Never pruned, so it grows with each resolved session; a long-running
    /// host that cares about this memory should periodically replace the verifier.
    retired: BTreeSet<String>,
}

impl<H> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(Sessions {
                active: BTreeMap::new(),
                retired: BTreeSet::new(),
            }),
        }
    }
}

impl<H> SessionRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, session_id: &str, handle: H) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.active.contains_key(session_id) || sessions.retired.contains(session_id) {
            return Err(RegistryError::AlreadyRegistered(session_id.to_owned()));
        }
        sessions.active.insert(session_id.to_owned(), handle);
        Ok(())
    }

    /// Remove the session and hand back its handle. Succeeds at most once per session id.
    pub async fn consume(&self, session_id: &str) -> Result<H, RegistryError> {
        let mut sessions = self.sessions.lock().await;
        let handle = sessions
            .active
            .remove(session_id)
            .ok_or_else(|| RegistryError::NotFound(session_id.to_owned()))?;
        sessions.retired.insert(session_id.to_owned());
        Ok(handle)
    }
}
