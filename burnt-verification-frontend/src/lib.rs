//! Verification data structures that are needed on the frontend, without the provider stack
//! that the host UI has no use for.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Opaque identifier selecting which attribute/template is being verified.
pub type VerificationTypeId = String;

/// Flat, provider-agnostic claims of a certificate.
pub type Claims = Map<String, Json>;

/// A standardized certificate attesting a user's attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurntAttributeCertificate {
    /// The verification type this certificate validates.
    pub verification_type_id: VerificationTypeId,
    /// Normalized claims extracted from the provider's proof(s).
    pub claims: Claims,
    /// Seconds since the epoch at which the provider asserted the claims.
    pub timestamp_s: u64,
    /// The session that produced this certificate.
    pub session_id: String,
    /// Milliseconds since the epoch at which this certificate was produced.
    pub created_at: u64,
    /// Raw provider payload(s), for diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Json>,
}

/// Options for starting a verification session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequestOptions {
    pub verification_type_id: VerificationTypeId,
    /// Redirect or webhook target handed to the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Caller context attached to the session, recoverable from the proof.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Json>>,
}

impl VerificationRequestOptions {
    pub fn new(verification_type_id: impl Into<VerificationTypeId>) -> Self {
        Self {
            verification_type_id: verification_type_id.into(),
            ..Default::default()
        }
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Json>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A started session: the URL the user must open and the id to await.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatedSession {
    pub url: String,
    pub session_id: String,
}
