//! This library requests cryptographically-backed attestations of user attributes (employer,
//! email, account status) from pluggable verification providers, and normalizes each provider's
//! proof output into one stable certificate shape, the [`BurntAttributeCertificate`].
//!
//! # Usage
//!
//! ```ignore
//! use burnt_verification::{config::VerifierConfig, verifier::Verifier, VerificationRequestOptions};
//!
//! // Setup verifier.
//! let verifier = Verifier::builder()
//!     .with_config(VerifierConfig::new(app_id, app_secret))
//!     .with_backend(proof_request_backend)
//!     .build()?;
//!
//! // Start a session with the provider.
//! let options = VerificationRequestOptions::new(verification_type_id)
//!     .with_metadata(metadata);
//! let session = verifier.initialize_session(&options).await?;
//!
//! // Present the URL to the user (e.g., as a QR code).
//! let qr_code = generate_qr_code(&session.url)?;
//!
//! // Wait until the user has completed the proof flow.
//! let certificate = verifier.verify(&session.session_id).await?;
//! ```
//!
//! Setting `mode: "mock"` (or `defaultProvider: "mock"`) in the [`VerifierConfig`] builds a
//! verifier that needs no backend and resolves every session to a fixed certificate.
//!
//! [`VerifierConfig`]: crate::config::VerifierConfig
//!
//! # Providers
//!
//! Providers are a closed set of adapters, see [`ProviderAdapter`]. The Reclaim adapter drives a
//! third-party proof-request system through the [`ProofRequestBackend`] trait, which the
//! application supplies.
//!
//! [`ProviderAdapter`]: crate::provider::ProviderAdapter
//! [`ProofRequestBackend`]: crate::proof_request::ProofRequestBackend
//!
//! # Session Lifecycle
//!
//! 1. *Initialization*: the adapter creates a proof request, attaches the caller's metadata when
//!    there is any, and registers the request handle under a fresh session id.
//! 2. *Proof flow*: the user completes the proof out-of-process, using the returned URL.
//! 3. *Resolution*: [`Verifier::verify`] takes the handle out of the registry, waits for the
//!    provider's outcome and returns the certificate or the provider's error. A session resolves
//!    at most once.
//!
//! [`Verifier::verify`]: crate::verifier::Verifier::verify
//!
//! # Claims
//!
//! Provider proofs are nested and partially stringified. The [`normalize`] module flattens them
//! into a single claims map; see its documentation for the precedence rules.

pub mod config;
pub mod error;
pub mod normalize;
pub mod proof_request;
pub mod provider;
pub mod registry;
pub mod utils;
pub mod verifier;

pub use burnt_verification_frontend::{
    BurntAttributeCertificate, Claims, InitiatedSession, VerificationRequestOptions,
    VerificationTypeId,
};
