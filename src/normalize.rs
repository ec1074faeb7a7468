//! Flattening of provider proofs into [BurntAttributeCertificate] claims.
//!
//! Proofs are handled as untyped JSON. Claims are collected from a fixed, ordered list of
//! locations inside each proof and overlaid onto one flat map, later locations overwriting
//! earlier ones:
//!
//! 1. `extractedParameterValues`
//! 2. `claimData.parameters` (object or JSON string): its `paramValues`, then the object itself
//! 3. `claimData.context` (object or JSON string): its `extractedParameters`, then its
//!    `contextMessage` (object or JSON string), which carries the metadata attached when the
//!    session was initialized
//! 4. top-level `paramValues`, then top-level `extractedParameters`
//!
//! A location that cannot be decoded is skipped; the remaining locations are still read.
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::{
    utils::{epoch_millis, epoch_seconds, NonEmptyVec},
    BurntAttributeCertificate, Claims,
};

/// Keys used as containers inside proofs, never reported as claims.
pub const RESERVED_CLAIM_KEYS: [&str; 2] = ["parameters", "context"];

const UNKNOWN_VERIFICATION_TYPE: &str = "unknown";

#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("no proof received from provider")]
    NoProof,
    #[error("`{location}` is not valid JSON: {source}")]
    InvalidJson {
        location: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{location}` is not an object")]
    NotAnObject { location: &'static str },
}

/// Split a provider success response, which is either one proof or an array of proofs.
pub fn proofs_from_response(response: Json) -> Result<NonEmptyVec<Json>, NormalizationError> {
    let proofs = match response {
        Json::Array(proofs) => proofs,
        Json::Null => vec![],
        proof => vec![proof],
    };
    let proofs = NonEmptyVec::maybe_new(proofs).ok_or(NormalizationError::NoProof)?;
    if proofs.head().is_null() {
        return Err(NormalizationError::NoProof);
    }
    Ok(proofs)
}

/// Build the certificate for a session from all proofs it produced.
///
/// Claims are merged across proofs in order, so a later proof wins on a shared key.
/// Certificate metadata comes from the first proof only.
pub fn certificate_from_proofs(
    session_id: &str,
    proofs: NonEmptyVec<Json>,
) -> BurntAttributeCertificate {
    let claims = proofs.iter().fold(Claims::new(), |mut claims, proof| {
        claims.extend(claims_from_proof(proof));
        claims
    });

    let first = proofs.head();
    let verification_type_id = verification_type_id(first);
    let timestamp_s = timestamp_s(first).unwrap_or_else(epoch_seconds);

    let mut proofs = proofs.into_inner();
    let context = if proofs.len() > 1 {
        Json::Array(proofs)
    } else {
        proofs.swap_remove(0)
    };

    BurntAttributeCertificate {
        verification_type_id,
        claims,
        timestamp_s,
        session_id: session_id.to_owned(),
        created_at: epoch_millis(),
        context: Some(context),
    }
}

/// Flatten the claims of a single proof.
pub fn claims_from_proof(proof: &Json) -> Claims {
    let mut overlay = Overlay::default();

    overlay.merge(map_at(proof, "extractedParameterValues"));

    let claim_data = proof.get("claimData");

    match decoded_map_at(claim_data, "claimData.parameters", "parameters") {
        Ok(Some(parameters)) => {
            overlay.merge(map_at(&parameters, "paramValues"));
            overlay.merge(Ok(Some(parameters)));
        }
        other => overlay.merge(other),
    }

    match decoded_map_at(claim_data, "claimData.context", "context") {
        Ok(Some(context)) => {
            overlay.merge(map_at(&context, "extractedParameters"));
            overlay.merge(decoded_map_at(
                Some(&context),
                "contextMessage",
                "contextMessage",
            ));
        }
        other => overlay.merge(other),
    }

    overlay.merge(map_at(proof, "paramValues"));
    overlay.merge(map_at(proof, "extractedParameters"));

    let mut claims = overlay.claims;
    for key in RESERVED_CLAIM_KEYS {
        claims.remove(key);
    }
    debug!(count = claims.len(), "flattened proof claims");
    claims
}

#[derive(Default)]
struct Overlay {
    claims: Claims,
}

impl Overlay {
    fn merge(&mut self, contribution: Result<Option<Map<String, Json>>, NormalizationError>) {
        match contribution {
            Ok(Some(map)) => self.claims.extend(map),
            Ok(None) => {}
            Err(e) => warn!("skipping claim source: {e}"),
        }
    }
}

fn is_absent(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        _ => false,
    }
}

/// An object stored directly under `key`.
fn map_at(
    parent: &impl ObjectLike,
    key: &'static str,
) -> Result<Option<Map<String, Json>>, NormalizationError> {
    match parent.field(key) {
        None => Ok(None),
        Some(value) if is_absent(value) => Ok(None),
        Some(Json::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(NormalizationError::NotAnObject { location: key }),
    }
}

/// An object stored under `key`, either inline or encoded as a JSON string.
fn decoded_map_at(
    parent: Option<&impl ObjectLike>,
    location: &'static str,
    key: &str,
) -> Result<Option<Map<String, Json>>, NormalizationError> {
    let Some(value) = parent.and_then(|p| p.field(key)) else {
        return Ok(None);
    };
    if is_absent(value) {
        return Ok(None);
    }
    let decoded;
    let value = match value {
        Json::String(encoded) => {
            decoded = serde_json::from_str::<Json>(encoded)
                .map_err(|source| NormalizationError::InvalidJson { location, source })?;
            &decoded
        }
        value => value,
    };
    match value {
        Json::Object(map) => Ok(Some(map.clone())),
        _ => Err(NormalizationError::NotAnObject { location }),
    }
}

trait ObjectLike {
    fn field(&self, key: &str) -> Option<&Json>;
}

impl ObjectLike for Json {
    fn field(&self, key: &str) -> Option<&Json> {
        self.get(key)
    }
}

impl ObjectLike for Map<String, Json> {
    fn field(&self, key: &str) -> Option<&Json> {
        self.get(key)
    }
}

fn non_empty_str<'a>(value: Option<&'a Json>) -> Option<&'a str> {
    value.and_then(Json::as_str).filter(|s| !s.is_empty())
}

fn verification_type_id(proof: &Json) -> String {
    non_empty_str(proof.pointer("/claimData/provider"))
        .or_else(|| non_empty_str(proof.get("providerId")))
        .unwrap_or(UNKNOWN_VERIFICATION_TYPE)
        .to_owned()
}

fn timestamp_s(proof: &Json) -> Option<u64> {
    let parse = |value: &Json| match value {
        Json::Number(n) => n.as_u64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    };
    [proof.get("timestampS"), proof.pointer("/claimData/timestampS")]
        .into_iter()
        .flatten()
        .filter_map(parse)
        .find(|&t| t > 0)
}
