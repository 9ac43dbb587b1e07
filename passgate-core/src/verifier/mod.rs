//! Delegated verification capability.
//!
//! Options issuance and cryptographic response verification belong to a
//! standards-compliant WebAuthn library; the ceremonies depend on this
//! trait rather than on any particular one. Options and client responses
//! cross the trait boundary as raw JSON: their shape is the WebAuthn wire
//! contract and must reach the client without reshaping.

mod stub;
mod webauthn;

pub use stub::StubVerifier;
pub use webauthn::WebauthnVerifier;

use serde_json::Value;
use uuid::Uuid;

use crate::types::{AssertionResult, Credential, RegisteredCredential};

/// Verification errors.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("invalid relying party configuration: {0}")]
    Configuration(String),

    #[error("malformed client response: {0}")]
    MalformedResponse(String),

    #[error("challenge mismatch")]
    ChallengeMismatch,

    #[error("origin '{0}' is not an accepted origin")]
    OriginNotAllowed(String),

    #[error("serialization failure: {0}")]
    Serialization(String),

    /// Verification rejected by the underlying library.
    #[error("{0}")]
    Rejected(String),
}

/// Issues challenges and verifies signed authenticator responses.
///
/// The state types bind issued options to the matching finish call; they
/// are held in the [`ChallengeCache`](crate::ChallengeCache) between the
/// two halves of a ceremony and are opaque to everything else.
pub trait CeremonyVerifier: Send + Sync + 'static {
    type RegistrationState: Send + Sync + 'static;
    type AuthenticationState: Send + Sync + 'static;

    /// Issue credential creation options, excluding already-registered
    /// credentials so an authenticator can refuse re-registration.
    fn begin_registration(
        &self,
        username: &str,
        display_name: &str,
        user_handle: Uuid,
        exclude: &[Credential],
    ) -> Result<(Value, Self::RegistrationState), VerifierError>;

    /// Verify an attestation response against the pending state and
    /// extract the new credential's material.
    fn verify_registration(
        &self,
        response: &Value,
        state: &Self::RegistrationState,
    ) -> Result<RegisteredCredential, VerifierError>;

    /// Issue assertion request options scoped to the `allow` credentials.
    fn begin_authentication(
        &self,
        allow: &[Credential],
    ) -> Result<(Value, Self::AuthenticationState), VerifierError>;

    /// Verify an assertion response against the pending state, returning
    /// the asserted signature counter.
    fn verify_authentication(
        &self,
        response: &Value,
        state: &Self::AuthenticationState,
    ) -> Result<AssertionResult, VerifierError>;
}

/// Transport hints as the client reported them, straight off the wire.
fn wire_transports(response: &Value) -> Vec<String> {
    response
        .pointer("/response/transports")
        .and_then(Value::as_array)
        .map(|transports| {
            transports
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Wire credential id (`id` field) of an attestation or assertion response.
fn credential_id_of(response: &Value) -> Result<String, VerifierError> {
    response
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| VerifierError::MalformedResponse("missing credential id".into()))
}
