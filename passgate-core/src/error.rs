//! Ceremony error taxonomy.

use thiserror::Error;

use crate::store::StoreError;
use crate::types::CeremonyKind;
use crate::verifier::VerifierError;

/// Errors surfaced by the registration and authentication ceremonies.
///
/// Everything except `Store` reflects a client-visible protocol failure;
/// none are fatal to the process.
#[derive(Debug, Error)]
pub enum CeremonyError {
    /// The request was structurally invalid before any protocol step ran.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("user '{0}' has no registered credentials")]
    NoCredentials(String),

    /// No outstanding challenge: begin was never called, the challenge
    /// expired, or an earlier finish already consumed it.
    #[error("no pending {kind} challenge for '{username}'")]
    NoPendingChallenge {
        username: String,
        kind: CeremonyKind,
    },

    #[error("credential '{credential_id}' is not registered for '{username}'")]
    CredentialNotFound {
        username: String,
        credential_id: String,
    },

    /// The asserted signature counter did not advance past the stored
    /// value. Strong signal of a cloned authenticator.
    #[error(
        "signature counter regression on credential '{credential_id}': stored {stored}, asserted {asserted}"
    )]
    CounterRegression {
        credential_id: String,
        stored: u32,
        asserted: u32,
    },

    #[error("verification failed: {0}")]
    Verification(#[from] VerifierError),

    #[error("credential store failure: {0}")]
    Store(#[from] StoreError),
}
