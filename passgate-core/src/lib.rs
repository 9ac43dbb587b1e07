//! Passgate Core - WebAuthn relying-party ceremonies over a pluggable
//! credential store.
//!
//! The crate implements the two passkey ceremonies (registration and
//! authentication) as a state machine over three collaborators:
//!
//! - [`CredentialStore`]: durable mapping from username to account and
//!   registered credentials; [`MemoryCredentialStore`] is the built-in
//!   process-lifetime implementation.
//! - [`ChallengeCache`]: at most one outstanding challenge per username
//!   and ceremony kind, consumed exactly once.
//! - [`CeremonyVerifier`]: the delegated cryptographic capability that
//!   issues options and verifies signed responses. [`WebauthnVerifier`]
//!   is the production implementation; [`StubVerifier`] exercises the
//!   protocol without cryptography for tests.
//!
//! Options and client responses cross the API as raw JSON in the
//! WebAuthn wire shape; the core passes them through without reshaping.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use passgate_core::{
//!     MemoryCredentialStore, PasskeyRelyingParty, RpPolicy, WebauthnVerifier,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RpPolicy::parse(
//!     "localhost",
//!     "Passgate",
//!     &["http://localhost:8080".to_string()],
//! )?;
//! let verifier = WebauthnVerifier::new(&policy)?;
//! let rp = PasskeyRelyingParty::new(
//!     policy,
//!     Arc::new(MemoryCredentialStore::new()),
//!     verifier,
//! );
//!
//! let options = rp.begin_registration("alice").await?;
//! // hand `options` to navigator.credentials.create(), post the result
//! // back to finish_registration
//! # Ok(())
//! # }
//! ```

mod authentication;
pub mod challenge;
pub mod error;
pub mod policy;
mod registration;
mod rp;
pub mod store;
pub mod types;
pub mod verifier;

pub use challenge::{ChallengeCache, ChallengeStats};
pub use error::CeremonyError;
pub use policy::{PolicyError, RpPolicy, UserVerification};
pub use rp::{PasskeyRelyingParty, RelyingParty};
pub use store::{CredentialStore, MemoryCredentialStore, StoreError, StoreStats};
pub use types::{
    AssertionResult, CeremonyKind, Credential, DeviceType, RegisteredCredential, UserAccount,
};
pub use verifier::{CeremonyVerifier, StubVerifier, VerifierError, WebauthnVerifier};
