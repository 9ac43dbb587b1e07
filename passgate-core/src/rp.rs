//! The relying-party service: shared state for both ceremonies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::challenge::{ChallengeCache, ChallengeStats};
use crate::error::CeremonyError;
use crate::policy::RpPolicy;
use crate::store::{CredentialStore, StoreError, StoreStats};
use crate::types::UserAccount;
use crate::verifier::CeremonyVerifier;

/// Orchestrates the registration and authentication ceremonies over a
/// credential store, a pending-challenge cache and a verification
/// capability.
///
/// The ceremony methods themselves live in the `registration` and
/// `authentication` modules.
pub struct PasskeyRelyingParty<V: CeremonyVerifier> {
    pub(crate) policy: RpPolicy,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) challenges: ChallengeCache<V::RegistrationState, V::AuthenticationState>,
    pub(crate) verifier: V,
}

impl<V: CeremonyVerifier> PasskeyRelyingParty<V> {
    pub fn new(policy: RpPolicy, store: Arc<dyn CredentialStore>, verifier: V) -> Self {
        Self {
            policy,
            store,
            challenges: ChallengeCache::new(),
            verifier,
        }
    }

    /// Override the pending-challenge lifetime.
    pub fn with_challenge_ttl(mut self, ttl: Duration) -> Self {
        self.challenges = ChallengeCache::with_ttl(ttl);
        self
    }

    pub fn policy(&self) -> &RpPolicy {
        &self.policy
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn challenge_stats(&self) -> ChallengeStats {
        self.challenges.stats()
    }

    /// Stable per-registration user handle, derived from the username
    /// bytes. Deterministic, and therefore not a secret identifier.
    pub(crate) fn user_handle(username: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, username.as_bytes())
    }
}

/// Object-safe view of [`PasskeyRelyingParty`], erasing the verifier type
/// so HTTP handlers and tests can share one state shape.
#[async_trait]
pub trait RelyingParty: Send + Sync {
    async fn begin_registration(&self, username: &str) -> Result<Value, CeremonyError>;
    async fn finish_registration(
        &self,
        username: &str,
        response: &Value,
    ) -> Result<(), CeremonyError>;
    async fn begin_authentication(&self, username: &str) -> Result<Value, CeremonyError>;
    async fn finish_authentication(
        &self,
        username: &str,
        response: &Value,
    ) -> Result<(), CeremonyError>;

    /// Full dump of the user table (introspection only).
    async fn snapshot(&self) -> Result<Vec<UserAccount>, StoreError>;
    async fn store_stats(&self) -> Result<StoreStats, StoreError>;
    fn challenge_stats(&self) -> ChallengeStats;
}

#[async_trait]
impl<V: CeremonyVerifier> RelyingParty for PasskeyRelyingParty<V> {
    async fn begin_registration(&self, username: &str) -> Result<Value, CeremonyError> {
        PasskeyRelyingParty::begin_registration(self, username).await
    }

    async fn finish_registration(
        &self,
        username: &str,
        response: &Value,
    ) -> Result<(), CeremonyError> {
        PasskeyRelyingParty::finish_registration(self, username, response).await
    }

    async fn begin_authentication(&self, username: &str) -> Result<Value, CeremonyError> {
        PasskeyRelyingParty::begin_authentication(self, username).await
    }

    async fn finish_authentication(
        &self,
        username: &str,
        response: &Value,
    ) -> Result<(), CeremonyError> {
        PasskeyRelyingParty::finish_authentication(self, username, response).await
    }

    async fn snapshot(&self) -> Result<Vec<UserAccount>, StoreError> {
        self.store.snapshot().await
    }

    async fn store_stats(&self) -> Result<StoreStats, StoreError> {
        self.store.stats().await
    }

    fn challenge_stats(&self) -> ChallengeStats {
        self.challenges.stats()
    }
}
