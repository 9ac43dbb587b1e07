//! Credential storage contract.
//!
//! `CredentialStore` is the durable side of the relying party: usernames
//! mapped to accounts and their registered credentials. The in-memory
//! implementation lives for the process lifetime; a persistent backend
//! satisfies the same contract with a unique index on username.

mod memory;

pub use memory::MemoryCredentialStore;

use async_trait::async_trait;

use crate::types::{Credential, UserAccount};

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("credential '{credential_id}' not found for user '{username}'")]
    CredentialNotFound {
        username: String,
        credential_id: String,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Aggregate counts for health and introspection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    pub users: usize,
    pub credentials: usize,
}

/// Durable mapping from username to account and credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Return the account for `username`, creating an empty one if absent.
    async fn get_or_create(&self, username: &str) -> Result<UserAccount, StoreError>;

    /// Look up an account.
    async fn get(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Append a credential to an existing account.
    async fn add_credential(
        &self,
        username: &str,
        credential: Credential,
    ) -> Result<(), StoreError>;

    /// Look up a single credential by its wire id.
    async fn find_credential(
        &self,
        username: &str,
        credential_id: &str,
    ) -> Result<Option<Credential>, StoreError>;

    /// Overwrite the signature counter of a stored credential.
    async fn update_sign_counter(
        &self,
        username: &str,
        credential_id: &str,
        new_counter: u32,
    ) -> Result<(), StoreError>;

    /// Full dump of the user table (introspection only).
    async fn snapshot(&self) -> Result<Vec<UserAccount>, StoreError>;

    /// Aggregate counts; derived from `snapshot` unless a backend can do
    /// better.
    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let users = self.snapshot().await?;
        Ok(StoreStats {
            users: users.len(),
            credentials: users.iter().map(|u| u.credentials.len()).sum(),
        })
    }
}
