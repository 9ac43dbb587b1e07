//! In-memory credential store.
//!
//! Process-lifetime storage backed by a concurrent map. Accounts are
//! never deleted. Suitable for demos and tests; anything that must
//! survive a restart implements [`CredentialStore`] over a real database.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CredentialStore, StoreError};
use crate::types::{Credential, UserAccount};

/// Volatile `CredentialStore` keyed by username.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: DashMap<String, UserAccount>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_or_create(&self, username: &str) -> Result<UserAccount, StoreError> {
        let entry = self
            .users
            .entry(username.to_owned())
            .or_insert_with(|| UserAccount::new(username));
        Ok(entry.value().clone())
    }

    async fn get(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }

    async fn add_credential(
        &self,
        username: &str,
        credential: Credential,
    ) -> Result<(), StoreError> {
        match self.users.get_mut(username) {
            Some(mut entry) => {
                entry.credentials.push(credential);
                Ok(())
            }
            None => Err(StoreError::UserNotFound(username.to_owned())),
        }
    }

    async fn find_credential(
        &self,
        username: &str,
        credential_id: &str,
    ) -> Result<Option<Credential>, StoreError> {
        Ok(self.users.get(username).and_then(|entry| {
            entry
                .credentials
                .iter()
                .find(|c| c.id == credential_id)
                .cloned()
        }))
    }

    async fn update_sign_counter(
        &self,
        username: &str,
        credential_id: &str,
        new_counter: u32,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_owned()))?;
        let credential = entry
            .credentials
            .iter_mut()
            .find(|c| c.id == credential_id)
            .ok_or_else(|| StoreError::CredentialNotFound {
                username: username.to_owned(),
                credential_id: credential_id.to_owned(),
            })?;
        credential.sign_count = new_counter;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self.users.iter().map(|entry| entry.value().clone()).collect())
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("users", &self.users.len())
            .finish()
    }
}
