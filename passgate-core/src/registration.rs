//! Registration ceremony: issue creation options, verify the attestation
//! response, commit the new credential.

use serde_json::Value;

use crate::error::CeremonyError;
use crate::rp::PasskeyRelyingParty;
use crate::types::CeremonyKind;
use crate::verifier::CeremonyVerifier;

impl<V: CeremonyVerifier> PasskeyRelyingParty<V> {
    /// Issue registration options for `username`, creating the account on
    /// first contact. Already-registered credentials go on the exclusion
    /// list. Any prior unconsumed registration challenge for the username
    /// is replaced and becomes permanently unusable.
    pub async fn begin_registration(&self, username: &str) -> Result<Value, CeremonyError> {
        let user = self.store.get_or_create(username).await?;

        let (options, state) = self.verifier.begin_registration(
            username,
            username,
            Self::user_handle(username),
            &user.credentials,
        )?;

        self.challenges.put_registration(username, state);
        tracing::debug!(
            username = %username,
            excluded = user.credentials.len(),
            "registration options issued"
        );
        Ok(options)
    }

    /// Verify an attestation response and commit the resulting credential.
    ///
    /// The pending challenge is consumed up front: whatever happens after
    /// this point, a retry sees `NoPendingChallenge`. The store is only
    /// touched after verification succeeds.
    pub async fn finish_registration(
        &self,
        username: &str,
        response: &Value,
    ) -> Result<(), CeremonyError> {
        let state = self.challenges.take_registration(username).ok_or_else(|| {
            CeremonyError::NoPendingChallenge {
                username: username.to_owned(),
                kind: CeremonyKind::Registration,
            }
        })?;

        if self.store.get(username).await?.is_none() {
            return Err(CeremonyError::UnknownUser(username.to_owned()));
        }

        let registered = self.verifier.verify_registration(response, &state)?;
        let credential_id = registered.id.clone();
        self.store
            .add_credential(username, registered.into_credential())
            .await?;

        tracing::info!(
            username = %username,
            credential_id = %credential_id,
            "credential registered"
        );
        Ok(())
    }
}
