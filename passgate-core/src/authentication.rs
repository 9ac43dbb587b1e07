//! Authentication ceremony: issue assertion options over the user's
//! credentials, verify the signed assertion, advance the counter.

use serde_json::Value;

use crate::error::CeremonyError;
use crate::rp::PasskeyRelyingParty;
use crate::types::CeremonyKind;
use crate::verifier::{CeremonyVerifier, VerifierError};

impl<V: CeremonyVerifier> PasskeyRelyingParty<V> {
    /// Issue authentication options scoped to the user's registered
    /// credentials. Fails for unknown users and users without passkeys;
    /// neither failure leaves a cached challenge behind.
    pub async fn begin_authentication(&self, username: &str) -> Result<Value, CeremonyError> {
        let user = self
            .store
            .get(username)
            .await?
            .ok_or_else(|| CeremonyError::UnknownUser(username.to_owned()))?;
        if user.credentials.is_empty() {
            return Err(CeremonyError::NoCredentials(username.to_owned()));
        }

        let (options, state) = self.verifier.begin_authentication(&user.credentials)?;
        self.challenges.put_authentication(username, state);
        tracing::debug!(
            username = %username,
            allowed = user.credentials.len(),
            "authentication options issued"
        );
        Ok(options)
    }

    /// Verify an assertion response and persist the advanced signature
    /// counter.
    ///
    /// The pending challenge is consumed up front, so a failed attempt
    /// cannot be retried against the same challenge. The counter check is
    /// the sole defense against cloned authenticators: an assertion that
    /// does not advance the stored counter is rejected without touching
    /// the store.
    pub async fn finish_authentication(
        &self,
        username: &str,
        response: &Value,
    ) -> Result<(), CeremonyError> {
        let state = self.challenges.take_authentication(username).ok_or_else(|| {
            CeremonyError::NoPendingChallenge {
                username: username.to_owned(),
                kind: CeremonyKind::Authentication,
            }
        })?;

        if self.store.get(username).await?.is_none() {
            return Err(CeremonyError::UnknownUser(username.to_owned()));
        }

        let credential_id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CeremonyError::Validation("assertion response carries no credential id".into())
            })?;

        let credential = self
            .store
            .find_credential(username, credential_id)
            .await?
            .ok_or_else(|| CeremonyError::CredentialNotFound {
                username: username.to_owned(),
                credential_id: credential_id.to_owned(),
            })?;

        let assertion = self.verifier.verify_authentication(response, &state)?;
        if assertion.credential_id != credential.id {
            return Err(CeremonyError::Verification(VerifierError::Rejected(
                "signed assertion names a different credential".into(),
            )));
        }

        if !counter_advanced(credential.sign_count, assertion.sign_count) {
            tracing::warn!(
                username = %username,
                credential_id = %credential.id,
                stored = credential.sign_count,
                asserted = assertion.sign_count,
                "signature counter did not advance; possible cloned authenticator"
            );
            return Err(CeremonyError::CounterRegression {
                credential_id: credential.id,
                stored: credential.sign_count,
                asserted: assertion.sign_count,
            });
        }

        self.store
            .update_sign_counter(username, credential_id, assertion.sign_count)
            .await?;
        tracing::info!(
            username = %username,
            credential_id = %credential_id,
            sign_count = assertion.sign_count,
            "authentication verified"
        );
        Ok(())
    }
}

/// Counters must strictly advance; authenticators without counters report
/// zero on both sides.
fn counter_advanced(stored: u32, asserted: u32) -> bool {
    asserted > stored || (stored == 0 && asserted == 0)
}
