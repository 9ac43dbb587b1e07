//! Production verifier backed by webauthn-rs.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;
use uuid::Uuid;
use webauthn_rs::prelude::{
    CredentialID, Passkey, PasskeyAuthentication, PasskeyRegistration, Webauthn, WebauthnBuilder,
};
use webauthn_rs_proto::{PublicKeyCredential, RegisterPublicKeyCredential};

use super::{wire_transports, CeremonyVerifier, VerifierError};
use crate::policy::RpPolicy;
use crate::types::{AssertionResult, Credential, DeviceType, RegisteredCredential};

/// `CeremonyVerifier` delegating all cryptographic checks to webauthn-rs.
///
/// Challenge generation, client-data validation, origin and RP-ID
/// binding, signature verification and the counter check all happen
/// inside the library; this type only translates between the store's
/// credential records and the library's passkey representation.
pub struct WebauthnVerifier {
    webauthn: Webauthn,
}

impl WebauthnVerifier {
    /// Build a verifier from the relying-party policy. Every configured
    /// origin is registered as allowed; subdomain matching is disabled so
    /// origin comparison stays exact.
    pub fn new(policy: &RpPolicy) -> Result<Self, VerifierError> {
        let mut origins = policy.origins().iter();
        let primary = origins
            .next()
            .ok_or_else(|| VerifierError::Configuration("no accepted origins".into()))?;

        let mut builder = WebauthnBuilder::new(policy.rp_id(), primary)
            .map_err(|e| VerifierError::Configuration(format!("{e:?}")))?
            .rp_name(policy.rp_name())
            .allow_subdomains(false);
        for origin in origins {
            builder = builder.append_allowed_origin(origin);
        }

        let webauthn = builder
            .build()
            .map_err(|e| VerifierError::Configuration(format!("{e:?}")))?;
        Ok(Self { webauthn })
    }
}

fn base64_url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn decode_credential_id(id: &str) -> Result<Vec<u8>, VerifierError> {
    URL_SAFE_NO_PAD
        .decode(id)
        .map_err(|e| VerifierError::Serialization(format!("stored credential id: {e}")))
}

/// Stored key material back into the library's passkey form.
fn passkey_of(credential: &Credential) -> Result<Passkey, VerifierError> {
    serde_json::from_slice(&credential.public_key)
        .map_err(|e| VerifierError::Serialization(format!("stored passkey: {e}")))
}

impl CeremonyVerifier for WebauthnVerifier {
    type RegistrationState = PasskeyRegistration;
    type AuthenticationState = PasskeyAuthentication;

    fn begin_registration(
        &self,
        username: &str,
        display_name: &str,
        user_handle: Uuid,
        exclude: &[Credential],
    ) -> Result<(Value, Self::RegistrationState), VerifierError> {
        let exclude_ids = if exclude.is_empty() {
            None
        } else {
            let ids = exclude
                .iter()
                .map(|c| decode_credential_id(&c.id).map(CredentialID::from))
                .collect::<Result<Vec<_>, _>>()?;
            Some(ids)
        };

        let (ccr, state) = self
            .webauthn
            .start_passkey_registration(user_handle, username, display_name, exclude_ids)
            .map_err(|e| VerifierError::Rejected(e.to_string()))?;

        let options =
            serde_json::to_value(&ccr).map_err(|e| VerifierError::Serialization(e.to_string()))?;
        Ok((options, state))
    }

    fn verify_registration(
        &self,
        response: &Value,
        state: &Self::RegistrationState,
    ) -> Result<RegisteredCredential, VerifierError> {
        let reg: RegisterPublicKeyCredential = serde_json::from_value(response.clone())
            .map_err(|e| VerifierError::MalformedResponse(e.to_string()))?;

        let passkey = self
            .webauthn
            .finish_passkey_registration(&reg, state)
            .map_err(|e| VerifierError::Rejected(e.to_string()))?;

        let public_key = serde_json::to_vec(&passkey)
            .map_err(|e| VerifierError::Serialization(e.to_string()))?;

        Ok(RegisteredCredential {
            id: base64_url_encode(passkey.cred_id()),
            public_key,
            // Fresh registrations start at counter zero.
            sign_count: 0,
            transports: wire_transports(response),
            // The passkey API does not expose the attestation backup
            // flags; assume a device-bound credential.
            device_type: DeviceType::SingleDevice,
            backed_up: false,
        })
    }

    fn begin_authentication(
        &self,
        allow: &[Credential],
    ) -> Result<(Value, Self::AuthenticationState), VerifierError> {
        let passkeys = allow
            .iter()
            .map(passkey_of)
            .collect::<Result<Vec<_>, _>>()?;

        let (rcr, state) = self
            .webauthn
            .start_passkey_authentication(&passkeys)
            .map_err(|e| VerifierError::Rejected(e.to_string()))?;

        let options =
            serde_json::to_value(&rcr).map_err(|e| VerifierError::Serialization(e.to_string()))?;
        Ok((options, state))
    }

    fn verify_authentication(
        &self,
        response: &Value,
        state: &Self::AuthenticationState,
    ) -> Result<AssertionResult, VerifierError> {
        let assertion: PublicKeyCredential = serde_json::from_value(response.clone())
            .map_err(|e| VerifierError::MalformedResponse(e.to_string()))?;

        let result = self
            .webauthn
            .finish_passkey_authentication(&assertion, state)
            .map_err(|e| VerifierError::Rejected(e.to_string()))?;

        Ok(AssertionResult {
            credential_id: base64_url_encode(result.cred_id()),
            sign_count: result.counter(),
            backed_up: result.backup_state(),
        })
    }
}
