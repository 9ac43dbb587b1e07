//! Protocol-shaped verifier without cryptography, for tests and local
//! development.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{credential_id_of, wire_transports, CeremonyVerifier, VerifierError};
use crate::policy::RpPolicy;
use crate::types::{AssertionResult, Credential, DeviceType, RegisteredCredential};

// Authenticator-data layout: 32-byte RP-ID hash, 1 flag byte, 4-byte
// big-endian signature counter.
const FLAGS_OFFSET: usize = 32;
const COUNTER_OFFSET: usize = 33;
const MIN_AUTH_DATA_LEN: usize = 37;
/// Backup-eligibility (BE) flag bit.
const FLAG_BACKUP_ELIGIBLE: u8 = 0x08;
/// Backup-state (BS) flag bit.
const FLAG_BACKED_UP: u8 = 0x10;

/// Verifier that enforces the ceremony protocol but accepts any
/// signature.
///
/// It issues wire-shaped options with a fresh random challenge, and at
/// finish time checks the client-data type tag, challenge binding and
/// origin membership. Key material and signature counters are read from
/// the authenticator-data layout of the supplied response.
///
/// WARNING: never use outside tests and local development.
pub struct StubVerifier {
    policy: RpPolicy,
}

/// Pending registration issued by the stub.
pub struct StubRegistration {
    challenge: String,
}

/// Pending authentication issued by the stub.
pub struct StubAuthentication {
    challenge: String,
    allowed: Vec<String>,
}

impl StubVerifier {
    pub fn new(policy: RpPolicy) -> Self {
        Self { policy }
    }

    /// 16 random bytes, base64url. Matches the challenge entropy a real
    /// verifier produces.
    fn fresh_challenge() -> String {
        URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
    }

    /// Validate the clientDataJSON envelope common to both ceremonies:
    /// type tag, challenge binding, origin membership.
    fn check_client_data(
        &self,
        response: &Value,
        expected_type: &str,
        expected_challenge: &str,
    ) -> Result<(), VerifierError> {
        let raw = response
            .pointer("/response/clientDataJSON")
            .and_then(Value::as_str)
            .ok_or_else(|| VerifierError::MalformedResponse("missing clientDataJSON".into()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|e| VerifierError::MalformedResponse(format!("clientDataJSON: {e}")))?;
        let client_data: Value = serde_json::from_slice(&bytes)
            .map_err(|e| VerifierError::MalformedResponse(format!("clientDataJSON: {e}")))?;

        if client_data["type"].as_str() != Some(expected_type) {
            return Err(VerifierError::Rejected(format!(
                "unexpected client data type, wanted '{expected_type}'"
            )));
        }
        if client_data["challenge"].as_str() != Some(expected_challenge) {
            return Err(VerifierError::ChallengeMismatch);
        }
        let origin = client_data["origin"].as_str().unwrap_or_default();
        if !self.policy.accepts_origin(origin) {
            return Err(VerifierError::OriginNotAllowed(origin.to_owned()));
        }
        Ok(())
    }

    fn descriptor_list(credentials: &[Credential]) -> Vec<Value> {
        credentials
            .iter()
            .map(|c| {
                json!({
                    "type": "public-key",
                    "id": c.id,
                    "transports": c.transports,
                })
            })
            .collect()
    }
}

fn decoded_field(response: &Value, field: &str) -> Result<Vec<u8>, VerifierError> {
    let raw = response
        .pointer(&format!("/response/{field}"))
        .and_then(Value::as_str)
        .ok_or_else(|| VerifierError::MalformedResponse(format!("missing {field}")))?;
    URL_SAFE_NO_PAD
        .decode(raw)
        .map_err(|e| VerifierError::MalformedResponse(format!("{field}: {e}")))
}

fn parse_sign_count(data: &[u8]) -> u32 {
    if data.len() >= MIN_AUTH_DATA_LEN {
        u32::from_be_bytes([
            data[COUNTER_OFFSET],
            data[COUNTER_OFFSET + 1],
            data[COUNTER_OFFSET + 2],
            data[COUNTER_OFFSET + 3],
        ])
    } else {
        0
    }
}

fn parse_flags(data: &[u8]) -> u8 {
    data.get(FLAGS_OFFSET).copied().unwrap_or(0)
}

impl CeremonyVerifier for StubVerifier {
    type RegistrationState = StubRegistration;
    type AuthenticationState = StubAuthentication;

    fn begin_registration(
        &self,
        username: &str,
        display_name: &str,
        user_handle: Uuid,
        exclude: &[Credential],
    ) -> Result<(Value, Self::RegistrationState), VerifierError> {
        let challenge = Self::fresh_challenge();
        let options = json!({
            "publicKey": {
                "rp": {
                    "id": self.policy.rp_id(),
                    "name": self.policy.rp_name(),
                },
                "user": {
                    "id": URL_SAFE_NO_PAD.encode(user_handle.as_bytes()),
                    "name": username,
                    "displayName": display_name,
                },
                "challenge": challenge,
                "pubKeyCredParams": [
                    { "type": "public-key", "alg": -7 },
                    { "type": "public-key", "alg": -257 },
                ],
                "timeout": 60000,
                "excludeCredentials": Self::descriptor_list(exclude),
                "authenticatorSelection": {
                    "residentKey": "preferred",
                    "userVerification": self.policy.user_verification().as_str(),
                },
                "attestation": "none",
            }
        });
        Ok((options, StubRegistration { challenge }))
    }

    fn verify_registration(
        &self,
        response: &Value,
        state: &Self::RegistrationState,
    ) -> Result<RegisteredCredential, VerifierError> {
        self.check_client_data(response, "webauthn.create", &state.challenge)?;

        let attestation = decoded_field(response, "attestationObject")?;
        let flags = parse_flags(&attestation);
        let sign_count = parse_sign_count(&attestation);

        Ok(RegisteredCredential {
            id: credential_id_of(response)?,
            sign_count,
            transports: wire_transports(response),
            device_type: if flags & FLAG_BACKUP_ELIGIBLE != 0 {
                DeviceType::MultiDevice
            } else {
                DeviceType::SingleDevice
            },
            backed_up: flags & FLAG_BACKED_UP != 0,
            public_key: attestation,
        })
    }

    fn begin_authentication(
        &self,
        allow: &[Credential],
    ) -> Result<(Value, Self::AuthenticationState), VerifierError> {
        if allow.is_empty() {
            return Err(VerifierError::Rejected("empty allow list".into()));
        }

        let challenge = Self::fresh_challenge();
        let options = json!({
            "publicKey": {
                "challenge": challenge,
                "timeout": 60000,
                "rpId": self.policy.rp_id(),
                "allowCredentials": Self::descriptor_list(allow),
                "userVerification": self.policy.user_verification().as_str(),
            }
        });
        let allowed = allow.iter().map(|c| c.id.clone()).collect();
        Ok((options, StubAuthentication { challenge, allowed }))
    }

    fn verify_authentication(
        &self,
        response: &Value,
        state: &Self::AuthenticationState,
    ) -> Result<AssertionResult, VerifierError> {
        self.check_client_data(response, "webauthn.get", &state.challenge)?;

        let credential_id = credential_id_of(response)?;
        if !state.allowed.contains(&credential_id) {
            return Err(VerifierError::Rejected(format!(
                "credential '{credential_id}' is not in the allow list"
            )));
        }

        let auth_data = decoded_field(response, "authenticatorData")?;
        let flags = parse_flags(&auth_data);

        Ok(AssertionResult {
            credential_id,
            sign_count: parse_sign_count(&auth_data),
            backed_up: flags & FLAG_BACKED_UP != 0,
        })
    }
}
