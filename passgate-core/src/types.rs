//! Core data model: user accounts and registered credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a credential is bound to a single authenticator or synced
/// across devices (a "multi-device" passkey).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    SingleDevice,
    MultiDevice,
}

/// The two ceremony families a relying party runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

impl std::fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registration => f.write_str("registration"),
            Self::Authentication => f.write_str("authentication"),
        }
    }
}

/// A registered public-key credential.
///
/// `sign_count` is the only field that changes after creation; it is
/// overwritten on every successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Credential id as sent on the wire (base64url, no padding).
    pub id: String,
    /// Verifier-defined key material blob. The store never interprets it.
    pub public_key: Vec<u8>,
    /// Signature counter from the most recent successful assertion.
    pub sign_count: u32,
    /// Transport hints reported by the client at registration time.
    pub transports: Vec<String>,
    pub device_type: DeviceType,
    pub backed_up: bool,
    /// When the credential was committed to the store.
    pub registered_at: DateTime<Utc>,
}

/// A user account and its registered credentials, in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub credentials: Vec<Credential>,
}

impl UserAccount {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            credentials: Vec::new(),
        }
    }
}

/// Credential material extracted from a verified attestation response.
#[derive(Debug, Clone)]
pub struct RegisteredCredential {
    pub id: String,
    pub public_key: Vec<u8>,
    pub sign_count: u32,
    pub transports: Vec<String>,
    pub device_type: DeviceType,
    pub backed_up: bool,
}

impl RegisteredCredential {
    /// Materialize the stored record, stamping the commit time.
    pub fn into_credential(self) -> Credential {
        Credential {
            id: self.id,
            public_key: self.public_key,
            sign_count: self.sign_count,
            transports: self.transports,
            device_type: self.device_type,
            backed_up: self.backed_up,
            registered_at: Utc::now(),
        }
    }
}

/// Outcome of a verified assertion response.
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Wire id of the credential that signed the assertion.
    pub credential_id: String,
    /// Counter value carried in the signed authenticator data.
    pub sign_count: u32,
    /// Current backup state reported by the authenticator.
    pub backed_up: bool,
}
