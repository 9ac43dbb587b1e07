//! Introspection endpoint over the in-memory user table.
//!
//! Mounted only when `Config::debug_routes` is set; never expose it in a
//! production deployment.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use passgate_core::{Credential, DeviceType, RelyingParty, UserAccount};

use crate::error::ApiError;
use crate::state::SharedRelyingParty;

/// Stored credential, minus the key material blob.
#[derive(Serialize, ToSchema)]
pub struct CredentialSummary {
    pub id: String,
    pub sign_count: u32,
    pub transports: Vec<String>,
    #[schema(value_type = String)]
    pub device_type: DeviceType,
    pub backed_up: bool,
    #[schema(value_type = String)]
    pub registered_at: DateTime<Utc>,
    /// Size of the stored key material
    pub public_key_bytes: usize,
}

impl From<&Credential> for CredentialSummary {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            sign_count: credential.sign_count,
            transports: credential.transports.clone(),
            device_type: credential.device_type,
            backed_up: credential.backed_up,
            registered_at: credential.registered_at,
            public_key_bytes: credential.public_key.len(),
        }
    }
}

/// A user account and its credentials.
#[derive(Serialize, ToSchema)]
pub struct UserSummary {
    pub username: String,
    pub credentials: Vec<CredentialSummary>,
}

impl From<&UserAccount> for UserSummary {
    fn from(account: &UserAccount) -> Self {
        Self {
            username: account.username.clone(),
            credentials: account.credentials.iter().map(CredentialSummary::from).collect(),
        }
    }
}

/// Full user-table dump.
#[derive(Serialize, ToSchema)]
pub struct DebugUsersResponse {
    pub users: Vec<UserSummary>,
}

/// GET /debug/users - dump the in-memory user table.
#[utoipa::path(
    get,
    path = "/debug/users",
    tag = "Debug",
    responses((status = 200, description = "All registered accounts", body = DebugUsersResponse))
)]
pub async fn debug_users(
    State(rp): State<SharedRelyingParty>,
) -> Result<Json<DebugUsersResponse>, ApiError> {
    let users = rp.snapshot().await?;
    Ok(Json(DebugUsersResponse {
        users: users.iter().map(UserSummary::from).collect(),
    }))
}
