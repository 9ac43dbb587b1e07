//! Registration and login ceremony endpoints.
//!
//! Options and credential payloads are the WebAuthn wire types; they are
//! passed between the client and the core verbatim.

use axum::{extract::State, Json};
use passgate_core::RelyingParty;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::SharedRelyingParty;

/// Request starting either ceremony.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OptionsRequest {
    /// Unique account identity
    #[schema(example = "alice")]
    pub username: String,
}

/// Request finishing either ceremony.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// Unique account identity
    #[schema(example = "alice")]
    pub username: String,
    /// WebAuthn attestation or assertion response from the browser,
    /// passed through verbatim
    #[schema(value_type = Object)]
    pub credential: Value,
}

/// Outcome of a finish call.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedResponse {
    pub verified: bool,
}

/// Deserialize a request body, mapping failures to a 400 with a message.
fn parse_request<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}

/// Reject empty and whitespace-only usernames before touching the store.
fn require_username(username: &str) -> Result<&str, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    Ok(username)
}

/// POST /register/options
///
/// Issue credential creation options for the username, creating the
/// account on first contact.
#[utoipa::path(
    post,
    path = "/register/options",
    tag = "Registration",
    request_body = OptionsRequest,
    responses(
        (status = 200, description = "WebAuthn PublicKeyCredentialCreationOptions for navigator.credentials.create"),
        (status = 400, description = "Missing or invalid username")
    )
)]
pub async fn register_options(
    State(rp): State<SharedRelyingParty>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: OptionsRequest = parse_request(body)?;
    let username = require_username(&req.username)?;

    let options = rp.begin_registration(username).await?;
    Ok(Json(options))
}

/// POST /register/verify
///
/// Verify the attestation response and commit the new credential.
#[utoipa::path(
    post,
    path = "/register/verify",
    tag = "Registration",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Registration verified", body = VerifiedResponse),
        (status = 400, description = "Unknown user, no pending challenge, or verification failure")
    )
)]
pub async fn register_verify(
    State(rp): State<SharedRelyingParty>,
    Json(body): Json<Value>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let req: VerifyRequest = parse_request(body)?;
    let username = require_username(&req.username)?;

    rp.finish_registration(username, &req.credential).await?;
    Ok(Json(VerifiedResponse { verified: true }))
}

/// POST /login/options
///
/// Issue assertion options scoped to the user's registered credentials.
#[utoipa::path(
    post,
    path = "/login/options",
    tag = "Authentication",
    request_body = OptionsRequest,
    responses(
        (status = 200, description = "WebAuthn PublicKeyCredentialRequestOptions for navigator.credentials.get"),
        (status = 400, description = "Missing username, unknown user, or no registered credentials")
    )
)]
pub async fn login_options(
    State(rp): State<SharedRelyingParty>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let req: OptionsRequest = parse_request(body)?;
    let username = require_username(&req.username)?;

    let options = rp.begin_authentication(username).await?;
    Ok(Json(options))
}

/// POST /login/verify
///
/// Verify the assertion response and advance the signature counter.
#[utoipa::path(
    post,
    path = "/login/verify",
    tag = "Authentication",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Authentication verified", body = VerifiedResponse),
        (status = 400, description = "Unknown user, credential, challenge, or verification failure")
    )
)]
pub async fn login_verify(
    State(rp): State<SharedRelyingParty>,
    Json(body): Json<Value>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let req: VerifyRequest = parse_request(body)?;
    let username = require_username(&req.username)?;

    rp.finish_authentication(username, &req.credential).await?;
    Ok(Json(VerifiedResponse { verified: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_are_trimmed_and_required() {
        assert_eq!(require_username("  alice ").unwrap(), "alice");
        assert!(require_username("").is_err());
        assert!(require_username("   ").is_err());
    }

    #[test]
    fn parse_request_surfaces_missing_fields() {
        let err = parse_request::<OptionsRequest>(serde_json::json!({})).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
