//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod ceremonies;
pub mod debug;
pub mod health;

pub use ceremonies::{
    login_options, login_verify, register_options, register_verify, OptionsRequest,
    VerifiedResponse, VerifyRequest,
};
pub use debug::{debug_users, CredentialSummary, DebugUsersResponse, UserSummary};
pub use health::{health, ready, HealthResponse, ReadyResponse};
