//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 specification for the Passgate API.

use utoipa::OpenApi;

use crate::handlers::{
    CredentialSummary, DebugUsersResponse, HealthResponse, OptionsRequest, ReadyResponse,
    UserSummary, VerifiedResponse, VerifyRequest,
};

/// Passgate API - OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Passgate",
        version = "0.1.0",
        description = r#"
## Passwordless authentication relying party

Passgate implements the WebAuthn/FIDO2 relying-party ceremonies:

1. **Register** a passkey: `POST /register/options`, sign the challenge
   with `navigator.credentials.create()`, then `POST /register/verify`.
2. **Log in** with a passkey: `POST /login/options`, sign with
   `navigator.credentials.get()`, then `POST /login/verify`.

Challenges are single-use: each finish call consumes the pending
challenge whether or not verification succeeds, and signature counters
must strictly advance to defeat cloned authenticators.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    paths(
        crate::handlers::ceremonies::register_options,
        crate::handlers::ceremonies::register_verify,
        crate::handlers::ceremonies::login_options,
        crate::handlers::ceremonies::login_verify,
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::debug::debug_users,
    ),
    components(schemas(
        OptionsRequest,
        VerifyRequest,
        VerifiedResponse,
        HealthResponse,
        ReadyResponse,
        DebugUsersResponse,
        UserSummary,
        CredentialSummary,
    )),
    tags(
        (name = "Registration", description = "Passkey registration ceremony"),
        (name = "Authentication", description = "Passkey authentication ceremony"),
        (name = "Health", description = "Service health and readiness"),
        (name = "Debug", description = "In-memory store introspection (non-production)"),
    )
)]
pub struct ApiDoc;
