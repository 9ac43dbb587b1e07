//! Shared application state.

use std::sync::Arc;

use passgate_core::RelyingParty;

/// Relying-party service handed to every request handler. The concrete
/// verifier is erased so the same router serves the production verifier
/// and the stub used by integration tests.
pub type SharedRelyingParty = Arc<dyn RelyingParty>;
