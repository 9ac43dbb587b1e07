//! Passgate Server - passwordless authentication relying party
//!
//! Exposes the passkey ceremonies via HTTP endpoints:
//! - POST /register/options, /register/verify - credential registration
//! - POST /login/options, /login/verify - credential authentication

use std::sync::Arc;

use passgate_core::{MemoryCredentialStore, PasskeyRelyingParty, WebauthnVerifier};
use passgate_server::{create_router, Config, SharedRelyingParty};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passgate_server=debug,passgate_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "configuration loaded");

    let policy = match config.rp_policy() {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!(error = %e, "invalid relying-party configuration");
            std::process::exit(1);
        }
    };

    let verifier = match WebauthnVerifier::new(&policy) {
        Ok(verifier) => verifier,
        Err(e) => {
            tracing::error!(error = %e, "failed to build webauthn verifier");
            std::process::exit(1);
        }
    };

    let rp: SharedRelyingParty = Arc::new(
        PasskeyRelyingParty::new(policy, Arc::new(MemoryCredentialStore::new()), verifier)
            .with_challenge_ttl(std::time::Duration::from_secs(config.challenge_ttl_secs)),
    );

    let app = create_router(rp, &config);
    let addr = config.socket_addr();
    tracing::info!(%addr, "starting passgate server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
