//! # LaunchMasters Auth Runtime
//!
//! Composition root and scripted walkthrough for the authentication core.
//!
//! ## Startup Sequence
//!
//! 1. Initialize structured logging (env-filter controlled)
//! 2. Load configuration (defaults + `LM_*` environment overrides)
//! 3. Wire in-memory providers into a session controller and route guard
//! 4. Start the controller (initial session query + notification listener)
//! 5. Walk through the login lifecycle, logging each route decision
//!
//! The walkthrough doubles as a living example of the intended wiring:
//! construct, `start()`, observe through `subscribe()`, `shutdown()` on the
//! way out.

pub mod config;
pub mod wiring;

use std::time::Duration;

use anyhow::{Context, Result};
use shared_types::{AuthPhase, AuthState, ProfileUpdate};
use tokio::time::timeout;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;
use crate::wiring::AuthRuntime;

/// Wait for the next committed non-transitional state.
async fn settled(runtime: &AuthRuntime) -> Result<AuthState> {
    let mut rx = runtime.controller.subscribe();
    let state = timeout(
        Duration::from_secs(2),
        rx.wait_for(|state| !state.phase.is_transitional()),
    )
    .await
    .context("auth state did not settle")?
    .context("controller stopped")?
    .clone();
    Ok(state)
}

fn log_decisions(runtime: &AuthRuntime, paths: &[&str]) {
    for &path in paths {
        info!(path, decision = ?runtime.decide(path), "Route decision");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config = RuntimeConfig::from_env();
    info!(
        login = %config.routes.login_path,
        landing = %config.routes.landing_path,
        "Starting LaunchMasters auth runtime"
    );

    let runtime = AuthRuntime::build(&config);
    runtime.controller.start();

    // Cold start: no session yet.
    let state = settled(&runtime).await?;
    info!(phase = ?state.phase, "Initial session resolved");
    log_decisions(&runtime, &["/", "/dashboard", "/login"]);

    // Sign in with the seeded demo account.
    runtime
        .controller
        .sign_in(&config.demo.email, &config.demo.password)
        .await
        .map_err(|e| anyhow::anyhow!("demo sign-in failed: {e}"))?;
    info!(phase = ?runtime.controller.current().phase, "Sign-in accepted");

    let state = settled(&runtime).await?;
    info!(phase = ?state.phase, "Session reconciled");

    // Provision the profile row (the application's onboarding step) and
    // write through a display name.
    if state.phase == AuthPhase::Authenticated {
        let session = state.session.clone().context("authenticated without session")?;
        runtime.store.provision(session.user_id, &session.email);
        let profile = runtime
            .controller
            .update_profile(ProfileUpdate {
                display_name: Some(config.demo.display_name.clone()),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow::anyhow!("profile update failed: {e}"))?;
        info!(display_name = ?profile.display_name, "Profile provisioned");
    }

    let snapshot = serde_json::to_string_pretty(&runtime.controller.current())?;
    info!(state = %snapshot, "Committed auth state");
    log_decisions(&runtime, &["/", "/login", "/deadlines", "/colleges/42"]);

    // Sign out and confirm the guard closes.
    runtime
        .controller
        .sign_out()
        .await
        .map_err(|e| anyhow::anyhow!("sign-out failed: {e}"))?;
    info!(phase = ?runtime.controller.current().phase, "Signed out");
    log_decisions(&runtime, &["/dashboard"]);

    runtime.controller.shutdown();
    Ok(())
}
