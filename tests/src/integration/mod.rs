//! Cross-crate integration scenarios.

pub mod auth_flows;
pub mod route_gating;

#[cfg(test)]
pub(crate) mod fixtures {
    use lm_session::adapters::{InMemoryProfileStore, InMemorySessionSource};
    use lm_session::SessionController;
    use shared_types::AuthState;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::timeout;

    pub const EMAIL: &str = "student@example.com";
    pub const PASSWORD: &str = "secret-pass-1";

    pub struct AuthFixture {
        pub source: Arc<InMemorySessionSource>,
        pub store: Arc<InMemoryProfileStore>,
        pub controller: Arc<SessionController>,
    }

    /// Controller over fresh in-memory providers with one seeded account,
    /// started and settled out of `Initializing`.
    pub async fn started() -> AuthFixture {
        let fixture = stopped();
        fixture.controller.start();
        let mut rx = fixture.controller.subscribe();
        settled(&mut rx).await;
        fixture
    }

    /// Same fixture without starting the controller.
    pub fn stopped() -> AuthFixture {
        let source = Arc::new(InMemorySessionSource::new().with_account(EMAIL, PASSWORD));
        let store = Arc::new(InMemoryProfileStore::new());
        let controller = SessionController::new(source.clone(), store.clone());
        AuthFixture {
            source,
            store,
            controller,
        }
    }

    /// Wait (bounded) for the next committed non-transitional state.
    pub async fn settled(rx: &mut watch::Receiver<AuthState>) -> AuthState {
        timeout(
            Duration::from_secs(1),
            rx.wait_for(|state| !state.phase.is_transitional()),
        )
        .await
        .expect("state settled in time")
        .expect("controller alive")
        .clone()
    }

    /// Wait (bounded) for a specific committed phase.
    pub async fn wait_phase(
        rx: &mut watch::Receiver<AuthState>,
        phase: shared_types::AuthPhase,
    ) -> AuthState {
        timeout(
            Duration::from_secs(1),
            rx.wait_for(|state| state.phase == phase),
        )
        .await
        .expect("phase reached in time")
        .expect("controller alive")
        .clone()
    }

    /// Let queued notifications drain through the listener task.
    pub async fn drain() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }
}
