//! # Wiring
//!
//! Builds the controller and authorizer over the in-memory providers and
//! maps the product's paths onto route classes.

use crate::config::RuntimeConfig;
use lm_route_guard::{RouteAuthorizer, RouteClass, RouteDecision};
use lm_session::adapters::{InMemoryProfileStore, InMemorySessionSource};
use lm_session::SessionController;
use std::sync::Arc;

/// The assembled auth runtime.
pub struct AuthRuntime {
    pub source: Arc<InMemorySessionSource>,
    pub store: Arc<InMemoryProfileStore>,
    pub controller: Arc<SessionController>,
    pub authorizer: RouteAuthorizer,
}

impl AuthRuntime {
    /// Construct everything from configuration. The controller is not
    /// started; callers decide when the listener begins.
    #[must_use]
    pub fn build(config: &RuntimeConfig) -> Self {
        let source = Arc::new(
            InMemorySessionSource::new().with_account(&config.demo.email, &config.demo.password),
        );
        let store = Arc::new(InMemoryProfileStore::new());
        let controller = SessionController::new(source.clone(), store.clone());
        let authorizer = RouteAuthorizer::new(config.routes.policy());
        Self {
            source,
            store,
            controller,
            authorizer,
        }
    }

    /// Decide navigation for a concrete product path.
    #[must_use]
    pub fn decide(&self, path: &str) -> RouteDecision {
        let state = self.controller.current();
        self.authorizer.authorize(&state, classify(path), path)
    }
}

/// Map a product path onto its route class.
///
/// Unknown paths are treated as guarded; new screens default to requiring
/// a session rather than leaking.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    match path {
        "/" => RouteClass::Root,
        "/login" | "/forgot-password" | "/update-password" => RouteClass::Public,
        _ => RouteClass::Guarded,
    }
}
