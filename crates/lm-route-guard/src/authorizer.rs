//! # Route Authorizer
//!
//! The decision table gating navigation on the committed auth state.
//!
//! Transitional phases always yield `Loading`, never a redirect: a redirect
//! issued mid-transition would flicker and lose the requested path, so
//! loading wins every tie until the phase stabilizes.

use crate::routes::{RouteClass, RoutePolicy};
use shared_types::{AuthPhase, AuthState};

/// Navigation decision for one (state, route) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested route.
    Allow,
    /// Render the requested route, with a non-blocking indicator that the
    /// profile could not be loaded.
    AllowWithProfileWarning,
    /// Send the visitor to the login page, remembering where they were
    /// headed so a successful sign-in can return them there.
    RedirectToLogin {
        to: String,
        return_to: Option<String>,
    },
    /// Send the authenticated user to the default landing page.
    RedirectToLanding { to: String },
    /// Defer: render a loading placeholder until the phase stabilizes.
    Loading,
}

/// Pure authorizer over a fixed `RoutePolicy`.
#[derive(Debug, Clone, Default)]
pub struct RouteAuthorizer {
    policy: RoutePolicy,
}

impl RouteAuthorizer {
    #[must_use]
    pub fn new(policy: RoutePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Decide navigation for `requested_path` of class `class` under
    /// `state`.
    #[must_use]
    pub fn authorize(
        &self,
        state: &AuthState,
        class: RouteClass,
        requested_path: &str,
    ) -> RouteDecision {
        if state.phase.is_transitional() {
            return RouteDecision::Loading;
        }

        match (state.phase, class) {
            (AuthPhase::Unauthenticated, RouteClass::Guarded) => RouteDecision::RedirectToLogin {
                to: self.policy.login_path.clone(),
                return_to: Some(requested_path.to_string()),
            },
            (AuthPhase::Unauthenticated, RouteClass::Public) => RouteDecision::Allow,
            (AuthPhase::Unauthenticated, RouteClass::Root) => RouteDecision::RedirectToLogin {
                to: self.policy.login_path.clone(),
                return_to: None,
            },

            (AuthPhase::Authenticated, RouteClass::Guarded) => RouteDecision::Allow,
            (AuthPhase::Authenticated, RouteClass::Public | RouteClass::Root) => {
                RouteDecision::RedirectToLanding {
                    to: self.policy.landing_path.clone(),
                }
            }

            // The session is valid even though the profile is not; guarded
            // content stays reachable with a warning surface.
            (AuthPhase::ProfileLoadFailed, RouteClass::Guarded) => {
                RouteDecision::AllowWithProfileWarning
            }
            (AuthPhase::ProfileLoadFailed, RouteClass::Public | RouteClass::Root) => {
                RouteDecision::RedirectToLanding {
                    to: self.policy.landing_path.clone(),
                }
            }

            (AuthPhase::Initializing | AuthPhase::Authenticating, _) => RouteDecision::Loading,
        }
    }
}
