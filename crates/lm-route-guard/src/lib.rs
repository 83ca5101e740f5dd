//! # lm-route-guard
//!
//! Route authorization for LaunchMasters navigation.
//!
//! A pure mapping from the committed `AuthState` and the class of the
//! requested route to a navigation decision. Re-evaluated on every state
//! replacement and every navigation attempt; holds no state of its own and
//! performs no I/O, so a decision can never observe a torn auth state.

pub mod authorizer;
pub mod routes;

pub use authorizer::{RouteAuthorizer, RouteDecision};
pub use routes::{RouteClass, RoutePolicy};
