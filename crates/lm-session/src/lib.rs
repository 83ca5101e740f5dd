//! # lm-session
//!
//! Session reconciliation subsystem for LaunchMasters.
//!
//! ## Role in System
//!
//! - **Single Writer**: The `SessionController` is the only component that
//!   produces new `AuthState` values; everything else observes snapshots.
//! - **Reconciliation**: Combines identity-provider notifications with
//!   profile-store lookups into one authoritative phase.
//! - **Ordered Delivery**: Provider notifications are consumed from an
//!   ordered single-consumer channel; completions that lost a race against
//!   a newer committed state are discarded by version comparison.
//!
//! ## Layout
//!
//! - `domain/` — pure state-transition logic and credential validation
//! - `ports/` — traits the controller drives (identity provider, profile store)
//! - `adapters/` — in-memory port implementations for tests and local runs
//! - `service` — the controller itself

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::{SessionController, SignUpOutcome};
