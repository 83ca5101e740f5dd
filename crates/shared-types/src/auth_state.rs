//! # Auth State
//!
//! The single authoritative authentication record. The session controller
//! is the only producer; everything else receives immutable snapshots.

use crate::entities::{Profile, Session};
use crate::errors::AuthError;
use serde::{Deserialize, Serialize};

/// Discrete phase of the authentication state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPhase {
    /// Process start; the initial session query has not resolved yet.
    Initializing,
    /// No active session.
    Unauthenticated,
    /// A sign-in or sign-up attempt is in flight.
    Authenticating,
    /// Active session; profile reconciled (or pending provisioning for a
    /// brand-new user).
    Authenticated,
    /// Active session, but the profile lookup failed for a retryable reason.
    ProfileLoadFailed,
}

impl AuthPhase {
    /// Phases during which navigation decisions must be deferred.
    #[must_use]
    pub fn is_transitional(self) -> bool {
        matches!(self, AuthPhase::Initializing | AuthPhase::Authenticating)
    }
}

/// Snapshot of the reconciled authentication state.
///
/// Invariants (upheld by the controller, asserted in tests):
/// - `Authenticated` implies `session` is present.
/// - `Unauthenticated` implies `session` is absent.
/// - `ProfileLoadFailed` implies `session` present, `profile` absent,
///   `last_error` present.
/// - `profile` is never present without `session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    /// Current phase.
    pub phase: AuthPhase,
    /// Active session, if the provider reports one.
    pub session: Option<Session>,
    /// Reconciled profile, if the lookup succeeded.
    pub profile: Option<Profile>,
    /// Most recent command failure; cleared when the next command starts.
    pub last_error: Option<AuthError>,
    /// Replacement counter; increases by one with every committed state.
    pub version: u64,
}

impl AuthState {
    /// The state every controller starts in.
    #[must_use]
    pub fn initializing() -> Self {
        Self {
            phase: AuthPhase::Initializing,
            session: None,
            profile: None,
            last_error: None,
            version: 0,
        }
    }

    /// True iff a session is active and the profile is reconciled.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated && self.session.is_some()
    }

    /// Check the phase/field invariants, returning the first violation.
    ///
    /// Used by tests and debug assertions; production code upholds these by
    /// construction.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        match self.phase {
            AuthPhase::Authenticated => {
                if self.session.is_none() {
                    return Err("Authenticated without a session");
                }
            }
            AuthPhase::Unauthenticated => {
                if self.session.is_some() {
                    return Err("Unauthenticated with a lingering session");
                }
            }
            AuthPhase::ProfileLoadFailed => {
                if self.session.is_none() {
                    return Err("ProfileLoadFailed without a session");
                }
                if self.profile.is_some() {
                    return Err("ProfileLoadFailed with a profile present");
                }
                if self.last_error.is_none() {
                    return Err("ProfileLoadFailed without an error");
                }
            }
            AuthPhase::Initializing | AuthPhase::Authenticating => {}
        }
        if self.profile.is_some() && self.session.is_none() {
            return Err("Profile present without a session");
        }
        Ok(())
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initializing()
    }
}
