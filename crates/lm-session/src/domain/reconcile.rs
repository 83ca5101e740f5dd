//! # Session Reconciliation
//!
//! Pure transition functions combining a provider notification with the
//! profile-lookup outcome to produce the next `AuthState`.
//!
//! Returning `None` means the notification reproduces the committed state
//! and no replacement must be published (notification de-duplication).
//! Version bumping is the committer's job; these functions carry the
//! current version through unchanged.

use shared_types::{AuthError, AuthPhase, AuthState, Profile, Session, StoreError};

/// Outcome of a profile lookup performed for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    /// The store returned a profile row.
    Found(Profile),
    /// The store answered, but no row exists yet (new user, not an error).
    Missing,
    /// The lookup failed for a retryable reason.
    Failed(StoreError),
}

/// Next state for a signed-in notification.
pub fn reconcile_session(
    current: &AuthState,
    session: Session,
    profile: ProfileOutcome,
) -> Option<AuthState> {
    let same_token = current
        .session
        .as_ref()
        .is_some_and(|s| s.token == session.token);

    match profile {
        ProfileOutcome::Found(profile) => {
            if same_token
                && current.phase == AuthPhase::Authenticated
                && current.profile.as_ref() == Some(&profile)
            {
                return None;
            }
            Some(AuthState {
                phase: AuthPhase::Authenticated,
                session: Some(session),
                profile: Some(profile),
                last_error: None,
                version: current.version,
            })
        }
        ProfileOutcome::Missing => {
            if same_token
                && current.phase == AuthPhase::Authenticated
                && current.profile.is_none()
            {
                return None;
            }
            // Valid session, row not provisioned yet. Stay Authenticated with
            // an empty profile; the next notification re-resolves it.
            Some(AuthState {
                phase: AuthPhase::Authenticated,
                session: Some(session),
                profile: None,
                last_error: None,
                version: current.version,
            })
        }
        ProfileOutcome::Failed(store_err) => {
            let error = AuthError::from(store_err);
            if same_token
                && current.phase == AuthPhase::ProfileLoadFailed
                && current.last_error.as_ref() == Some(&error)
            {
                return None;
            }
            // Session is retained so a later retry can succeed without
            // re-authenticating.
            Some(AuthState {
                phase: AuthPhase::ProfileLoadFailed,
                session: Some(session),
                profile: None,
                last_error: Some(error),
                version: current.version,
            })
        }
    }
}

/// Next state for a signed-out notification (revocation, expiry, external
/// logout). `last_error` is preserved; revocation is not a command failure.
pub fn reconcile_signed_out(current: &AuthState) -> Option<AuthState> {
    if current.phase == AuthPhase::Unauthenticated && current.session.is_none() {
        return None;
    }
    Some(AuthState {
        phase: AuthPhase::Unauthenticated,
        session: None,
        profile: None,
        last_error: current.last_error.clone(),
        version: current.version,
    })
}
