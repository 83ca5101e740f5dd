//! # Error Types
//!
//! Defines the closed error taxonomy for the authentication core.
//!
//! Messages are written for direct user display; no variant leaks a raw
//! collaborator error shape past the controller boundary.

use crate::entities::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderError {
    /// Credentials did not match an account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up attempted with an email that already has an account.
    #[error("An account with email {email} already exists")]
    DuplicateEmail { email: String },

    /// Password rejected by the provider's strength policy.
    #[error("Password does not meet the minimum strength requirements")]
    WeakPassword,

    /// Too many attempts in a short window.
    #[error("Too many attempts, please try again later")]
    RateLimited,

    /// The provider could not be reached.
    #[error("Authentication service unreachable: {0}")]
    Network(String),

    /// Provider rejected the request for a reason it chose to describe.
    #[error("{0}")]
    Rejected(String),
}

/// Errors from the profile store.
///
/// Profile absence on a read is NOT an error; reads return `Ok(None)`.
/// `NotFound` is produced only by writes against a missing row.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    /// Write targeted a profile row that does not exist.
    #[error("No profile found for user {0}")]
    NotFound(UserId),

    /// The store could not be reached or timed out.
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write.
    #[error("Profile write rejected: {0}")]
    WriteRejected(String),
}

/// Command-boundary error union surfaced by the session controller.
///
/// Every failure a command can produce is one of these variants; UI layers
/// render `Display` output verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// Input rejected before any collaborator was called.
    #[error("{0}")]
    Validation(String),

    /// Identity-provider rejection or outage.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Profile read/write failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Command requires an active session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Another mutating command is already in flight.
    #[error("Another authentication request is already in progress")]
    ConcurrentOperation,
}
