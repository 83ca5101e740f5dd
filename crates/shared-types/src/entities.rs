//! # Core Domain Entities
//!
//! Defines the identity and profile entities shared across the workspace.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `SessionToken`, `Session`
//! - **Profile**: `Profile`, `ProfileUpdate`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Unique identifier for a user, issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh random user id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque provider-issued proof of authentication.
///
/// The token contents are meaningful only to the identity provider; this
/// workspace compares tokens for identity and never inspects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mint a random token (used by in-memory providers).
    #[must_use]
    pub fn mint() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An active session as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated user.
    pub user_id: UserId,
    /// Email the session was established with.
    pub email: String,
    /// Opaque access token.
    pub token: SessionToken,
    /// Unix timestamp after which the provider will revoke the session.
    pub expires_at: Option<u64>,
}

// =============================================================================
// CLUSTER B: PROFILE
// =============================================================================

/// Application-level user record, distinct from the identity-provider record.
///
/// Stored in the profile store keyed by `UserId`; a freshly signed-up user
/// may not have one yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Unix timestamp of row creation.
    pub created_at: u64,
    /// Unix timestamp of the last write.
    pub updated_at: u64,
}

impl Profile {
    /// Create a minimal profile row for a new user.
    #[must_use]
    pub fn provision(user_id: UserId, email: impl Into<String>) -> Self {
        let now = unix_timestamp();
        Self {
            user_id,
            email: email.into(),
            display_name: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile write. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// True when the update would not change any field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.avatar_url.is_none()
    }
}

/// Current unix timestamp in seconds.
///
/// Saturates to 0 on a pre-epoch clock rather than panicking.
#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
