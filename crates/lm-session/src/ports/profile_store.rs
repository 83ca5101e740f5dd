//! # Profile Store Port
//!
//! Contract for the persistence collaborator holding application-level
//! profile rows keyed by user identity.

use async_trait::async_trait;
use shared_types::{Profile, ProfileUpdate, StoreError, UserId};

/// Contract for the external profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row for a user.
    ///
    /// A missing row is `Ok(None)` — a valid answer for a freshly created
    /// identity, never an error.
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Apply a partial update and return the full row as stored.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` — no row exists for `user_id`
    /// - `StoreError::Unavailable` / `StoreError::WriteRejected` — the write
    ///   did not take effect; callers must keep their prior copy
    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, StoreError>;
}
