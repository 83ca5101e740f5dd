//! # In-Memory Profile Store
//!
//! HashMap-backed implementation of `ProfileStore` for tests and local
//! runs, with injectable read/write failures for reconciliation scenarios.

use crate::ports::ProfileStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{unix_timestamp, Profile, ProfileUpdate, StoreError, UserId};
use std::collections::HashMap;

struct StoreInner {
    profiles: HashMap<UserId, Profile>,
    read_failure: Option<StoreError>,
    write_failure: Option<StoreError>,
}

/// In-memory implementation of `ProfileStore`.
pub struct InMemoryProfileStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                profiles: HashMap::new(),
                read_failure: None,
                write_failure: None,
            }),
        }
    }

    /// Create the profile row for a newly registered user.
    ///
    /// Provisioning is an explicit application decision; the store never
    /// creates rows on its own.
    pub fn provision(&self, user_id: UserId, email: &str) -> Profile {
        let profile = Profile::provision(user_id, email);
        self.inner.lock().profiles.insert(user_id, profile.clone());
        profile
    }

    /// Insert a fully formed row (test fixtures).
    pub fn insert(&self, profile: Profile) {
        self.inner.lock().profiles.insert(profile.user_id, profile);
    }

    /// Fail every subsequent read with `error`; `None` restores reads.
    pub fn set_read_failure(&self, error: Option<StoreError>) {
        self.inner.lock().read_failure = error;
    }

    /// Fail every subsequent write with `error`; `None` restores writes.
    pub fn set_write_failure(&self, error: Option<StoreError>) {
        self.inner.lock().write_failure = error;
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock();
        if let Some(error) = &inner.read_failure {
            return Err(error.clone());
        }
        Ok(inner.profiles.get(&user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(error) = &inner.write_failure {
            return Err(error.clone());
        }

        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound(user_id))?;

        if let Some(display_name) = &update.display_name {
            profile.display_name = Some(display_name.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        profile.updated_at = unix_timestamp();

        Ok(profile.clone())
    }
}
