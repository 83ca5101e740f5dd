//! # Revoked Token Tracking
//!
//! After a locally authoritative sign-out the provider may still deliver a
//! queued signed-in notification for the dead session. Those notifications
//! must never resurrect the session, so the controller remembers which
//! tokens it has revoked and discards matching notifications.
//!
//! The set is capacity-bounded: tokens are unique per session, so only the
//! most recent revocations can ever race an in-flight notification.

use shared_types::SessionToken;
use std::collections::VecDeque;

/// Bounded set of locally revoked session tokens.
#[derive(Debug)]
pub struct RevokedTokens {
    tokens: VecDeque<SessionToken>,
    capacity: usize,
}

impl RevokedTokens {
    /// Default bound; far above anything a single process can race.
    pub const DEFAULT_CAPACITY: usize = 64;

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tokens: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Record a token as revoked, evicting the oldest entry when full.
    pub fn insert(&mut self, token: SessionToken) {
        if self.tokens.len() == self.capacity {
            self.tokens.pop_front();
        }
        self.tokens.push_back(token);
    }

    /// True when a notification for this token must be discarded.
    #[must_use]
    pub fn contains(&self, token: &SessionToken) -> bool {
        self.tokens.contains(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for RevokedTokens {
    fn default() -> Self {
        Self::new()
    }
}
