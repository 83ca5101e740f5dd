//! # Session Source Port
//!
//! Contract for the external identity provider: credential operations plus
//! an ordered stream of session-change notifications.
//!
//! The provider's push callbacks are modeled as an explicit channel with
//! single-consumer delivery so the controller observes changes in the order
//! the provider emitted them.

use crate::domain::{Credentials, NewAccount};
use async_trait::async_trait;
use shared_types::{ProviderError, Session};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// A session-change notification from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A session became active (sign-in, sign-up with immediate session,
    /// token refresh).
    SignedIn(Session),
    /// The active session ended (sign-out, expiry, external revocation).
    SignedOut,
}

/// Ordered single-consumer stream of session changes.
///
/// Dropping the handle unsubscribes; the provider side observes the closed
/// channel and stops sending.
pub struct SessionChanges {
    receiver: mpsc::UnboundedReceiver<SessionChange>,
}

impl SessionChanges {
    /// Create a connected (sender, stream) pair.
    ///
    /// Intended for `SessionSource` implementations; the controller only
    /// ever sees the receiving half.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<SessionChange>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }

    /// Receive the next change in emission order.
    ///
    /// Returns `None` once the provider side is gone.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        self.receiver.recv().await
    }
}

impl Stream for SessionChanges {
    type Item = SessionChange;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Provider response to a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResponse {
    /// Present when the provider issues a session immediately; absent when
    /// the address must be confirmed first.
    pub session: Option<Session>,
}

/// Contract for the external identity provider.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Query the currently active session, if any.
    async fn current_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Subscribe to session-change notifications.
    fn subscribe(&self) -> SessionChanges;

    /// Authenticate with email and password.
    ///
    /// Success is reported through a subsequent `SignedIn` notification,
    /// not through this return value.
    async fn sign_in(&self, credentials: &Credentials) -> Result<(), ProviderError>;

    /// Create a new identity.
    async fn sign_up(&self, account: &NewAccount) -> Result<SignUpResponse, ProviderError>;

    /// Revoke the active session.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Ask the provider to start a password-reset flow for `email`.
    async fn request_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    /// Replace the password of the currently authenticated identity.
    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError>;
}
