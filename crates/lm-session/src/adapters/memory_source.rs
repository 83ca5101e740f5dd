//! # In-Memory Session Source
//!
//! Scripted identity provider for tests and local runs. Models the provider
//! behaviors the controller must reconcile: immediate and
//! confirmation-gated sign-up, credential rejection, external revocation,
//! and injected outages.

use crate::domain::{Credentials, NewAccount};
use crate::ports::{SessionChange, SessionChanges, SessionSource, SignUpResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{ProviderError, Session, SessionToken, UserId};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

struct AccountRecord {
    user_id: UserId,
    password: String,
    confirmed: bool,
}

struct SourceInner {
    accounts: HashMap<String, AccountRecord>,
    active: Option<Session>,
    subscribers: Vec<mpsc::UnboundedSender<SessionChange>>,
    /// When set, sign-up withholds the session until the email is confirmed.
    confirmation_required: bool,
    /// When set, every operation fails with a clone of this error.
    outage: Option<ProviderError>,
}

/// In-memory implementation of `SessionSource`.
pub struct InMemorySessionSource {
    inner: Mutex<SourceInner>,
}

impl InMemorySessionSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SourceInner {
                accounts: HashMap::new(),
                active: None,
                subscribers: Vec::new(),
                confirmation_required: false,
                outage: None,
            }),
        }
    }

    /// Seed a confirmed account.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.accounts.insert(
                email.to_ascii_lowercase(),
                AccountRecord {
                    user_id: UserId::new(),
                    password: password.to_string(),
                    confirmed: true,
                },
            );
        }
        self
    }

    /// Gate future sign-ups behind email confirmation.
    pub fn require_confirmation(&self, required: bool) {
        self.inner.lock().confirmation_required = required;
    }

    /// Fail every subsequent operation with `error`; `None` restores service.
    pub fn set_outage(&self, error: Option<ProviderError>) {
        self.inner.lock().outage = error;
    }

    /// Mark an address confirmed, as the provider's email link would.
    pub fn confirm_email(&self, email: &str) {
        let mut inner = self.inner.lock();
        if let Some(account) = inner.accounts.get_mut(&email.to_ascii_lowercase()) {
            account.confirmed = true;
        }
    }

    /// Revoke the active session from outside (expiry, admin action),
    /// notifying subscribers.
    pub fn revoke_session(&self) {
        let mut inner = self.inner.lock();
        if inner.active.take().is_some() {
            Self::emit(&mut inner, SessionChange::SignedOut);
        }
    }

    /// The session the provider currently considers active.
    #[must_use]
    pub fn active_session(&self) -> Option<Session> {
        self.inner.lock().active.clone()
    }

    fn emit(inner: &mut SourceInner, change: SessionChange) {
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
        debug!(
            subscribers = inner.subscribers.len(),
            change = ?change_kind(&change),
            "Session change emitted"
        );
    }

    fn issue_session(inner: &mut SourceInner, user_id: UserId, email: &str) -> Session {
        let session = Session {
            user_id,
            email: email.to_string(),
            token: SessionToken::mint(),
            expires_at: None,
        };
        inner.active = Some(session.clone());
        Self::emit(inner, SessionChange::SignedIn(session.clone()));
        session
    }

    fn check_outage(inner: &SourceInner) -> Result<(), ProviderError> {
        match &inner.outage {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn change_kind(change: &SessionChange) -> &'static str {
    match change {
        SessionChange::SignedIn(_) => "signed_in",
        SessionChange::SignedOut => "signed_out",
    }
}

impl Default for InMemorySessionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionSource for InMemorySessionSource {
    async fn current_session(&self) -> Result<Option<Session>, ProviderError> {
        let inner = self.inner.lock();
        Self::check_outage(&inner)?;
        Ok(inner.active.clone())
    }

    fn subscribe(&self) -> SessionChanges {
        let (sender, changes) = SessionChanges::channel();
        self.inner.lock().subscribers.push(sender);
        changes
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        Self::check_outage(&inner)?;

        let account = match inner.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => account,
            _ => return Err(ProviderError::InvalidCredentials),
        };
        if !account.confirmed {
            return Err(ProviderError::Rejected("Email not confirmed".to_string()));
        }

        let user_id = account.user_id;
        let email = credentials.email.clone();
        Self::issue_session(&mut inner, user_id, &email);
        Ok(())
    }

    async fn sign_up(&self, account: &NewAccount) -> Result<SignUpResponse, ProviderError> {
        let mut inner = self.inner.lock();
        Self::check_outage(&inner)?;

        if inner.accounts.contains_key(&account.email) {
            return Err(ProviderError::DuplicateEmail {
                email: account.email.clone(),
            });
        }
        if account.password.len() < crate::domain::credentials::MIN_PASSWORD_LEN {
            return Err(ProviderError::WeakPassword);
        }

        let user_id = UserId::new();
        let confirmed = !inner.confirmation_required;
        inner.accounts.insert(
            account.email.clone(),
            AccountRecord {
                user_id,
                password: account.password.clone(),
                confirmed,
            },
        );

        if confirmed {
            let session = Self::issue_session(&mut inner, user_id, &account.email);
            Ok(SignUpResponse {
                session: Some(session),
            })
        } else {
            Ok(SignUpResponse { session: None })
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        Self::check_outage(&inner)?;
        if inner.active.take().is_some() {
            Self::emit(&mut inner, SessionChange::SignedOut);
        }
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), ProviderError> {
        let inner = self.inner.lock();
        Self::check_outage(&inner)?;
        // Success regardless of account existence; the provider does not
        // disclose which addresses are registered.
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        Self::check_outage(&inner)?;

        let email = match &inner.active {
            Some(session) => session.email.clone(),
            None => return Err(ProviderError::Rejected("No active session".to_string())),
        };
        match inner.accounts.get_mut(&email) {
            Some(account) => {
                account.password = new_password.to_string();
                Ok(())
            }
            None => Err(ProviderError::Rejected("Unknown account".to_string())),
        }
    }
}
