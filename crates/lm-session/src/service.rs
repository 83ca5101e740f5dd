//! # Session Controller
//!
//! The single writer of `AuthState`. Commands and provider notifications
//! both funnel into one commit path; observers receive committed snapshots
//! through a watch channel and never see a torn or intermediate state.
//!
//! ## Write Discipline
//!
//! - `commit_lock` serializes every state replacement; the producing
//!   closure runs inside the lock against the freshly read current state.
//! - `op_guard` admits one mutating command at a time; a second command is
//!   rejected immediately instead of queued.
//! - Completions that awaited a collaborator compare the version they
//!   captured against the committed version and discard themselves when a
//!   newer state won the race.
//! - Tokens revoked by a locally authoritative sign-out are remembered so a
//!   queued signed-in notification for a dead session can never resurrect
//!   it.

use crate::domain::credentials::{normalize_email, validate_password};
use crate::domain::{
    reconcile_session, reconcile_signed_out, Credentials, NewAccount, ProfileOutcome,
    RevokedTokens,
};
use crate::ports::{ProfileStore, SessionChange, SessionChanges, SessionSource};
use shared_types::{AuthError, AuthPhase, AuthState, Profile, ProfileUpdate, Session};
use std::sync::{Arc, Weak};
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of a successful sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// True when the identity was created but the provider withheld the
    /// session until the email address is confirmed.
    pub requires_confirmation: bool,
}

/// Reconciles identity-provider events and profile lookups into one
/// authoritative `AuthState`.
///
/// Construct with [`SessionController::new`], then call
/// [`start`](SessionController::start) once to resolve the initial session
/// and begin consuming notifications. Call
/// [`shutdown`](SessionController::shutdown) (or drop every handle) to stop
/// the listener.
pub struct SessionController {
    source: Arc<dyn SessionSource>,
    store: Arc<dyn ProfileStore>,
    state_tx: watch::Sender<AuthState>,
    /// Serializes state replacements.
    commit_lock: Mutex<()>,
    /// Admits one mutating command at a time.
    op_guard: Arc<Mutex<()>>,
    revoked: parking_lot::Mutex<RevokedTokens>,
    listener: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(source: Arc<dyn SessionSource>, store: Arc<dyn ProfileStore>) -> Arc<Self> {
        Arc::new(Self {
            source,
            store,
            state_tx: watch::Sender::new(AuthState::initializing()),
            commit_lock: Mutex::new(()),
            op_guard: Arc::new(Mutex::new(())),
            revoked: parking_lot::Mutex::new(RevokedTokens::new()),
            listener: parking_lot::Mutex::new(None),
        })
    }

    /// Resolve the initial session and start consuming notifications.
    ///
    /// Subscribes before the initial query so no change emitted in between
    /// is lost. Calling `start` twice is a logged no-op.
    pub fn start(self: &Arc<Self>) {
        let mut slot = self.listener.lock();
        if slot.is_some() {
            warn!("Session controller already started");
            return;
        }
        let changes = self.source.subscribe();
        let weak = Arc::downgrade(self);
        *slot = Some(tokio::spawn(listen_loop(weak, changes)));
        debug!("Session controller started");
    }

    /// Stop the notification listener. Idempotent.
    pub fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
            debug!("Session controller listener stopped");
        }
    }

    /// Snapshot of the last committed state.
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to committed state replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Create a new identity.
    ///
    /// Returns `requires_confirmation: true` when the provider withheld the
    /// session pending email confirmation; otherwise reconciles straight
    /// toward `Authenticated`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let _op = self.begin_mutation()?;
        if self.current().phase == AuthPhase::Authenticating {
            return Err(AuthError::ConcurrentOperation);
        }
        let account = match NewAccount::parse(email, password, display_name) {
            Ok(account) => account,
            Err(error) => return Err(self.record_error(error).await),
        };

        self.enter_authenticating().await;

        match self.source.sign_up(&account).await {
            Err(provider_err) => {
                let error = AuthError::from(provider_err);
                self.revert_unauthenticated(Some(error.clone())).await;
                warn!(email = %account.email, error = %error, "Sign-up rejected");
                Err(error)
            }
            Ok(response) => match response.session {
                Some(session) => {
                    info!(email = %account.email, "Sign-up issued an immediate session");
                    self.apply_session(session).await;
                    Ok(SignUpOutcome {
                        requires_confirmation: false,
                    })
                }
                None => {
                    // Identity created; no session until the address is
                    // confirmed.
                    info!(email = %account.email, "Sign-up pending email confirmation");
                    self.revert_unauthenticated(None).await;
                    Ok(SignUpOutcome {
                        requires_confirmation: true,
                    })
                }
            },
        }
    }

    /// Authenticate with email and password.
    ///
    /// On provider acceptance this returns while the phase is still
    /// `Authenticating`; the provider's signed-in notification drives the
    /// final transition so there is a single source of truth.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let _op = self.begin_mutation()?;
        if self.current().phase == AuthPhase::Authenticating {
            return Err(AuthError::ConcurrentOperation);
        }
        let credentials = match Credentials::parse(email, password) {
            Ok(credentials) => credentials,
            Err(error) => return Err(self.record_error(error).await),
        };

        self.enter_authenticating().await;

        match self.source.sign_in(&credentials).await {
            Ok(()) => {
                info!(email = %credentials.email, "Sign-in accepted, awaiting session notification");
                Ok(())
            }
            Err(provider_err) => {
                let error = AuthError::from(provider_err);
                self.revert_unauthenticated(Some(error.clone())).await;
                warn!(email = %credentials.email, error = %error, "Sign-in rejected");
                Err(error)
            }
        }
    }

    /// Revoke the active session.
    ///
    /// Success is locally authoritative: the state becomes
    /// `Unauthenticated` before any provider notification arrives, and the
    /// revoked token is remembered so a queued stale notification cannot
    /// resurrect the session.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let _op = self.begin_mutation()?;
        // Identify the session being revoked. The committed state may not
        // carry it yet (sign-out racing a queued signed-in notification),
        // so fall back to asking the provider directly.
        let revoked_token = match self.current().session {
            Some(session) => Some(session.token),
            None => self
                .source
                .current_session()
                .await
                .ok()
                .flatten()
                .map(|session| session.token),
        };

        match self.source.sign_out().await {
            Ok(()) => {
                if let Some(token) = revoked_token {
                    self.revoked.lock().insert(token);
                }
                self.commit(|current| {
                    Some(AuthState {
                        phase: AuthPhase::Unauthenticated,
                        session: None,
                        profile: None,
                        last_error: None,
                        version: current.version,
                    })
                })
                .await;
                info!("Signed out");
                Ok(())
            }
            Err(provider_err) => {
                // Sign-out is not assumed to have partially succeeded; the
                // session stays as-is and only the error is surfaced.
                let error = AuthError::from(provider_err);
                warn!(error = %error, "Sign-out failed");
                Err(self.record_error(error).await)
            }
        }
    }

    /// Ask the provider to start a password-reset flow.
    ///
    /// Fire-and-forget: never alters the phase, reports failure only
    /// through the result and `last_error`.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = match normalize_email(email) {
            Ok(email) => email,
            Err(error) => return Err(self.record_error(error).await),
        };
        match self.source.request_password_reset(&email).await {
            Ok(()) => {
                self.clear_error().await;
                info!(email = %email, "Password reset requested");
                Ok(())
            }
            Err(provider_err) => Err(self.record_error(provider_err.into()).await),
        }
    }

    /// Replace the password of the authenticated identity (recovery flow).
    ///
    /// Requires an active session; never alters the phase.
    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let _op = self.begin_mutation()?;
        if self.current().session.is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        if let Err(error) = validate_password(new_password) {
            return Err(self.record_error(error).await);
        }
        match self.source.update_password(new_password).await {
            Ok(()) => {
                self.clear_error().await;
                info!("Password updated");
                Ok(())
            }
            Err(provider_err) => Err(self.record_error(provider_err.into()).await),
        }
    }

    /// Write a partial profile update through to the store and, on success
    /// only, replace the in-memory profile atomically.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile, AuthError> {
        let _op = self.begin_mutation()?;
        let current = self.current();
        let session = match (current.phase, current.session) {
            (AuthPhase::Authenticated, Some(session)) => session,
            _ => return Err(AuthError::NotAuthenticated),
        };
        let expected = current.version;

        match self.store.update_profile(session.user_id, &update).await {
            Ok(profile) => {
                let committed = self
                    .commit(|state| {
                        if state.version != expected {
                            // A newer state (revocation, sign-out) won the
                            // race; the write stands in the store but must
                            // not resurrect the session here.
                            return None;
                        }
                        Some(AuthState {
                            profile: Some(profile.clone()),
                            last_error: None,
                            ..state.clone()
                        })
                    })
                    .await;
                if committed {
                    info!(user_id = %profile.user_id, "Profile updated");
                } else {
                    debug!(
                        expected,
                        "Profile update landed after a newer state; replacement discarded"
                    );
                }
                Ok(profile)
            }
            Err(store_err) => {
                let error = AuthError::from(store_err);
                warn!(error = %error, "Profile update failed");
                Err(self.record_error(error).await)
            }
        }
    }

    // =========================================================================
    // RECONCILIATION
    // =========================================================================

    /// Reconcile a live session against the profile store and commit the
    /// outcome, unless a newer state was committed while the lookup ran.
    async fn apply_session(&self, session: Session) {
        if self.revoked.lock().contains(&session.token) {
            debug!("Notification for a locally revoked session discarded");
            return;
        }
        let expected = self.current().version;

        let outcome = match self.store.fetch_profile(session.user_id).await {
            Ok(Some(profile)) => ProfileOutcome::Found(profile),
            Ok(None) => ProfileOutcome::Missing,
            Err(store_err) => ProfileOutcome::Failed(store_err),
        };

        let committed = self
            .commit(|current| {
                if current.version != expected {
                    return None;
                }
                reconcile_session(current, session.clone(), outcome.clone())
            })
            .await;
        if !committed {
            debug!(expected, "Session reconciliation superseded or duplicate");
        }
    }

    async fn apply_change(&self, change: SessionChange) {
        match change {
            SessionChange::SignedIn(session) => self.apply_session(session).await,
            SessionChange::SignedOut => {
                self.commit(reconcile_signed_out).await;
            }
        }
    }

    /// First resolution after `start`: drive the state out of
    /// `Initializing`.
    async fn resolve_initial(&self) {
        match self.source.current_session().await {
            Ok(Some(session)) => self.apply_session(session).await,
            Ok(None) => {
                self.commit(reconcile_signed_out).await;
                debug!("No existing session at startup");
            }
            Err(provider_err) => {
                let error = AuthError::from(provider_err);
                warn!(error = %error, "Initial session query failed");
                self.revert_unauthenticated(Some(error)).await;
            }
        }
    }

    // =========================================================================
    // COMMIT PATH
    // =========================================================================

    /// Publish the state produced by `produce`, or nothing when it returns
    /// `None`. The closure observes the freshly read current state under
    /// the commit lock; the version is bumped here.
    async fn commit<F>(&self, produce: F) -> bool
    where
        F: FnOnce(&AuthState) -> Option<AuthState>,
    {
        let _guard = self.commit_lock.lock().await;
        let current = self.state_tx.borrow().clone();
        let Some(mut next) = produce(&current) else {
            return false;
        };
        next.version = current.version + 1;
        debug_assert!(next.check_invariants().is_ok());
        debug!(
            from = ?current.phase,
            to = ?next.phase,
            version = next.version,
            "Auth state replaced"
        );
        self.state_tx.send_replace(next);
        true
    }

    fn begin_mutation(&self) -> Result<OwnedMutexGuard<()>, AuthError> {
        Arc::clone(&self.op_guard)
            .try_lock_owned()
            .map_err(|_| AuthError::ConcurrentOperation)
    }

    async fn enter_authenticating(&self) {
        self.commit(|current| {
            Some(AuthState {
                phase: AuthPhase::Authenticating,
                session: current.session.clone(),
                profile: current.profile.clone(),
                last_error: None,
                version: current.version,
            })
        })
        .await;
    }

    async fn revert_unauthenticated(&self, error: Option<AuthError>) {
        self.commit(|current| {
            Some(AuthState {
                phase: AuthPhase::Unauthenticated,
                session: None,
                profile: None,
                last_error: error,
                version: current.version,
            })
        })
        .await;
    }

    /// Record a command failure without touching phase, session, or
    /// profile. Returns the error for convenient `Err(...)` tails.
    async fn record_error(&self, error: AuthError) -> AuthError {
        self.commit(|current| {
            Some(AuthState {
                last_error: Some(error.clone()),
                ..current.clone()
            })
        })
        .await;
        error
    }

    async fn clear_error(&self) {
        self.commit(|current| {
            current.last_error.as_ref()?;
            Some(AuthState {
                last_error: None,
                ..current.clone()
            })
        })
        .await;
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Listener task: initial resolution, then ordered notification
/// consumption. Holds only a weak handle so dropping the controller ends
/// the loop.
async fn listen_loop(weak: Weak<SessionController>, mut changes: SessionChanges) {
    if let Some(controller) = weak.upgrade() {
        controller.resolve_initial().await;
    }
    while let Some(change) = changes.recv().await {
        let Some(controller) = weak.upgrade() else {
            break;
        };
        controller.apply_change(change).await;
    }
    debug!("Session change stream closed");
}
