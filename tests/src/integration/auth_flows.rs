//! # Auth Flow Integration Tests
//!
//! Exercises the controller against the in-memory providers across full
//! lifecycles: cold start, sign-in choreography, profile reconciliation
//! failure, locally authoritative sign-out, and command overlap rejection.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{
        drain, settled, started, stopped, wait_phase, EMAIL, PASSWORD,
    };
    use lm_session::domain::Credentials;
    use lm_session::SessionSource;
    use shared_types::{AuthError, AuthPhase, ProfileUpdate, ProviderError, StoreError};

    #[tokio::test]
    async fn test_cold_start_without_session_resolves_unauthenticated() {
        let fx = stopped();
        assert_eq!(fx.controller.current().phase, AuthPhase::Initializing);

        fx.controller.start();
        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;

        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        assert!(state.session.is_none());
        assert!(state.profile.is_none());
    }

    #[tokio::test]
    async fn test_cold_start_with_existing_session_resolves_authenticated() {
        let fx = stopped();
        // A previous run left a live session and a provisioned profile.
        fx.source
            .sign_in(&Credentials::parse(EMAIL, PASSWORD).unwrap())
            .await
            .unwrap();
        let session = fx.source.active_session().expect("session issued");
        fx.store.provision(session.user_id, EMAIL);

        fx.controller.start();
        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;

        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert_eq!(state.session.unwrap().email, EMAIL);
        assert!(state.profile.is_some());
    }

    #[tokio::test]
    async fn test_sign_in_choreography_ends_authenticated() {
        let fx = started().await;

        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        // Command returned; the transition is driven by the notification.
        assert_eq!(fx.controller.current().phase, AuthPhase::Authenticating);

        let session = fx.source.active_session().unwrap();
        fx.store.provision(session.user_id, EMAIL);

        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;
        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert_eq!(state.session.as_ref().unwrap().token, session.token);
        assert_eq!(state.profile.unwrap().email, EMAIL);
    }

    #[tokio::test]
    async fn test_transient_store_failure_yields_profile_load_failed() {
        let fx = started().await;
        fx.store
            .set_read_failure(Some(StoreError::Unavailable("connection reset".to_string())));

        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;

        assert_eq!(state.phase, AuthPhase::ProfileLoadFailed);
        // The session is retained so recovery does not need re-auth.
        assert!(state.session.is_some());
        assert!(state.profile.is_none());
        assert!(matches!(state.last_error, Some(AuthError::Store(_))));
    }

    #[tokio::test]
    async fn test_store_recovery_reauthenticates_without_new_credentials_prompt() {
        let fx = started().await;
        fx.store
            .set_read_failure(Some(StoreError::Unavailable("connection reset".to_string())));
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let mut rx = fx.controller.subscribe();
        let failed = settled(&mut rx).await;
        assert_eq!(failed.phase, AuthPhase::ProfileLoadFailed);

        // Store comes back; the provider re-announces the same session
        // (token refresh) and reconciliation now succeeds.
        fx.store.set_read_failure(None);
        let session = fx.source.active_session().unwrap();
        fx.store.provision(session.user_id, EMAIL);
        fx.source.revoke_session();
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();

        let state = wait_phase(&mut rx, AuthPhase::Authenticated).await;
        assert!(state.profile.is_some());
    }

    #[tokio::test]
    async fn test_second_sign_in_while_authenticating_rejected() {
        let fx = started().await;

        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        assert_eq!(fx.controller.current().phase, AuthPhase::Authenticating);
        let in_flight = fx.controller.current();

        let error = fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap_err();
        assert_eq!(error, AuthError::ConcurrentOperation);
        assert_eq!(fx.controller.current(), in_flight);
    }

    #[tokio::test]
    async fn test_sign_out_discards_stale_signed_in_notification() {
        let fx = started().await;

        // Sign in, then sign out before the signed-in notification is
        // consumed; the notification is now stale.
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        fx.controller.sign_out().await.unwrap();

        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        let version_after_sign_out = state.version;

        // Let the queued stale notification (and the sign-out echo) drain.
        drain().await;

        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        assert!(state.session.is_none());
        // Nothing was committed after the sign-out replacement.
        assert_eq!(state.version, version_after_sign_out);
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_session() {
        let fx = started().await;
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let session = fx.source.active_session().unwrap();
        fx.store.provision(session.user_id, EMAIL);
        let mut rx = fx.controller.subscribe();
        settled(&mut rx).await;

        fx.source
            .set_outage(Some(ProviderError::Network("gateway timeout".to_string())));
        let error = fx.controller.sign_out().await.unwrap_err();
        assert!(matches!(error, AuthError::Provider(_)));

        // Sign-out is never assumed to have partially succeeded.
        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert!(state.session.is_some());
        assert_eq!(state.last_error, Some(error));
    }

    #[tokio::test]
    async fn test_update_profile_round_trip_visible_immediately() {
        let fx = started().await;
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let session = fx.source.active_session().unwrap();
        fx.store.provision(session.user_id, EMAIL);
        let mut rx = fx.controller.subscribe();
        settled(&mut rx).await;

        fx.controller
            .update_profile(ProfileUpdate {
                display_name: Some("X".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        // Immediate re-read: no stale intermediate visible.
        let profile = fx.controller.current().profile.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn test_update_profile_unauthenticated_rejected_without_state_change() {
        let fx = started().await;
        let before = fx.controller.current();

        let error = fx
            .controller
            .update_profile(ProfileUpdate {
                display_name: Some("X".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(error, AuthError::NotAuthenticated);
        assert_eq!(fx.controller.current(), before);
    }

    #[tokio::test]
    async fn test_sign_up_confirmation_flow_end_to_end() {
        let fx = started().await;
        fx.source.require_confirmation(true);

        let outcome = fx
            .controller
            .sign_up("new@example.com", "fresh-pass-1", Some("New Student"))
            .await
            .unwrap();
        assert!(outcome.requires_confirmation);
        assert_eq!(fx.controller.current().phase, AuthPhase::Unauthenticated);

        // The confirmation link lands; sign-in now completes the flow.
        fx.source.confirm_email("new@example.com");
        fx.controller
            .sign_in("new@example.com", "fresh-pass-1")
            .await
            .unwrap();
        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;
        assert_eq!(state.phase, AuthPhase::Authenticated);
    }

    #[tokio::test]
    async fn test_duplicate_email_sign_up_surfaces_provider_message() {
        let fx = started().await;
        let error = fx
            .controller
            .sign_up(EMAIL, "another-pass-1", None)
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            format!("An account with email {EMAIL} already exists")
        );
        assert_eq!(fx.controller.current().phase, AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_external_revocation_transitions_to_unauthenticated() {
        let fx = started().await;
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let mut rx = fx.controller.subscribe();
        settled(&mut rx).await;

        fx.source.revoke_session();
        drain().await;

        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        assert!(state.session.is_none());
        assert!(state.profile.is_none());
    }

    #[tokio::test]
    async fn test_invariants_hold_across_notification_sequence() {
        let fx = started().await;
        let mut rx = fx.controller.subscribe();

        // A churny sequence: sign-in, revocation, failed reconcile,
        // recovery. Every committed state must satisfy the phase/field
        // invariants, and Authenticated must always carry the session.
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        settled(&mut rx).await;
        fx.source.revoke_session();
        drain().await;

        fx.store
            .set_read_failure(Some(StoreError::Unavailable("blip".to_string())));
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        settled(&mut rx).await;

        fx.store.set_read_failure(None);
        fx.source.revoke_session();
        drain().await;
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let state = settled(&mut rx).await;

        assert!(state.check_invariants().is_ok());
        if state.phase == AuthPhase::Authenticated {
            assert!(state.session.is_some());
        }
    }
}
