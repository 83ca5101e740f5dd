//! # Route Gating Integration Tests
//!
//! Drives the controller through real lifecycles and checks the route
//! authorizer's decision at each committed state.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{settled, started, stopped, EMAIL, PASSWORD};
    use lm_route_guard::{RouteAuthorizer, RouteClass, RouteDecision};
    use shared_types::AuthPhase;

    fn guard() -> RouteAuthorizer {
        RouteAuthorizer::default()
    }

    #[tokio::test]
    async fn test_fresh_load_guarded_route_redirects_remembering_path() {
        let fx = started().await;
        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Unauthenticated);

        let decision = guard().authorize(&state, RouteClass::Guarded, "/dashboard");
        assert_eq!(
            decision,
            RouteDecision::RedirectToLogin {
                to: "/login".to_string(),
                return_to: Some("/dashboard".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_login_redirects_to_landing_after_authentication() {
        let fx = started().await;
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let session = fx.source.active_session().unwrap();
        fx.store.provision(session.user_id, EMAIL);

        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;
        assert_eq!(state.phase, AuthPhase::Authenticated);

        assert_eq!(
            guard().authorize(&state, RouteClass::Public, "/login"),
            RouteDecision::RedirectToLanding {
                to: "/dashboard".to_string(),
            }
        );
        assert_eq!(
            guard().authorize(&state, RouteClass::Guarded, "/deadlines"),
            RouteDecision::Allow
        );
    }

    #[tokio::test]
    async fn test_profile_load_failure_allows_guarded_with_warning() {
        let fx = started().await;
        fx.store.set_read_failure(Some(
            shared_types::StoreError::Unavailable("connection reset".to_string()),
        ));
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();

        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;
        assert_eq!(state.phase, AuthPhase::ProfileLoadFailed);

        assert_eq!(
            guard().authorize(&state, RouteClass::Guarded, "/dashboard"),
            RouteDecision::AllowWithProfileWarning
        );
        assert_eq!(
            guard().authorize(&state, RouteClass::Public, "/login"),
            RouteDecision::RedirectToLanding {
                to: "/dashboard".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_transitional_states_defer_navigation() {
        // Before start: Initializing.
        let fx = stopped();
        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Initializing);
        for class in [RouteClass::Public, RouteClass::Guarded, RouteClass::Root] {
            assert_eq!(
                guard().authorize(&state, class, "/dashboard"),
                RouteDecision::Loading
            );
        }

        // Mid sign-in: Authenticating. Loading wins over any redirect.
        fx.controller.start();
        let mut rx = fx.controller.subscribe();
        settled(&mut rx).await;
        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();

        let state = fx.controller.current();
        assert_eq!(state.phase, AuthPhase::Authenticating);
        assert_eq!(
            guard().authorize(&state, RouteClass::Guarded, "/dashboard"),
            RouteDecision::Loading
        );
        assert_eq!(
            guard().authorize(&state, RouteClass::Public, "/login"),
            RouteDecision::Loading
        );
    }

    #[tokio::test]
    async fn test_root_redirect_follows_session_lifecycle() {
        let fx = started().await;

        let state = fx.controller.current();
        assert_eq!(
            guard().authorize(&state, RouteClass::Root, "/"),
            RouteDecision::RedirectToLogin {
                to: "/login".to_string(),
                return_to: None,
            }
        );

        fx.controller.sign_in(EMAIL, PASSWORD).await.unwrap();
        let mut rx = fx.controller.subscribe();
        let state = settled(&mut rx).await;
        assert_eq!(
            guard().authorize(&state, RouteClass::Root, "/"),
            RouteDecision::RedirectToLanding {
                to: "/dashboard".to_string(),
            }
        );

        fx.controller.sign_out().await.unwrap();
        let state = fx.controller.current();
        assert_eq!(
            guard().authorize(&state, RouteClass::Root, "/"),
            RouteDecision::RedirectToLogin {
                to: "/login".to_string(),
                return_to: None,
            }
        );
    }
}
