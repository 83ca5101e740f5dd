//! # Runtime Configuration
//!
//! Unified configuration for the auth runtime: route policy and the demo
//! account seed, with environment overrides.

use lm_route_guard::RoutePolicy;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Navigation policy.
    pub routes: RouteConfig,
    /// Demo account seeded into the in-memory provider.
    pub demo: DemoConfig,
}

impl RuntimeConfig {
    /// Load defaults, then apply `LM_*` environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("LM_LOGIN_PATH") {
            config.routes.login_path = path;
        }
        if let Ok(path) = std::env::var("LM_LANDING_PATH") {
            config.routes.landing_path = path;
        }
        if let Ok(email) = std::env::var("LM_DEMO_EMAIL") {
            config.demo.email = email;
        }
        if let Ok(password) = std::env::var("LM_DEMO_PASSWORD") {
            config.demo.password = password;
        }
        config
    }
}

/// Route policy configuration.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Where unauthenticated visitors are sent.
    pub login_path: String,
    /// Default landing page after sign-in.
    pub landing_path: String,
}

impl RouteConfig {
    #[must_use]
    pub fn policy(&self) -> RoutePolicy {
        RoutePolicy {
            login_path: self.login_path.clone(),
            landing_path: self.landing_path.clone(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
        }
    }
}

/// Demo account configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            email: "student@launchmasters.dev".to_string(),
            password: "correct-horse".to_string(),
            display_name: "Demo Student".to_string(),
        }
    }
}
