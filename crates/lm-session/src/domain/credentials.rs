//! # Credential Validation
//!
//! Syntactic checks applied before any collaborator is called. Anything the
//! provider itself enforces (duplicate email, account lockout) is NOT checked
//! here; the provider's verdict is authoritative for those.

use shared_types::AuthError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validated sign-in credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Validate and normalize raw form input.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` with a user-displayable message when the
    /// email is not syntactically plausible or the password is too short.
    pub fn parse(email: &str, password: &str) -> Result<Self, AuthError> {
        let email = normalize_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }
}

/// Validated sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl NewAccount {
    /// Validate and normalize sign-up form input.
    ///
    /// An empty display name is treated as absent rather than rejected; the
    /// profile row is provisioned without one.
    pub fn parse(
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Self, AuthError> {
        let credentials = Credentials::parse(email, password)?;
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(Self {
            email: credentials.email,
            password: credentials.password,
            display_name,
        })
    }
}

/// Validate a bare email (password-reset flow).
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    let plausible = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !plausible {
        return Err(AuthError::Validation(
            "Enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}

/// Validate a new password (password-update flow).
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
