pub mod accounts;
pub mod handlers;
pub mod password;
pub mod session;

use axum::http::StatusCode;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Sign-in failures reported to the dashboard. `code` is the stable
/// identifier the front-end switches on; the message is shown as-is.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("An account already exists with this email")]
    EmailAlreadyInUse,

    #[error("No account found with this email")]
    UserNotFound,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("This reset link is invalid or has expired")]
    InvalidActionCode,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::WeakPassword => "auth/weak-password",
            AuthError::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::WrongPassword => "auth/wrong-password",
            AuthError::UserDisabled => "auth/user-disabled",
            AuthError::InvalidActionCode => "auth/invalid-action-code",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidEmail | AuthError::WeakPassword | AuthError::InvalidActionCode => {
                StatusCode::BAD_REQUEST
            }
            AuthError::EmailAlreadyInUse => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::UserDisabled => StatusCode::FORBIDDEN,
        }
    }
}

/// Loose shape check: something@something.something, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1,
        None => false,
    }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}
