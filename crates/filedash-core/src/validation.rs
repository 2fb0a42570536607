//! Client-side validation
//!
//! Input checks that run before any request is sent. Rejections surface as
//! `ClientError::Validation` and never reach the network.

use crate::error::ClientError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate the password policy: minimum length, at least one uppercase
/// letter, one lowercase letter, and one digit.
pub fn validate_password(password: &str) -> Result<(), ClientError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ClientError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ClientError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ClientError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ClientError::validation(
            "Password must contain at least one digit",
        ));
    }
    Ok(())
}

/// Validate that a new password and its confirmation match.
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ClientError> {
    if password != confirmation {
        return Err(ClientError::validation("Passwords do not match"));
    }
    Ok(())
}

/// Shallow email shape check: one `@` with a non-empty local part and a
/// domain containing a dot. Authoritative validation belongs to the backend.
pub fn validate_email(email: &str) -> Result<(), ClientError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ClientError::validation(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(())
}
