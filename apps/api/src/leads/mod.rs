//! Public lead-capture forms: consulting inquiries, recruitment
//! applications, and mandate requests. Each insert lands with status
//! `pending` and surfaces on the corresponding admin list.

pub mod handlers;

use crate::errors::AppError;

/// Rejects a missing or blank required field with a 400.
pub fn require_field(name: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} is required")));
    }
    Ok(())
}

/// Minimal shape check; real verification happens out of band.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    if trimmed.len() < 3 || !trimmed.contains('@') || trimmed.starts_with('@') || trimmed.ends_with('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field_accepts_content() {
        assert!(require_field("full_name", "Ada").is_ok());
    }

    #[test]
    fn test_require_field_rejects_blank() {
        assert!(require_field("full_name", "").is_err());
        assert!(require_field("full_name", "   ").is_err());
    }

    #[test]
    fn test_validate_email_accepts_plausible() {
        assert!(validate_email("ada@lovelace.dev").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_garbage() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@host").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("").is_err());
    }
}
