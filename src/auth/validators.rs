use once_cell::sync::Lazy;
use regex::Regex;

use super::{LoginRequest, RegisterRequest};

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_register(request: &RegisterRequest) -> Vec<FieldError> {
    let mut errors = validate_email(&request.email);

    let password = &request.password;
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else {
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("password", "Password must contain at least one digit"));
        }
        if !password.chars().any(char::is_lowercase) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one lowercase letter",
            ));
        }
        if !password.chars().any(char::is_uppercase) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one uppercase letter",
            ));
        }
        if password.chars().all(char::is_alphanumeric) {
            errors.push(FieldError::new(
                "password",
                "Password must contain at least one non-alphanumeric character",
            ));
        }
    }

    if request.confirm_password != request.password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    errors
}

pub fn validate_login(request: &LoginRequest) -> Vec<FieldError> {
    let mut errors = validate_email(&request.email);
    if request.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    errors
}

fn validate_email(email: &str) -> Vec<FieldError> {
    let email = email.trim();
    if email.is_empty() {
        vec![FieldError::new("email", "Email is required")]
    } else if !EMAIL_RE.is_match(email) {
        vec![FieldError::new("email", "Email is not a valid email address")]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            user_name: None,
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_register(&register("test@example.com", "ValidPass123!", "ValidPass123!")).is_empty());
    }

    #[test]
    fn test_weak_passwords_rejected() {
        for password in [
            "",
            "short",
            "no-upper-123!",
            "NO-LOWER-123!",
            "NoSpecialChar123",
            "NoNumbers!!",
        ] {
            let errors = validate_register(&register("test@example.com", password, password));
            assert!(
                fields(&errors).contains(&"password"),
                "expected password error for {:?}",
                password
            );
        }
    }

    #[test]
    fn test_password_mismatch() {
        let errors = validate_register(&register("test@example.com", "ValidPass123!", "DifferentPass123!"));
        assert_eq!(fields(&errors), vec!["confirmPassword"]);
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "invalid-email", "test@", "@test.com", "a b@c.de"] {
            let errors = validate_login(&LoginRequest {
                email: email.to_string(),
                password: "ValidPass123!".to_string(),
            });
            assert_eq!(fields(&errors), vec!["email"], "email {:?}", email);
        }
    }

    #[test]
    fn test_login_requires_password() {
        let errors = validate_login(&LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        });
        assert_eq!(errors[0].message, "Password is required");
    }
}
