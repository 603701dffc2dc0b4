//! Registration, login and bearer tokens.

pub mod password;
pub mod service;
pub mod tokens;
pub mod validators;

pub use service::AuthService;
pub use tokens::{Claims, TokenIssuer};
pub use validators::FieldError;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Defaults to the email when absent
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub success: bool,
    pub token: Option<String>,
    pub errors: Vec<String>,
}

impl AuthResult {
    pub fn succeeded(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            token: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_request_tolerates_missing_fields() {
        let request: RegisterRequest =
            serde_json::from_value(json!({ "email": "a@b.co", "confirmPassword": "x" })).unwrap();
        assert_eq!(request.email, "a@b.co");
        assert_eq!(request.password, "");
        assert_eq!(request.confirm_password, "x");
        assert!(request.user_name.is_none());
    }

    #[test]
    fn test_failed_result_has_null_token() {
        let value = serde_json::to_value(AuthResult::failed(vec!["nope".to_string()])).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "token": null, "errors": ["nope"] })
        );
    }
}
