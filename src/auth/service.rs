use log::{debug, info, warn};
use std::sync::Arc;

use super::password::{hash_password, verify_password};
use super::validators::{validate_login, validate_register, FieldError};
use super::{AuthResult, LoginRequest, RegisterRequest, TokenIssuer};
use crate::error::{AppError, Result};
use crate::storage::UserStore;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn rejected(action: &str, errors: Vec<FieldError>) -> AuthResult {
    let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
    debug!("{} rejected on fields {:?}", action, fields);
    AuthResult::failed(errors.into_iter().map(|e| e.message).collect())
}

/// Expected failures (bad input, taken email, wrong password) come back as an
/// unsuccessful [`AuthResult`]; `Err` is reserved for faults.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResult> {
        let errors = validate_register(request);
        if !errors.is_empty() {
            return Ok(rejected("register", errors));
        }

        let email = request.email.trim();
        let user_name = request
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(email);

        let password_hash = hash_password(&request.password).await?;
        let user = match self.users.create_user(email, user_name, &password_hash).await {
            Ok(user) => user,
            Err(AppError::Conflict(message)) => return Ok(AuthResult::failed(vec![message])),
            Err(e) => return Err(e),
        };

        info!("User registered successfully: {}", user.email);
        Ok(AuthResult::succeeded(self.tokens.issue(&user)?))
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResult> {
        let errors = validate_login(request);
        if !errors.is_empty() {
            return Ok(rejected("login", errors));
        }

        let user = match self.users.find_by_email(request.email.trim()).await? {
            Some(user) => user,
            None => {
                warn!("Login failed: no account for {}", request.email.trim());
                return Ok(AuthResult::failed(vec![INVALID_CREDENTIALS.to_string()]));
            }
        };

        if !verify_password(&request.password, &user.password_hash).await? {
            warn!("Login failed: wrong password for {}", user.email);
            return Ok(AuthResult::failed(vec![INVALID_CREDENTIALS.to_string()]));
        }

        info!("User logged in successfully: {}", user.email);
        Ok(AuthResult::succeeded(self.tokens.issue(&user)?))
    }
}
