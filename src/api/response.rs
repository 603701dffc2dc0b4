//! HTTP mapping for [`AppError`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;

use crate::error::AppError;

pub const TOKEN_EXPIRED_HEADER: HeaderName = HeaderName::from_static("token-expired");

const INVALID_TOKEN: &str = "Invalid token";
const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream { .. } | AppError::NetworkError(_) => StatusCode::BAD_GATEWAY,
            AppError::CircuitBreakerOpen => StatusCode::SERVICE_UNAVAILABLE,
            AppError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::ConfigError(_)
            | AppError::StorageError(_)
            | AppError::CacheError(_)
            | AppError::ParseError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Validation(m) | AppError::Forbidden(m) | AppError::Conflict(m) => m.clone(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Unauthorized(reason) => {
                warn!("Rejected bearer token: {}", reason);
                INVALID_TOKEN.to_string()
            }
            AppError::TokenExpired => INVALID_TOKEN.to_string(),
            AppError::Upstream { .. } | AppError::NetworkError(_) => {
                warn!("Upstream failure: {}", self);
                "The movie service is unavailable".to_string()
            }
            AppError::CircuitBreakerOpen => {
                warn!("Request rejected while the TMDB circuit breaker is open");
                "The movie service is temporarily unavailable".to_string()
            }
            AppError::TimeoutError(_) => {
                warn!("Upstream timeout: {}", self);
                "The movie service timed out".to_string()
            }
            _ => {
                error!("❌ Request failed: {}", self);
                INTERNAL_MESSAGE.to_string()
            }
        };

        let mut response = (status, Json(json!({ "message": message }))).into_response();
        if matches!(self, AppError::TokenExpired) {
            response
                .headers_mut()
                .insert(TOKEN_EXPIRED_HEADER, HeaderValue::from_static("true"));
        }
        response
    }
}
