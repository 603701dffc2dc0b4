use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use log::{error, warn};

use super::AppState;
use crate::auth::{AuthResult, LoginRequest, RegisterRequest};
use crate::error::Result;

pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> (StatusCode, Json<AuthResult>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed("registration", rejection),
    };
    respond(
        "registration",
        &request.email,
        state.auth.register(&request).await,
    )
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<AuthResult>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed("login", rejection),
    };
    respond("login", &request.email, state.auth.login(&request).await)
}

fn malformed(action: &str, rejection: JsonRejection) -> (StatusCode, Json<AuthResult>) {
    warn!("Unreadable {} request: {}", action, rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(AuthResult::failed(vec![rejection.body_text()])),
    )
}

/// The body is an `AuthResult` for every outcome, including faults.
fn respond(action: &str, email: &str, outcome: Result<AuthResult>) -> (StatusCode, Json<AuthResult>) {
    match outcome {
        Ok(result) if result.success => (StatusCode::OK, Json(result)),
        Ok(result) => {
            warn!("{} failed for {}: {}", action, email, result.errors.join(", "));
            (StatusCode::BAD_REQUEST, Json(result))
        }
        Err(e) => {
            error!("❌ Error during {} for {}: {}", action, email, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AuthResult::failed(vec![format!(
                    "An error occurred during {}",
                    action
                )])),
            )
        }
    }
}
