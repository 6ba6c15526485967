use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use turfbook_auth::NewUser;

use crate::app::{dto, errors, AppState};
use crate::context::PrincipalContext;

pub fn public() -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/reset-password", post(request_password_reset))
        .route("/auth/reset-password/:token", post(reset_password))
}

pub fn protected() -> Router {
    Router::new().route("/auth/me", get(me))
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.accounts.register(body).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.accounts.login(&body.email, &body.password).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match state.accounts.me(principal.principal()).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn request_password_reset(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<dto::PasswordResetRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.accounts.request_password_reset(&body.email).await {
        Ok(()) => Json(dto::MessageResponse::new("Password reset email sent successfully.")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn reset_password(
    Extension(state): Extension<Arc<AppState>>,
    Path(token): Path<String>,
    body: Result<Json<dto::NewPasswordRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.accounts.reset_password(&token, &body.password).await {
        Ok(()) => Json(dto::MessageResponse::new("Password reset successfully.")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
