use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use turfbook_auth::permissions::NOTIFICATIONS_SEND;
use turfbook_notifications::{EmailMessage, WhatsAppMessage};

use crate::app::{dto, errors, AppState};
use crate::authz;
use crate::context::PrincipalContext;

pub fn protected() -> Router {
    Router::new()
        .route("/notifications/email", post(send_email))
        .route("/notifications/whatsapp", post(send_whatsapp))
        .route("/notifications/test-config", get(test_config))
}

pub async fn send_email(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<EmailMessage>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, &NOTIFICATIONS_SEND) {
        return resp;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return errors::notification_error_to_response(missing("to, subject, and text are required")),
    };

    match state.notifier.send_email(&body).await {
        Ok(delivery) => Json(dto::DeliveryResponse::new("Email", delivery)).into_response(),
        Err(e) => errors::notification_error_to_response(e),
    }
}

pub async fn send_whatsapp(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<WhatsAppMessage>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, &NOTIFICATIONS_SEND) {
        return resp;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return errors::notification_error_to_response(missing("to and message are required")),
    };

    match state.notifier.send_whatsapp(&body).await {
        Ok(delivery) => Json(dto::DeliveryResponse::new("WhatsApp message", delivery)).into_response(),
        Err(e) => errors::notification_error_to_response(e),
    }
}

/// Probe both providers and report which channels are usable.
pub async fn test_config(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, &NOTIFICATIONS_SEND) {
        return resp;
    }
    Json(state.notifier.verify_all().await).into_response()
}

// Bodies lacking a required field fail to deserialize; report them like an empty field.
fn missing(message: &str) -> turfbook_notifications::NotificationError {
    turfbook_notifications::NotificationError::InvalidMessage(message.to_string())
}
