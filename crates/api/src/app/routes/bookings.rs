use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use turfbook_booking::BookingRequest;
use turfbook_core::BookingId;

use crate::app::{dto, errors, AppState};
use crate::context::PrincipalContext;

pub fn protected() -> Router {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/cancel", post(cancel_booking))
        .route("/bookings/:id/status", patch(update_status))
}

pub async fn create_booking(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.bookings.create_booking(principal.principal(), body).await {
        Ok(receipt) => (StatusCode::CREATED, Json(dto::BookingCreatedResponse::from(receipt))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_bookings(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match state.bookings.list_bookings(principal.principal()).await {
        Ok(bookings) => {
            let views: Vec<dto::BookingView> = bookings.into_iter().map(Into::into).collect();
            Json(views).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_booking(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<BookingId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.bookings.get_booking(principal.principal(), id).await {
        Ok(booking) => Json(dto::BookingView::from(booking)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn cancel_booking(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<BookingId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.bookings.cancel_booking(principal.principal(), id).await {
        Ok(booking) => Json(dto::BookingView::from(booking)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::StatusUpdateRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<BookingId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.bookings.update_status(principal.principal(), id, body.status).await {
        Ok(booking) => Json(dto::BookingView::from(booking)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
