use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use turfbook_booking::{NewReview, NewTurf, TurfFilter, TurfPatch};
use turfbook_core::TurfId;
use turfbook_infra::services::SlotQuery;

use crate::app::{errors, AppState};
use crate::context::PrincipalContext;

pub fn public() -> Router {
    Router::new()
        .route("/turfs", get(list_turfs))
        .route("/turfs/:id", get(get_turf))
        .route("/turfs/:id/slots", get(list_slots))
}

pub fn protected() -> Router {
    Router::new()
        .route("/turfs", post(create_turf))
        .route("/turfs/:id", patch(update_turf).delete(delete_turf))
        .route("/turfs/:id/reviews", post(add_review))
}

pub async fn list_turfs(
    Extension(state): Extension<Arc<AppState>>,
    filter: Result<Query<TurfFilter>, QueryRejection>,
) -> axum::response::Response {
    let Query(filter) = match filter {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    match state.turfs.list(&filter).await {
        Ok(turfs) => Json(turfs).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_turf(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TurfId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.turfs.get(id).await {
        Ok(turf) => Json(turf).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_slots(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    query: Result<Query<SlotQuery>, QueryRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TurfId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection(rejection),
    };

    match state.turfs.slots(id, &query).await {
        Ok(slots) => Json(slots).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_turf(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<NewTurf>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.turfs.create(principal.principal(), body).await {
        Ok(turf) => (StatusCode::CREATED, Json(turf)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_turf(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<TurfPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TurfId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.turfs.update(principal.principal(), id, body).await {
        Ok(turf) => Json(turf).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_turf(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TurfId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.turfs.delete(principal.principal(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_review(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<TurfId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match state.turfs.add_review(principal.principal(), id, body).await {
        Ok(turf) => (StatusCode::CREATED, Json(turf)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
