use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use turfbook_core::UserId;

use crate::app::{errors, AppState};
use crate::context::PrincipalContext;

pub fn protected() -> Router {
    Router::new().route("/users/:id", get(get_user))
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<UserId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.accounts.get_user(principal.principal(), id).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
