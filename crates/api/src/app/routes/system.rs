use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": if state.persistent { "postgres" } else { "memory" },
        "notifications": {
            "email": state.notifier.email_enabled(),
            "whatsapp": state.notifier.whatsapp_enabled(),
        },
    }))
}
