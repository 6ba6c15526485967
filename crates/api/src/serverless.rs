//! Adapter for function-as-a-service hosts.
//!
//! A warm instance builds the application once and reuses it. A failed build
//! is not cached, so the next invocation tries again.

use axum::body::Body;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::OnceCell;
use tower::ServiceExt;

use turfbook_infra::AppConfig;

use crate::app::build_app;

pub struct ServerlessHandler {
    config: AppConfig,
    base_path: Option<String>,
    app: OnceCell<Router>,
}

impl ServerlessHandler {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            base_path: None,
            app: OnceCell::new(),
        }
    }

    /// Strip a host-specific prefix (e.g. `/.netlify/functions/api`) before routing.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let base = base_path.into().trim_end_matches('/').to_string();
        self.base_path = (!base.is_empty()).then_some(base);
        self
    }

    pub async fn handle(&self, req: Request<Body>) -> Response {
        let app = match self
            .app
            .get_or_try_init(|| build_app(self.config.clone()))
            .await
        {
            Ok(app) => app.clone(),
            Err(e) => {
                tracing::error!(error = %e, "failed to build application state");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal Server Error - DB Connection Failed" })),
                )
                    .into_response();
            }
        };

        let req = self.strip_base_path(req);
        match app.oneshot(req).await {
            Ok(resp) => resp,
            Err(never) => match never {},
        }
    }

    fn strip_base_path(&self, mut req: Request<Body>) -> Request<Body> {
        let Some(base) = self.base_path.as_deref() else {
            return req;
        };
        let Some(rest) = req
            .uri()
            .path_and_query()
            .and_then(|pq| pq.as_str().strip_prefix(base))
        else {
            return req;
        };

        let rewritten = match rest.chars().next() {
            None | Some('?') => format!("/{rest}"),
            Some('/') => rest.to_string(),
            Some(_) => return req,
        };
        match rewritten.parse::<Uri>() {
            Ok(uri) => *req.uri_mut() = uri,
            Err(e) => tracing::warn!(error = %e, "could not rewrite request path"),
        }
        req
    }
}
