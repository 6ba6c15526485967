//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP handlers, one file per area, each split into a public
//!   and a bearer-protected router
//! - `dto.rs`: request/response bodies that are not plain domain types
//! - `errors.rs`: consistent `{"error", "message"}` responses

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Extension, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use turfbook_auth::{Hs256JwtValidator, JwtValidator, PasswordHasher, TokenIssuer};
use turfbook_infra::{AccountService, AppConfig, BookingService, Stores, TurfService};
use turfbook_notifications::NotificationService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppState {
    pub config: AppConfig,
    pub accounts: AccountService,
    pub bookings: BookingService,
    pub turfs: TurfService,
    pub notifier: NotificationService,
    pub jwt: Arc<dyn JwtValidator>,
    pub persistent: bool,
}

/// Connect the configured stores and wire the services.
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let stores = Stores::from_config(&config).await?;
    let persistent = config.wants_persistence();

    let notifier = config.notification_service();
    let issuer = TokenIssuer::new(config.jwt_secret.as_bytes());
    let jwt: Arc<dyn JwtValidator> = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));

    let accounts = AccountService::new(
        stores.users.clone(),
        PasswordHasher::with_cost(config.bcrypt_cost),
        issuer,
        notifier.clone(),
        config.frontend_url.clone(),
    )
    .with_admin_emails(config.admin_emails.clone());
    let bookings = BookingService::new(
        stores.users.clone(),
        stores.turfs.clone(),
        stores.bookings.clone(),
        notifier.clone(),
    );
    let turfs = TurfService::new(stores.turfs, stores.bookings);

    tracing::info!(
        persistent,
        email = notifier.email_enabled(),
        whatsapp = notifier.whatsapp_enabled(),
        "application state ready"
    );

    Ok(AppState {
        config,
        accounts,
        bookings,
        turfs,
        notifier,
        jwt,
        persistent,
    })
}

/// Build the HTTP router over ready state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: state.jwt.clone(),
    };
    let cors = cors_layer(&state.config.cors_origin);

    // Protected routes share paths with public ones; `merge` joins their methods.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));
    let api = routes::public_router().merge(protected);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let state = build_state(config).await?;
    Ok(build_router(Arc::new(state)))
}

/// CORS for the configured origin(s); `*` mirrors the caller since credentials are allowed.
fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin.trim() == "*" {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = o, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
