use axum::Router;

pub mod auth;
pub mod bookings;
pub mod notifications;
pub mod system;
pub mod turfs;
pub mod users;

/// Routes reachable without a token (mounted under `/api`).
pub fn public_router() -> Router {
    Router::new().merge(auth::public()).merge(turfs::public())
}

/// Routes that require a bearer token (mounted under `/api`).
pub fn protected_router() -> Router {
    Router::new()
        .merge(auth::protected())
        .merge(users::protected())
        .merge(turfs::protected())
        .merge(bookings::protected())
        .merge(notifications::protected())
}
