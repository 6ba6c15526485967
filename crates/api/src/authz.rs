//! API-side authorization guard for endpoints that are not backed by a service check.

use axum::http::StatusCode;
use axum::response::Response;

use turfbook_auth::{authorize, Permission};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Check that the caller holds `permission`, rendering a 403 otherwise.
pub fn require(principal: &PrincipalContext, permission: &Permission) -> Result<(), Response> {
    authorize(principal.principal(), permission)
        .map_err(|e| json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}
