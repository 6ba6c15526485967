use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use turfbook_core::DomainError;
use turfbook_infra::ServiceError;
use turfbook_notifications::NotificationError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        ServiceError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
        e @ ServiceError::Locked { .. } => json_error(StatusCode::LOCKED, "account_locked", e.to_string()),
        ServiceError::Notification(e) => notification_error_to_response(e),
        ServiceError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Server error")
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Server error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        e @ DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn notification_error_to_response(err: NotificationError) -> axum::response::Response {
    match err {
        NotificationError::InvalidMessage(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        other => json_error(StatusCode::BAD_GATEWAY, "notification_error", other.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Render a body that failed to deserialize as a 400 in the usual error shape.
pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

/// Render a query string that failed to deserialize as a 400 in the usual error shape.
pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

/// Parse a path id (`UserId`, `TurfId`, `BookingId`), answering 400 on garbage.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use turfbook_auth::AuthzError;
    use turfbook_core::BookingId;

    fn status(err: ServiceError) -> StatusCode {
        service_error_to_response(err).status()
    }

    #[test]
    fn maps_service_errors_to_statuses() {
        assert_eq!(status(DomainError::validation("bad").into()), StatusCode::BAD_REQUEST);
        assert_eq!(status(ServiceError::not_found("Turf")), StatusCode::NOT_FOUND);
        assert_eq!(status(DomainError::conflict("dup").into()), StatusCode::CONFLICT);
        assert_eq!(status(DomainError::invariant("no").into()), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(AuthzError::NotOwner.into()), StatusCode::FORBIDDEN);
        assert_eq!(status(ServiceError::Unauthenticated("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(ServiceError::Locked { until: Utc::now() }), StatusCode::LOCKED);
        assert_eq!(
            status(NotificationError::Provider { status: 500, body: "boom".into() }.into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(NotificationError::InvalidMessage("to and message are required".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(ServiceError::Storage("down".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_path_ids_are_400() {
        let err = parse_id::<BookingId>("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(parse_id::<BookingId>(&BookingId::new().to_string()).is_ok());
    }
}
