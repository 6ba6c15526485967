//! Application services: orchestration over repositories, auth and notifications.

pub mod account;
pub mod booking;
pub mod turf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use turfbook_auth::{AuthzError, PasswordError, TokenError};
use turfbook_core::DomainError;
use turfbook_notifications::NotificationError;

use crate::repository::RepositoryError;

pub use account::{AccountService, AuthSession};
pub use booking::{BookingReceipt, BookingService};
pub use turf::{SlotQuery, TurfService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Credentials were missing or wrong.
    #[error("{0}")]
    Unauthenticated(String),

    #[error("Account is temporarily locked. Try again after {until}")]
    Locked { until: DateTime<Utc> },

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::Domain(DomainError::not_found(entity))
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found("Record"),
            RepositoryError::Conflict(msg) => Self::Domain(DomainError::Conflict(msg)),
            RepositoryError::Backend(msg) => Self::Storage(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Hashing(msg) => Self::Internal(msg),
            policy => Self::Domain(DomainError::validation(policy.to_string())),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Run CPU-heavy work (bcrypt) off the async workers.
pub(crate) async fn blocking<T, F>(work: F) -> ServiceResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Internal(format!("blocking task failed: {e}")))
}
