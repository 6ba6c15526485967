//! Storage seams for users, turfs and bookings.
//!
//! Each trait has an in-memory implementation (dev/test) and, behind the
//! `postgres` feature, a Postgres one.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use turfbook_auth::UserAccount;
use turfbook_booking::{Booking, BookingDate, Turf, TurfFilter};
use turfbook_core::{BookingId, TurfId, UserId};

pub use in_memory::{InMemoryBookingRepository, InMemoryTurfRepository, InMemoryUserRepository};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresBookingRepository, PostgresTurfRepository, PostgresUserRepository};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the e-mail is already registered.
    async fn insert(&self, user: &UserAccount) -> RepoResult<()>;
    async fn update(&self, user: &UserAccount) -> RepoResult<()>;
    async fn get(&self, id: UserId) -> RepoResult<Option<UserAccount>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>>;
    async fn find_by_reset_token(&self, token_hash: &str) -> RepoResult<Option<UserAccount>>;
}

#[async_trait]
pub trait TurfRepository: Send + Sync {
    async fn insert(&self, turf: &Turf) -> RepoResult<()>;
    async fn update(&self, turf: &Turf) -> RepoResult<()>;
    async fn get(&self, id: TurfId) -> RepoResult<Option<Turf>>;
    /// Matching turfs, oldest first.
    async fn list(&self, filter: &TurfFilter) -> RepoResult<Vec<Turf>>;
    /// Returns whether a turf was removed.
    async fn delete(&self, id: TurfId) -> RepoResult<bool>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> RepoResult<()>;
    async fn update(&self, booking: &Booking) -> RepoResult<()>;
    async fn get(&self, id: BookingId) -> RepoResult<Option<Booking>>;
    /// A user's bookings, newest first.
    async fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<Booking>>;
    /// All bookings, newest first.
    async fn list_all(&self) -> RepoResult<Vec<Booking>>;
    /// Bookings at `turf_id` dated within `from..=to`.
    async fn list_for_turf(&self, turf_id: TurfId, from: BookingDate, to: BookingDate) -> RepoResult<Vec<Booking>>;
}

/// The three repositories the services run against.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub turfs: Arc<dyn TurfRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            turfs: Arc::new(InMemoryTurfRepository::new()),
            bookings: Arc::new(InMemoryBookingRepository::new()),
        }
    }

    /// Connect to Postgres and make sure the schema exists.
    #[cfg(feature = "postgres")]
    pub async fn postgres(database_url: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        postgres::migrate(&pool).await.context("failed to apply schema")?;

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            turfs: Arc::new(PostgresTurfRepository::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepository::new(pool)),
        })
    }

    /// Stores selected by configuration.
    pub async fn from_config(config: &crate::config::AppConfig) -> anyhow::Result<Self> {
        if !config.wants_persistence() {
            return Ok(Self::in_memory());
        }
        let Some(url) = config.database_url.as_deref() else {
            anyhow::bail!("USE_PERSISTENT_STORES=true requires DATABASE_URL");
        };
        #[cfg(feature = "postgres")]
        {
            Self::postgres(url).await
        }
        #[cfg(not(feature = "postgres"))]
        {
            let _ = url;
            tracing::warn!("persistent stores requested but the postgres feature is not enabled; falling back to in-memory");
            Ok(Self::in_memory())
        }
    }
}
