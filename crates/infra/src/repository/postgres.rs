//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | `RepositoryError` |
//! |------------|-----------------|-------------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Backend` |
//! | PoolClosed / IO / decode | n/a | `Backend` |
//!
//! Collections (amenities, reviews, preferences) are stored as `jsonb`;
//! times of day as `HH:mm` text.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use turfbook_auth::{NotificationPreferences, Role, UserAccount};
use turfbook_booking::{
    Address, Booking, BookingDate, BookingStatus, OpenHours, Review, TimeOfDay, Turf, TurfFilter,
};
use turfbook_core::{BookingId, TurfId, UserId};

use super::{BookingRepository, RepoResult, RepositoryError, TurfRepository, UserRepository};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id                       UUID PRIMARY KEY,
        name                     TEXT NOT NULL,
        email                    TEXT NOT NULL UNIQUE,
        password_hash            TEXT NOT NULL,
        phone                    TEXT NULL,
        role                     TEXT NOT NULL DEFAULT 'user',
        avatar_url               TEXT NULL,
        favorite_sports          JSONB NOT NULL DEFAULT '[]',
        preferred_locations      JSONB NOT NULL DEFAULT '[]',
        notification_preferences JSONB NOT NULL,
        login_attempts           INTEGER NOT NULL DEFAULT 0,
        lock_until               TIMESTAMPTZ NULL,
        last_login               TIMESTAMPTZ NULL,
        reset_token_hash         TEXT NULL,
        reset_expires            TIMESTAMPTZ NULL,
        created_at               TIMESTAMPTZ NOT NULL,
        updated_at               TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS users_reset_token_idx ON users (reset_token_hash)",
    r#"
    CREATE TABLE IF NOT EXISTS turfs (
        id              UUID PRIMARY KEY,
        name            TEXT NOT NULL,
        description     TEXT NOT NULL,
        address         JSONB NOT NULL,
        contact_number  TEXT NOT NULL,
        email           TEXT NOT NULL,
        price_per_hour  DOUBLE PRECISION NOT NULL CHECK (price_per_hour > 0),
        amenities       JSONB NOT NULL DEFAULT '[]',
        sports          JSONB NOT NULL DEFAULT '[]',
        images          JSONB NOT NULL DEFAULT '[]',
        open_from       TEXT NOT NULL,
        open_to         TEXT NOT NULL,
        rating          DOUBLE PRECISION NOT NULL DEFAULT 0,
        reviews         JSONB NOT NULL DEFAULT '[]',
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id           UUID PRIMARY KEY,
        user_id      UUID NOT NULL,
        turf_id      UUID NOT NULL,
        turf_name    TEXT NOT NULL,
        booking_date DATE NOT NULL,
        start_time   TEXT NOT NULL,
        end_time     TEXT NOT NULL,
        total_price  DOUBLE PRECISION NOT NULL,
        status       TEXT NOT NULL DEFAULT 'pending',
        created_at   TIMESTAMPTZ NOT NULL,
        updated_at   TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS bookings_user_idx ON bookings (user_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS bookings_turf_date_idx ON bookings (turf_id, booking_date)",
];

/// Create tables and indexes if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Conflict(msg),
                _ => RepositoryError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => RepositoryError::Backend(format!("connection pool closed in {}", operation)),
        _ => RepositoryError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

fn decode_error(what: &str, err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Decode(format!("invalid {what}: {err}").into())
}

// ---- users ----

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, role, avatar_url, favorite_sports, \
     preferred_locations, notification_preferences, login_attempts, lock_until, last_login, \
     reset_token_hash, reset_expires, created_at, updated_at";

fn user_from_row(row: &PgRow) -> Result<UserAccount, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let attempts: i32 = row.try_get("login_attempts")?;
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        phone: row.try_get("phone")?,
        role: role.parse::<Role>().map_err(|e| decode_error("role", e))?,
        avatar_url: row.try_get("avatar_url")?,
        favorite_sports: row.try_get::<Json<Vec<String>>, _>("favorite_sports")?.0,
        preferred_locations: row.try_get::<Json<Vec<String>>, _>("preferred_locations")?.0,
        notification_preferences: row
            .try_get::<Json<NotificationPreferences>, _>("notification_preferences")?
            .0,
        login_attempts: u32::try_from(attempts).unwrap_or(0),
        lock_until: row.try_get("lock_until")?,
        last_login: row.try_get("last_login")?,
        reset_token_hash: row.try_get("reset_token_hash")?,
        reset_expires: row.try_get("reset_expires")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: &UserAccount) -> RepoResult<()> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.avatar_url)
        .bind(Json(&user.favorite_sports))
        .bind(Json(&user.preferred_locations))
        .bind(Json(user.notification_preferences))
        .bind(i32::try_from(user.login_attempts).unwrap_or(i32::MAX))
        .bind(user.lock_until)
        .bind(user.last_login)
        .bind(&user.reset_token_hash)
        .bind(user.reset_expires)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update(&self, user: &UserAccount) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2, email = $3, password_hash = $4, phone = $5, role = $6, avatar_url = $7,
                favorite_sports = $8, preferred_locations = $9, notification_preferences = $10,
                login_attempts = $11, lock_until = $12, last_login = $13,
                reset_token_hash = $14, reset_expires = $15, updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.avatar_url)
        .bind(Json(&user.favorite_sports))
        .bind(Json(&user.preferred_locations))
        .bind(Json(user.notification_preferences))
        .bind(i32::try_from(user.login_attempts).unwrap_or(i32::MAX))
        .bind(user.lock_until)
        .bind(user.last_login)
        .bind(&user.reset_token_hash)
        .bind(user.reset_expires)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: UserId) -> RepoResult<Option<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.fetch_optional(sqlx::query(&sql).bind(id.as_uuid()), "get_user").await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.fetch_optional(sqlx::query(&sql).bind(email), "find_user_by_email").await
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> RepoResult<Option<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = $1");
        self.fetch_optional(sqlx::query(&sql).bind(token_hash), "find_user_by_reset_token")
            .await
    }
}

impl PostgresUserRepository {
    async fn fetch_optional(&self, query: PgQuery<'_>, operation: &str) -> RepoResult<Option<UserAccount>> {
        let row = query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.map(|r| user_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

// ---- turfs ----

#[derive(Debug, Clone)]
pub struct PostgresTurfRepository {
    pool: Arc<PgPool>,
}

impl PostgresTurfRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

const TURF_COLUMNS: &str = "id, name, description, address, contact_number, email, price_per_hour, amenities, \
     sports, images, open_from, open_to, rating, reviews, created_at, updated_at";

fn time_column(row: &PgRow, column: &str) -> Result<TimeOfDay, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    TimeOfDay::parse(&raw).map_err(|e| decode_error(column, e))
}

fn turf_from_row(row: &PgRow) -> Result<Turf, sqlx::Error> {
    Ok(Turf {
        id: TurfId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        address: row.try_get::<Json<Address>, _>("address")?.0,
        contact_number: row.try_get("contact_number")?,
        email: row.try_get("email")?,
        price_per_hour: row.try_get("price_per_hour")?,
        amenities: row.try_get::<Json<Vec<String>>, _>("amenities")?.0,
        sports: row.try_get::<Json<Vec<String>>, _>("sports")?.0,
        images: row.try_get::<Json<Vec<String>>, _>("images")?.0,
        open_hours: OpenHours {
            from: time_column(row, "open_from")?,
            to: time_column(row, "open_to")?,
        },
        rating: row.try_get("rating")?,
        reviews: row.try_get::<Json<Vec<Review>>, _>("reviews")?.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TurfRepository for PostgresTurfRepository {
    #[instrument(skip(self, turf), fields(turf_id = %turf.id), err)]
    async fn insert(&self, turf: &Turf) -> RepoResult<()> {
        sqlx::query(&format!(
            "INSERT INTO turfs ({TURF_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(turf.id.as_uuid())
        .bind(&turf.name)
        .bind(&turf.description)
        .bind(Json(&turf.address))
        .bind(&turf.contact_number)
        .bind(&turf.email)
        .bind(turf.price_per_hour)
        .bind(Json(&turf.amenities))
        .bind(Json(&turf.sports))
        .bind(Json(&turf.images))
        .bind(turf.open_hours.from.to_string())
        .bind(turf.open_hours.to.to_string())
        .bind(turf.rating)
        .bind(Json(&turf.reviews))
        .bind(turf.created_at)
        .bind(turf.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_turf", e))?;
        Ok(())
    }

    #[instrument(skip(self, turf), fields(turf_id = %turf.id), err)]
    async fn update(&self, turf: &Turf) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE turfs SET
                name = $2, description = $3, address = $4, contact_number = $5, email = $6,
                price_per_hour = $7, amenities = $8, sports = $9, images = $10,
                open_from = $11, open_to = $12, rating = $13, reviews = $14, updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(turf.id.as_uuid())
        .bind(&turf.name)
        .bind(&turf.description)
        .bind(Json(&turf.address))
        .bind(&turf.contact_number)
        .bind(&turf.email)
        .bind(turf.price_per_hour)
        .bind(Json(&turf.amenities))
        .bind(Json(&turf.sports))
        .bind(Json(&turf.images))
        .bind(turf.open_hours.from.to_string())
        .bind(turf.open_hours.to.to_string())
        .bind(turf.rating)
        .bind(Json(&turf.reviews))
        .bind(turf.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_turf", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: TurfId) -> RepoResult<Option<Turf>> {
        let row = sqlx::query(&format!("SELECT {TURF_COLUMNS} FROM turfs WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_turf", e))?;
        row.map(|r| turf_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_turf", e))
    }

    #[instrument(skip(self), err)]
    async fn list(&self, filter: &TurfFilter) -> RepoResult<Vec<Turf>> {
        // City and price narrow in SQL; `Turf::matches` applies the full filter.
        let rows = sqlx::query(&format!(
            "SELECT {TURF_COLUMNS} FROM turfs \
             WHERE ($1::text IS NULL OR lower(address->>'city') = lower($1)) \
               AND ($2::double precision IS NULL OR price_per_hour <= $2) \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(filter.city.as_deref().map(str::trim).filter(|c| !c.is_empty()))
        .bind(filter.max_price)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_turfs", e))?;

        let mut turfs = Vec::with_capacity(rows.len());
        for row in rows {
            let turf = turf_from_row(&row).map_err(|e| map_sqlx_error("list_turfs", e))?;
            if turf.matches(filter) {
                turfs.push(turf);
            }
        }
        Ok(turfs)
    }

    async fn delete(&self, id: TurfId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM turfs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_turf", e))?;
        Ok(result.rows_affected() > 0)
    }
}

// ---- bookings ----

#[derive(Debug, Clone)]
pub struct PostgresBookingRepository {
    pool: Arc<PgPool>,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    async fn fetch_many(&self, query: PgQuery<'_>, operation: &str) -> RepoResult<Vec<Booking>> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter()
            .map(booking_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

const BOOKING_COLUMNS: &str =
    "id, user_id, turf_id, turf_name, booking_date, start_time, end_time, total_price, status, created_at, updated_at";

fn booking_from_row(row: &PgRow) -> Result<Booking, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let date: NaiveDate = row.try_get("booking_date")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        turf_id: TurfId::from_uuid(row.try_get("turf_id")?),
        turf_name: row.try_get("turf_name")?,
        date: BookingDate::from_naive(date),
        start_time: time_column(row, "start_time")?,
        end_time: time_column(row, "end_time")?,
        total_price: row.try_get("total_price")?,
        status: status.parse::<BookingStatus>().map_err(|e| decode_error("status", e))?,
        created_at,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id), err)]
    async fn insert(&self, booking: &Booking) -> RepoResult<()> {
        sqlx::query(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(booking.id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.turf_id.as_uuid())
        .bind(&booking.turf_name)
        .bind(booking.date.as_naive())
        .bind(booking.start_time.to_string())
        .bind(booking.end_time.to_string())
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_booking", e))?;
        Ok(())
    }

    #[instrument(skip(self, booking), fields(booking_id = %booking.id), err)]
    async fn update(&self, booking: &Booking) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                turf_name = $2, booking_date = $3, start_time = $4, end_time = $5,
                total_price = $6, status = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(&booking.turf_name)
        .bind(booking.date.as_naive())
        .bind(booking.start_time.to_string())
        .bind(booking.end_time.to_string())
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_booking", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: BookingId) -> RepoResult<Option<Booking>> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_booking", e))?;
        row.map(|r| booking_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_booking", e))
    }

    async fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, id DESC");
        self.fetch_many(sqlx::query(&sql).bind(user_id.as_uuid()), "list_bookings_for_user")
            .await
    }

    async fn list_all(&self) -> RepoResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id DESC");
        self.fetch_many(sqlx::query(&sql), "list_bookings").await
    }

    async fn list_for_turf(&self, turf_id: TurfId, from: BookingDate, to: BookingDate) -> RepoResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE turf_id = $1 AND booking_date BETWEEN $2 AND $3 \
             ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(
            sqlx::query(&sql)
                .bind(turf_id.as_uuid())
                .bind(from.as_naive())
                .bind(to.as_naive()),
            "list_bookings_for_turf",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_map_to_backend() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolClosed),
            RepositoryError::Backend(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::RowNotFound),
            RepositoryError::Backend(_)
        ));
    }

    use chrono::SubsecRound;
    use turfbook_auth::NewUser;
    use turfbook_booking::{BookingRequest, NewReview, NewTurf};

    /// Pool for the database named by `TURFBOOK_TEST_DATABASE_URL`; tests skip when it is unset.
    async fn test_pool() -> Option<PgPool> {
        let url = std::env::var("TURFBOOK_TEST_DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("connect to test database");
        migrate(&pool).await.expect("apply schema");
        Some(pool)
    }

    fn new_turf() -> NewTurf {
        NewTurf {
            name: "Night Owl Arena".into(),
            description: "Box cricket".into(),
            address: Address {
                street: "4 Ring Road".into(),
                city: "Pune".into(),
                state: "Maharashtra".into(),
                pincode: "411001".into(),
            },
            contact_number: "+919800000000".into(),
            email: "owl@turfbook.in".into(),
            price_per_hour: 900.0,
            amenities: vec!["Parking".into()],
            sports: vec!["cricket".into()],
            images: Vec::new(),
            open_hours: OpenHours {
                from: TimeOfDay::parse("06:30").unwrap(),
                to: TimeOfDay::parse("22:00").unwrap(),
            },
        }
    }

    #[tokio::test]
    async fn rows_round_trip_through_postgres() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let users = PostgresUserRepository::new(pool.clone());
        let turfs = PostgresTurfRepository::new(pool.clone());
        let bookings = PostgresBookingRepository::new(pool);
        let now = Utc::now().trunc_subsecs(6);

        let input = NewUser {
            name: "Round Trip".into(),
            email: format!("rt-{}@example.com", UserId::new()),
            password: "Str0ng!Pass".into(),
            phone: None,
        };
        let user = UserAccount::create(input, "hash".into(), Role::User, now);
        users.insert(&user).await.unwrap();
        assert!(matches!(users.insert(&user).await, Err(RepositoryError::Conflict(_))));
        let loaded = users.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.notification_preferences, user.notification_preferences);

        let mut turf = Turf::create(new_turf(), now).unwrap();
        turf.add_review(
            user.id,
            NewReview {
                rating: 4,
                comment: Some("Good pitch".into()),
            },
            now,
        )
        .unwrap();
        turfs.insert(&turf).await.unwrap();
        let loaded = turfs.get(turf.id).await.unwrap().unwrap();
        assert_eq!(loaded.open_hours, turf.open_hours);
        assert_eq!(loaded.open_hours.from.to_string(), "06:30");
        assert_eq!(loaded.address, turf.address);
        assert_eq!(loaded.reviews, turf.reviews);
        assert_eq!(loaded.rating, 4.0);

        let request = BookingRequest {
            turf_id: turf.id,
            user_id: None,
            date: "2031-01-15".into(),
            start_time: "07:00".into(),
            end_time: "08:30".into(),
            total_price: None,
            email: None,
        };
        let booking = Booking::prepare(&request, &turf, user.id, now).unwrap();
        bookings.insert(&booking).await.unwrap();
        let day = BookingDate::parse("2031-01-15").unwrap();
        let found = bookings.list_for_turf(turf.id, day, day).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_time.to_string(), "07:00");
        assert_eq!(found[0].end_time.to_string(), "08:30");
        assert_eq!(found[0].date, day);
        assert_eq!(found[0].total_price, 1350.0);
        assert_eq!(found[0].status, BookingStatus::Pending);
    }

    #[test]
    fn schema_creates_all_tables() {
        let joined = SCHEMA.join("\n");
        for table in ["users", "turfs", "bookings"] {
            assert!(joined.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")));
        }
    }
}
