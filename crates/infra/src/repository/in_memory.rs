use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use turfbook_auth::UserAccount;
use turfbook_booking::{Booking, BookingDate, Turf, TurfFilter};
use turfbook_core::{BookingId, TurfId, UserId};

use super::{BookingRepository, RepoResult, RepositoryError, TurfRepository, UserRepository};

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("lock poisoned".to_string())
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &UserAccount) -> RepoResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!("email {} already registered", user.email)));
        }
        map.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &UserAccount) -> RepoResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get(&self, id: UserId) -> RepoResult<Option<UserAccount>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserAccount>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> RepoResult<Option<UserAccount>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }
}

/// In-memory turf store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryTurfRepository {
    inner: RwLock<HashMap<TurfId, Turf>>,
}

impl InMemoryTurfRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TurfRepository for InMemoryTurfRepository {
    async fn insert(&self, turf: &Turf) -> RepoResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(turf.id, turf.clone());
        Ok(())
    }

    async fn update(&self, turf: &Turf) -> RepoResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&turf.id) {
            Some(slot) => {
                *slot = turf.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get(&self, id: TurfId) -> RepoResult<Option<Turf>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self, filter: &TurfFilter) -> RepoResult<Vec<Turf>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut turfs: Vec<Turf> = map.values().filter(|t| t.matches(filter)).cloned().collect();
        turfs.sort_by_key(|t| (t.created_at, t.id));
        Ok(turfs)
    }

    async fn delete(&self, id: TurfId) -> RepoResult<bool> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}

/// In-memory booking store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBookingRepository {
    inner: RwLock<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect(&self, keep: impl Fn(&Booking) -> bool) -> RepoResult<Vec<Booking>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut out: Vec<Booking> = map.values().filter(|b| keep(b)).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> RepoResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> RepoResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&booking.id) {
            Some(slot) => {
                *slot = booking.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get(&self, id: BookingId) -> RepoResult<Option<Booking>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<Booking>> {
        self.collect(|b| b.user_id == user_id)
    }

    async fn list_all(&self) -> RepoResult<Vec<Booking>> {
        self.collect(|_| true)
    }

    async fn list_for_turf(&self, turf_id: TurfId, from: BookingDate, to: BookingDate) -> RepoResult<Vec<Booking>> {
        self.collect(|b| b.turf_id == turf_id && b.date >= from && b.date <= to)
    }
}
