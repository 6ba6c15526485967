use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::instrument;

use turfbook_auth::permissions::{TURFS_MANAGE, TURFS_REVIEW};
use turfbook_auth::{authorize, Principal};
use turfbook_booking::{
    generate_slots, BookingDate, NewReview, NewTurf, Slot, Turf, TurfFilter, TurfPatch, DEFAULT_SLOT_DAYS,
    MAX_SLOT_DAYS,
};
use turfbook_core::TurfId;

use super::{ServiceError, ServiceResult};
use crate::repository::{BookingRepository, TurfRepository};

/// Availability window; defaults to today and [`DEFAULT_SLOT_DAYS`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotQuery {
    pub from: Option<String>,
    pub days: Option<u32>,
}

#[derive(Clone)]
pub struct TurfService {
    turfs: Arc<dyn TurfRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl TurfService {
    pub fn new(turfs: Arc<dyn TurfRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { turfs, bookings }
    }

    pub async fn list(&self, filter: &TurfFilter) -> ServiceResult<Vec<Turf>> {
        Ok(self.turfs.list(filter).await?)
    }

    pub async fn get(&self, id: TurfId) -> ServiceResult<Turf> {
        self.turfs.get(id).await?.ok_or_else(|| ServiceError::not_found("Turf"))
    }

    #[instrument(skip(self, principal, input), fields(user_id = %principal.user_id))]
    pub async fn create(&self, principal: &Principal, input: NewTurf) -> ServiceResult<Turf> {
        authorize(principal, &TURFS_MANAGE)?;
        let turf = Turf::create(input, Utc::now())?;
        self.turfs.insert(&turf).await?;
        tracing::info!(turf_id = %turf.id, "turf created");
        Ok(turf)
    }

    #[instrument(skip(self, principal, patch), fields(user_id = %principal.user_id))]
    pub async fn update(&self, principal: &Principal, id: TurfId, patch: TurfPatch) -> ServiceResult<Turf> {
        authorize(principal, &TURFS_MANAGE)?;
        let mut turf = self.get(id).await?;
        turf.apply(patch, Utc::now())?;
        self.turfs.update(&turf).await?;
        Ok(turf)
    }

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn delete(&self, principal: &Principal, id: TurfId) -> ServiceResult<()> {
        authorize(principal, &TURFS_MANAGE)?;
        if !self.turfs.delete(id).await? {
            return Err(ServiceError::not_found("Turf"));
        }
        tracing::info!(turf_id = %id, "turf deleted");
        Ok(())
    }

    pub async fn add_review(&self, principal: &Principal, id: TurfId, review: NewReview) -> ServiceResult<Turf> {
        authorize(principal, &TURFS_REVIEW)?;
        let mut turf = self.get(id).await?;
        turf.add_review(principal.user_id, review, Utc::now())?;
        self.turfs.update(&turf).await?;
        Ok(turf)
    }

    /// Hourly slots for the requested window, flagged where already booked.
    pub async fn slots(&self, id: TurfId, query: &SlotQuery) -> ServiceResult<Vec<Slot>> {
        let turf = self.get(id).await?;
        let from = match query.from.as_deref() {
            Some(raw) => BookingDate::parse(raw)?,
            None => BookingDate::from_naive(Utc::now().date_naive()),
        };
        let days = query.days.unwrap_or(DEFAULT_SLOT_DAYS).clamp(1, MAX_SLOT_DAYS);
        let to = from
            .as_naive()
            .checked_add_signed(Duration::days(i64::from(days) - 1))
            .map(BookingDate::from_naive)
            .unwrap_or(from);

        let bookings = self.bookings.list_for_turf(id, from, to).await?;
        Ok(generate_slots(&turf, from, days, &bookings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Stores;
    use turfbook_auth::Role;
    use turfbook_booking::{Address, OpenHours, TimeOfDay};
    use turfbook_core::{DomainError, UserId};

    fn new_turf(city: &str, price: f64) -> NewTurf {
        NewTurf {
            name: format!("{city} Arena"),
            description: "Floodlit five-a-side".into(),
            address: Address {
                street: "1 Main Road".into(),
                city: city.into(),
                state: "State".into(),
                pincode: "000001".into(),
            },
            contact_number: "+911234567890".into(),
            email: "owner@arena.in".into(),
            price_per_hour: price,
            amenities: vec![],
            sports: vec!["Football".into()],
            images: vec![],
            open_hours: OpenHours {
                from: TimeOfDay::parse("08:00").unwrap(),
                to: TimeOfDay::parse("12:00").unwrap(),
            },
        }
    }

    fn service() -> TurfService {
        let stores = Stores::in_memory();
        TurfService::new(stores.turfs, stores.bookings)
    }

    #[tokio::test]
    async fn only_admins_manage_turfs() {
        let svc = service();
        let user = Principal::new(UserId::new(), Role::User);
        let err = svc.create(&user, new_turf("Pune", 800.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let admin = Principal::new(UserId::new(), Role::Admin);
        let turf = svc.create(&admin, new_turf("Pune", 800.0)).await.unwrap();
        let patched = svc
            .update(
                &admin,
                turf.id,
                TurfPatch {
                    price_per_hour: Some(900.0),
                    ..TurfPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.price_per_hour, 900.0);

        svc.delete(&admin, turf.id).await.unwrap();
        assert!(matches!(
            svc.delete(&admin, turf.id).await.unwrap_err(),
            ServiceError::Domain(DomainError::NotFound("Turf"))
        ));
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let svc = service();
        let admin = Principal::new(UserId::new(), Role::Admin);
        svc.create(&admin, new_turf("Pune", 800.0)).await.unwrap();
        svc.create(&admin, new_turf("Mumbai", 1500.0)).await.unwrap();

        let pune = svc
            .list(&TurfFilter {
                city: Some("pune".into()),
                ..TurfFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(pune.len(), 1);

        let cheap = svc
            .list(&TurfFilter {
                max_price: Some(1000.0),
                ..TurfFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(cheap.len(), 1);
        assert_eq!(svc.list(&TurfFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reviews_update_rating() {
        let svc = service();
        let admin = Principal::new(UserId::new(), Role::Admin);
        let turf = svc.create(&admin, new_turf("Pune", 800.0)).await.unwrap();
        let player = Principal::new(UserId::new(), Role::User);
        svc.add_review(&player, turf.id, NewReview { rating: 4, comment: Some("Good turf".into()) })
            .await
            .unwrap();
        let reviewed = svc
            .add_review(&player, turf.id, NewReview { rating: 5, comment: None })
            .await
            .unwrap();
        assert_eq!(reviewed.rating, 4.5);
    }

    #[tokio::test]
    async fn slots_follow_open_hours() {
        let svc = service();
        let admin = Principal::new(UserId::new(), Role::Admin);
        let turf = svc.create(&admin, new_turf("Pune", 800.0)).await.unwrap();
        let slots = svc
            .slots(
                turf.id,
                &SlotQuery {
                    from: Some("2024-06-01".into()),
                    days: Some(2),
                },
            )
            .await
            .unwrap();
        assert_eq!(slots.len(), 8);
        assert!(slots.iter().all(|s| !s.is_booked && s.price == 800.0));

        let err = svc
            .slots(
                turf.id,
                &SlotQuery {
                    from: Some("June 1".into()),
                    days: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
    }
}
