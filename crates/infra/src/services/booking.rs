use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use turfbook_auth::permissions::{BOOKINGS_CANCEL_OWN, BOOKINGS_CREATE, BOOKINGS_MANAGE, BOOKINGS_READ_OWN};
use turfbook_auth::{authorize, ensure_self_or_admin, normalize_email, Principal, UserAccount};
use turfbook_booking::{find_conflict, Booking, BookingRequest, BookingStatus, Turf};
use turfbook_core::{BookingId, DomainError};
use turfbook_notifications::{templates, BookingConfirmation, DispatchReport, NotificationService};

use super::{ServiceError, ServiceResult};
use crate::repository::{BookingRepository, TurfRepository, UserRepository};

/// A persisted booking plus what happened to its confirmations.
#[derive(Debug, Clone, Serialize)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub notifications: DispatchReport,
}

#[derive(Clone)]
pub struct BookingService {
    users: Arc<dyn UserRepository>,
    turfs: Arc<dyn TurfRepository>,
    bookings: Arc<dyn BookingRepository>,
    notifier: NotificationService,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        turfs: Arc<dyn TurfRepository>,
        bookings: Arc<dyn BookingRepository>,
        notifier: NotificationService,
    ) -> Self {
        Self {
            users,
            turfs,
            bookings,
            notifier,
        }
    }

    /// Validate, price and persist a booking, then send confirmations.
    ///
    /// Notification failures are reported in the receipt and never undo the booking.
    #[instrument(skip(self, principal, request), fields(user_id = %principal.user_id, turf_id = %request.turf_id))]
    pub async fn create_booking(&self, principal: &Principal, request: BookingRequest) -> ServiceResult<BookingReceipt> {
        authorize(principal, &BOOKINGS_CREATE)?;
        let user_id = request.user_id.unwrap_or(principal.user_id);
        ensure_self_or_admin(principal, user_id)?;

        let turf = self
            .turfs
            .get(request.turf_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Turf"))?;
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let recipient = match request.email.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => normalize_email(raw)?,
            _ => user.email.clone(),
        };

        let booking = Booking::prepare(&request, &turf, user_id, Utc::now())?;

        // Best-effort: two concurrent requests can both pass this check.
        let same_day = self.bookings.list_for_turf(turf.id, booking.date, booking.date).await?;
        if let Some(existing) = find_conflict(&same_day, &booking) {
            return Err(DomainError::conflict(format!(
                "Time slot {} - {} overlaps an existing booking",
                existing.start_time, existing.end_time
            ))
            .into());
        }

        self.bookings.insert(&booking).await?;
        tracing::info!(booking_id = %booking.id, total_price = booking.total_price, "booking created");

        let notifications = self.confirm(&booking, &turf, &user, &recipient).await;
        Ok(BookingReceipt { booking, notifications })
    }

    async fn confirm(&self, booking: &Booking, turf: &Turf, user: &UserAccount, recipient: &str) -> DispatchReport {
        let details = BookingConfirmation {
            user_name: user.name.clone(),
            reference: booking.reference(),
            turf_name: turf.name.clone(),
            location: turf.location(),
            date: booking.date.to_string(),
            start_time: booking.start_time.to_string(),
            end_time: booking.end_time.to_string(),
            duration_minutes: booking.duration_minutes(),
            total_price: booking.total_price,
            amenities: turf.amenities.clone(),
        };
        let email = templates::booking_confirmation_email(recipient, &details);
        let whatsapp = user
            .phone
            .as_deref()
            .map(|phone| templates::booking_confirmation_whatsapp(phone, &details));
        self.notifier.dispatch(Some(email), whatsapp).await
    }

    pub async fn get_booking(&self, principal: &Principal, id: BookingId) -> ServiceResult<Booking> {
        authorize(principal, &BOOKINGS_READ_OWN)?;
        let booking = self.load(id).await?;
        ensure_self_or_admin(principal, booking.user_id)?;
        Ok(booking)
    }

    /// The caller's bookings, or every booking for admins.
    pub async fn list_bookings(&self, principal: &Principal) -> ServiceResult<Vec<Booking>> {
        if principal.is_admin() {
            return self.list_all(principal).await;
        }
        self.list_bookings_for_user(principal).await
    }

    pub async fn list_bookings_for_user(&self, principal: &Principal) -> ServiceResult<Vec<Booking>> {
        authorize(principal, &BOOKINGS_READ_OWN)?;
        Ok(self.bookings.list_for_user(principal.user_id).await?)
    }

    pub async fn list_all(&self, principal: &Principal) -> ServiceResult<Vec<Booking>> {
        authorize(principal, &BOOKINGS_MANAGE)?;
        Ok(self.bookings.list_all().await?)
    }

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn cancel_booking(&self, principal: &Principal, id: BookingId) -> ServiceResult<Booking> {
        authorize(principal, &BOOKINGS_CANCEL_OWN)?;
        let mut booking = self.load(id).await?;
        ensure_self_or_admin(principal, booking.user_id)?;
        booking.cancel(Utc::now())?;
        self.bookings.update(&booking).await?;
        tracing::info!(booking_id = %booking.id, "booking cancelled");
        Ok(booking)
    }

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn update_status(&self, principal: &Principal, id: BookingId, status: BookingStatus) -> ServiceResult<Booking> {
        authorize(principal, &BOOKINGS_MANAGE)?;
        let mut booking = self.load(id).await?;
        booking.transition(status, Utc::now())?;
        self.bookings.update(&booking).await?;
        tracing::info!(booking_id = %booking.id, status = %status, "booking status changed");
        Ok(booking)
    }

    async fn load(&self, id: BookingId) -> ServiceResult<Booking> {
        self.bookings
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Stores;
    use async_trait::async_trait;
    use turfbook_auth::{NewUser, Role};
    use turfbook_booking::{Address, NewTurf, OpenHours, TimeOfDay};
    use turfbook_core::{TurfId, UserId};
    use turfbook_notifications::{
        ChannelReport, EmailMessage, EmailTransport, NotificationError, WhatsAppMessage, WhatsAppTransport,
    };

    struct FailingEmail;

    #[async_trait]
    impl EmailTransport for FailingEmail {
        async fn send(&self, _: &EmailMessage) -> Result<String, NotificationError> {
            Err(NotificationError::Transport("smtp relay down".into()))
        }
        async fn verify(&self) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    struct OkWhatsApp;

    #[async_trait]
    impl WhatsAppTransport for OkWhatsApp {
        async fn send(&self, _: &WhatsAppMessage) -> Result<String, NotificationError> {
            Ok("SM1".into())
        }
        async fn verify(&self) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    struct Fixture {
        service: BookingService,
        stores: Stores,
        user: UserAccount,
        turf: Turf,
    }

    async fn fixture(notifier: NotificationService) -> Fixture {
        let stores = Stores::in_memory();
        let input = NewUser {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            password: "Str0ng!Pass".into(),
            phone: Some("+919876543210".into()),
        }
        .validate()
        .unwrap();
        let user = UserAccount::create(input, "hash".into(), Role::User, Utc::now());
        stores.users.insert(&user).await.unwrap();

        let turf = Turf::create(
            NewTurf {
                name: "Green Field Arena".into(),
                description: "Floodlit five-a-side".into(),
                address: Address {
                    street: "12 MG Road".into(),
                    city: "Bengaluru".into(),
                    state: "Karnataka".into(),
                    pincode: "560001".into(),
                },
                contact_number: "+919876543210".into(),
                email: "owner@greenfield.in".into(),
                price_per_hour: 1200.0,
                amenities: vec!["Parking".into()],
                sports: vec!["Football".into()],
                images: vec![],
                open_hours: OpenHours {
                    from: TimeOfDay::parse("06:00").unwrap(),
                    to: TimeOfDay::parse("23:00").unwrap(),
                },
            },
            Utc::now(),
        )
        .unwrap();
        stores.turfs.insert(&turf).await.unwrap();

        let service = BookingService::new(stores.users.clone(), stores.turfs.clone(), stores.bookings.clone(), notifier);
        Fixture {
            service,
            stores,
            user,
            turf,
        }
    }

    fn request(turf_id: TurfId, start: &str, end: &str) -> BookingRequest {
        BookingRequest {
            turf_id,
            user_id: None,
            date: "2024-06-01".into(),
            start_time: start.into(),
            end_time: end.into(),
            total_price: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn creates_priced_pending_booking() {
        let f = fixture(NotificationService::disabled()).await;
        let principal = Principal::new(f.user.id, Role::User);
        let receipt = f
            .service
            .create_booking(&principal, request(f.turf.id, "18:00", "19:30"))
            .await
            .unwrap();
        assert_eq!(receipt.booking.total_price, 1800.0);
        assert_eq!(receipt.booking.status, BookingStatus::Pending);
        assert_eq!(receipt.notifications.email, ChannelReport::Skipped);
        assert!(f.stores.bookings.get(receipt.booking.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn notification_failure_keeps_booking() {
        let notifier = NotificationService::new(Some(Arc::new(FailingEmail)), Some(Arc::new(OkWhatsApp)));
        let f = fixture(notifier).await;
        let principal = Principal::new(f.user.id, Role::User);
        let receipt = f
            .service
            .create_booking(&principal, request(f.turf.id, "08:00", "09:00"))
            .await
            .unwrap();
        assert!(matches!(receipt.notifications.email, ChannelReport::Failed { .. }));
        assert_eq!(
            receipt.notifications.whatsapp,
            ChannelReport::Sent {
                message_id: "SM1".into()
            }
        );
        assert_eq!(f.stores.bookings.list_for_user(f.user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_time_is_rejected_before_persisting() {
        let f = fixture(NotificationService::disabled()).await;
        let principal = Principal::new(f.user.id, Role::User);
        let err = f
            .service
            .create_booking(&principal, request(f.turf.id, "25:00", "26:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert!(f.stores.bookings.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_turf_and_user_are_not_found() {
        let f = fixture(NotificationService::disabled()).await;
        let principal = Principal::new(f.user.id, Role::User);
        let err = f
            .service
            .create_booking(&principal, request(TurfId::new(), "08:00", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("Turf"))));

        let ghost = Principal::new(UserId::new(), Role::User);
        let err = f
            .service
            .create_booking(&ghost, request(f.turf.id, "08:00", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("User"))));
    }

    #[tokio::test]
    async fn overlapping_booking_conflicts_until_cancelled() {
        let f = fixture(NotificationService::disabled()).await;
        let principal = Principal::new(f.user.id, Role::User);
        let first = f
            .service
            .create_booking(&principal, request(f.turf.id, "18:00", "19:00"))
            .await
            .unwrap();
        let err = f
            .service
            .create_booking(&principal, request(f.turf.id, "18:30", "19:30"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));

        f.service.cancel_booking(&principal, first.booking.id).await.unwrap();
        f.service
            .create_booking(&principal, request(f.turf.id, "18:30", "19:30"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn other_users_cannot_read_or_cancel() {
        let f = fixture(NotificationService::disabled()).await;
        let owner = Principal::new(f.user.id, Role::User);
        let receipt = f
            .service
            .create_booking(&owner, request(f.turf.id, "10:00", "11:00"))
            .await
            .unwrap();

        let stranger = Principal::new(UserId::new(), Role::User);
        assert!(matches!(
            f.service.get_booking(&stranger, receipt.booking.id).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        assert!(f.service.cancel_booking(&stranger, receipt.booking.id).await.is_err());
        assert!(f.service.list_bookings(&stranger).await.unwrap().is_empty());

        let admin = Principal::new(UserId::new(), Role::Admin);
        assert_eq!(f.service.list_bookings(&admin).await.unwrap().len(), 1);
        let confirmed = f
            .service
            .update_status(&admin, receipt.booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        assert!(matches!(
            f.service
                .update_status(&owner, receipt.booking.id, BookingStatus::Completed)
                .await
                .unwrap_err(),
            ServiceError::Forbidden(_)
        ));
    }
}
