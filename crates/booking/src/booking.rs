//! Bookings: request validation, pricing, overlap detection and status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use turfbook_core::{BookingId, DomainError, DomainResult, Entity, TurfId, UserId};

use crate::pricing::total_price;
use crate::time::{duration_hours, BookingDate, TimeOfDay};
use crate::turf::Turf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
        )
    }
}

impl core::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::validation(format!("Unknown booking status: {other}"))),
        }
    }
}

/// Booking creation input as received over the wire.
///
/// Times stay as strings so malformed values surface as domain validation
/// errors rather than deserialization failures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub turf_id: TurfId,
    /// Book on behalf of another user (admins only). Defaults to the caller.
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub total_price: Option<f64>,
    /// Confirmation address override.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingWindow {
    pub date: BookingDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub hours: f64,
}

impl BookingRequest {
    /// Parse date and times and check the window is non-empty.
    pub fn window(&self) -> DomainResult<BookingWindow> {
        let date = BookingDate::parse(&self.date)?;
        let start_time = TimeOfDay::parse(&self.start_time)?;
        let end_time = TimeOfDay::parse(&self.end_time)?;
        let hours = duration_hours(start_time, end_time)?;
        Ok(BookingWindow {
            date,
            start_time,
            end_time,
            hours,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub turf_id: TurfId,
    pub turf_name: String,
    pub date: BookingDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Booking {
    type Id = BookingId;

    fn id(&self) -> BookingId {
        self.id
    }
}

impl Booking {
    /// Build a pending booking for `user_id` at `turf`.
    ///
    /// Validates the time window, checks it against the turf's open hours and
    /// derives the price. Overlaps with other bookings are checked by the caller.
    pub fn prepare(
        request: &BookingRequest,
        turf: &Turf,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if request.turf_id != turf.id {
            return Err(DomainError::invariant("booking request targets a different turf"));
        }
        let window = request.window()?;
        if !turf.open_hours.contains(window.start_time, window.end_time) {
            return Err(DomainError::validation(format!(
                "Booking must be within opening hours ({} - {})",
                turf.open_hours.from, turf.open_hours.to
            )));
        }
        let price = total_price(turf.price_per_hour, window.hours, request.total_price)?;

        Ok(Self {
            id: BookingId::new(),
            user_id,
            turf_id: turf.id,
            turf_name: turf.name.clone(),
            date: window.date,
            start_time: window.start_time,
            end_time: window.end_time,
            total_price: price,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// `BK` followed by the booking id.
    pub fn reference(&self) -> String {
        format!("BK{}", self.id)
    }

    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    pub fn duration_minutes(&self) -> i64 {
        (i64::from(self.end_time.seconds_from_midnight()) - i64::from(self.start_time.seconds_from_midnight())) / 60
    }

    /// Whether this booking occupies any part of `start..end` on `date` at `turf_id`.
    pub fn occupies(&self, turf_id: TurfId, date: BookingDate, start: TimeOfDay, end: TimeOfDay) -> bool {
        self.is_active()
            && self.turf_id == turf_id
            && self.date == date
            && self.start_time < end
            && start < self.end_time
    }

    /// Same turf and day, both active, and the time ranges intersect.
    pub fn overlaps(&self, other: &Booking) -> bool {
        self.id != other.id
            && other.is_active()
            && self.occupies(other.turf_id, other.date, other.start_time, other.end_time)
    }

    pub fn transition(&mut self, next: BookingStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invariant(format!(
                "cannot move booking from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.transition(BookingStatus::Cancelled, now)
    }
}

/// First existing booking that collides with `candidate`, if any.
pub fn find_conflict<'a>(existing: &'a [Booking], candidate: &Booking) -> Option<&'a Booking> {
    existing.iter().find(|b| b.overlaps(candidate))
}
