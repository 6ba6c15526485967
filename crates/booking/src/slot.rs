//! Hourly availability slots derived from a turf's open hours.

use chrono::Duration;
use serde::Serialize;

use turfbook_core::TurfId;

use crate::booking::Booking;
use crate::time::{BookingDate, TimeOfDay};
use crate::turf::Turf;

pub const DEFAULT_SLOT_DAYS: u32 = 7;
pub const MAX_SLOT_DAYS: u32 = 31;

const FIRST_SLOT_HOUR: u32 = 6;
const LAST_SLOT_HOUR: u32 = 22;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub turf_id: TurfId,
    pub date: BookingDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub price: f64,
    pub is_booked: bool,
}

/// One-hour slots starting on the hour between 06:00 and 22:00, limited to
/// the turf's open hours, for `days` consecutive days from `from`.
pub fn generate_slots(turf: &Turf, from: BookingDate, days: u32, bookings: &[Booking]) -> Vec<Slot> {
    let days = days.min(MAX_SLOT_DAYS);
    let mut slots = Vec::new();
    for offset in 0..days {
        let Some(day) = from.as_naive().checked_add_signed(Duration::days(i64::from(offset))) else {
            break;
        };
        let date = BookingDate::from_naive(day);
        for hour in FIRST_SLOT_HOUR..=LAST_SLOT_HOUR {
            let (Some(start), Some(end)) = (TimeOfDay::from_hm(hour, 0), TimeOfDay::from_hm(hour + 1, 0)) else {
                continue;
            };
            if !turf.open_hours.contains(start, end) {
                continue;
            }
            let is_booked = bookings.iter().any(|b| b.occupies(turf.id, date, start, end));
            slots.push(Slot {
                turf_id: turf.id,
                date,
                start_time: start,
                end_time: end,
                price: turf.price_per_hour,
                is_booked,
            });
        }
    }
    slots
}
