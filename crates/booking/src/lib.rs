//! Turf booking domain: venues, reviews, bookings, pricing and availability.

pub mod booking;
pub mod pricing;
pub mod slot;
pub mod time;
pub mod turf;

pub use booking::{find_conflict, Booking, BookingRequest, BookingStatus, BookingWindow};
pub use pricing::{round_currency, total_price};
pub use slot::{generate_slots, Slot, DEFAULT_SLOT_DAYS, MAX_SLOT_DAYS};
pub use time::{duration_hours, BookingDate, TimeOfDay};
pub use turf::{Address, NewReview, NewTurf, OpenHours, Review, Turf, TurfFilter, TurfPatch};
