//! Booking price derivation.

use turfbook_core::{DomainError, DomainResult};

/// Round to two decimal places (paise).
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price charged for a booking.
///
/// A supplied positive `explicit` price is taken as-is; absent or zero means
/// `price_per_hour * duration_hours`. Negative or non-finite prices are rejected.
pub fn total_price(price_per_hour: f64, duration_hours: f64, explicit: Option<f64>) -> DomainResult<f64> {
    match explicit {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(DomainError::validation("totalPrice must be a non-negative number"))
        }
        Some(p) if p > 0.0 => Ok(round_currency(p)),
        _ => Ok(round_currency(price_per_hour * duration_hours)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derived_from_rate_and_duration() {
        assert_eq!(total_price(1200.0, 1.5, None).unwrap(), 1800.0);
        assert_eq!(total_price(999.0, 2.0, Some(0.0)).unwrap(), 1998.0);
    }

    #[test]
    fn explicit_price_wins() {
        assert_eq!(total_price(1200.0, 2.0, Some(1500.0)).unwrap(), 1500.0);
    }

    #[test]
    fn negative_explicit_price_rejected() {
        assert!(total_price(1200.0, 1.0, Some(-1.0)).is_err());
        assert!(total_price(1200.0, 1.0, Some(f64::NAN)).is_err());
    }

    proptest! {
        #[test]
        fn price_equals_rate_times_hours(rate in 1u32..10_000, minutes in 1u32..1_440) {
            let hours = f64::from(minutes) / 60.0;
            let price = total_price(f64::from(rate), hours, None).unwrap();
            prop_assert!((price - f64::from(rate) * hours).abs() <= 0.005 + f64::EPSILON * 1e4);
        }

        #[test]
        fn whole_hours_are_exact(rate in 1u32..10_000, hours in 1u32..18) {
            let price = total_price(f64::from(rate), f64::from(hours), None).unwrap();
            prop_assert_eq!(price, f64::from(rate * hours));
        }
    }
}
