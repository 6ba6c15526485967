//! Turfs (bookable venues) and their reviews.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use turfbook_core::{DomainError, DomainResult, Entity, TurfId, UserId, ValueObject};

use crate::time::TimeOfDay;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ValueObject for Address {}

impl Address {
    fn validate(self) -> DomainResult<Self> {
        let street = required("street", &self.street)?;
        let city = required("city", &self.city)?;
        let state = required("state", &self.state)?;
        let pincode = required("pincode", &self.pincode)?;
        Ok(Self {
            street,
            city,
            state,
            pincode,
        })
    }
}

/// Daily opening window. Turfs never stay open past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    pub from: TimeOfDay,
    pub to: TimeOfDay,
}

impl ValueObject for OpenHours {}

impl OpenHours {
    pub fn validate(self) -> DomainResult<Self> {
        if self.from >= self.to {
            return Err(DomainError::validation("Opening time must be before closing time"));
        }
        Ok(self)
    }

    /// Whether `start..end` lies entirely within the window.
    pub fn contains(&self, start: TimeOfDay, end: TimeOfDay) -> bool {
        start >= self.from && end <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: UserId,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(self) -> DomainResult<Self> {
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::validation("Rating must be between 1 and 5"));
        }
        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self {
            rating: self.rating,
            comment,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turf {
    pub id: TurfId,
    pub name: String,
    pub description: String,
    pub address: Address,
    pub contact_number: String,
    pub email: String,
    pub price_per_hour: f64,
    pub amenities: Vec<String>,
    pub sports: Vec<String>,
    pub images: Vec<String>,
    pub open_hours: OpenHours,
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Turf {
    type Id = TurfId;

    fn id(&self) -> TurfId {
        self.id
    }
}

impl Turf {
    pub fn create(input: NewTurf, now: DateTime<Utc>) -> DomainResult<Self> {
        let input = input.validate()?;
        Ok(Self {
            id: TurfId::new(),
            name: input.name,
            description: input.description,
            address: input.address,
            contact_number: input.contact_number,
            email: input.email,
            price_per_hour: input.price_per_hour,
            amenities: input.amenities,
            sports: input.sports,
            images: input.images,
            open_hours: input.open_hours,
            rating: 0.0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Human-readable location line used in notifications.
    pub fn location(&self) -> String {
        format!("{}, {}, {}", self.address.street, self.address.city, self.address.state)
    }

    /// Apply a partial update. The turf is left untouched when the result would be invalid.
    pub fn apply(&mut self, patch: TurfPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let candidate = NewTurf {
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            address: patch.address.unwrap_or_else(|| self.address.clone()),
            contact_number: patch.contact_number.unwrap_or_else(|| self.contact_number.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            price_per_hour: patch.price_per_hour.unwrap_or(self.price_per_hour),
            amenities: patch.amenities.unwrap_or_else(|| self.amenities.clone()),
            sports: patch.sports.unwrap_or_else(|| self.sports.clone()),
            images: patch.images.unwrap_or_else(|| self.images.clone()),
            open_hours: patch.open_hours.unwrap_or(self.open_hours),
        }
        .validate()?;

        self.name = candidate.name;
        self.description = candidate.description;
        self.address = candidate.address;
        self.contact_number = candidate.contact_number;
        self.email = candidate.email;
        self.price_per_hour = candidate.price_per_hour;
        self.amenities = candidate.amenities;
        self.sports = candidate.sports;
        self.images = candidate.images;
        self.open_hours = candidate.open_hours;
        self.updated_at = now;
        Ok(())
    }

    /// Append a review and recompute the mean rating (one decimal).
    pub fn add_review(&mut self, user_id: UserId, review: NewReview, now: DateTime<Utc>) -> DomainResult<()> {
        let review = review.validate()?;
        self.reviews.push(Review {
            user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
        });
        let sum: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        let mean = f64::from(sum) / self.reviews.len() as f64;
        self.rating = (mean * 10.0).round() / 10.0;
        self.updated_at = now;
        Ok(())
    }

    pub fn offers_sport(&self, sport: &str) -> bool {
        self.sports.iter().any(|s| s.eq_ignore_ascii_case(sport.trim()))
    }

    pub fn matches(&self, filter: &TurfFilter) -> bool {
        if let Some(city) = filter.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
            && !self.address.city.eq_ignore_ascii_case(city)
        {
            return false;
        }
        if let Some(sport) = filter.sport.as_deref().filter(|s| !s.trim().is_empty())
            && !self.offers_sport(sport)
        {
            return false;
        }
        if let Some(max) = filter.max_price
            && self.price_per_hour > max
        {
            return false;
        }
        true
    }
}

/// Turf creation input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTurf {
    pub name: String,
    pub description: String,
    pub address: Address,
    pub contact_number: String,
    pub email: String,
    pub price_per_hour: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub open_hours: OpenHours,
}

impl NewTurf {
    pub fn validate(self) -> DomainResult<Self> {
        let name = required("name", &self.name)?;
        let description = required("description", &self.description)?;
        let address = self.address.validate()?;
        let contact_number = required("contactNumber", &self.contact_number)?;

        let email = self.email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(DomainError::validation("Please enter a valid email"));
        }

        if !self.price_per_hour.is_finite() || self.price_per_hour <= 0.0 {
            return Err(DomainError::validation("pricePerHour must be greater than 0"));
        }

        let open_hours = self.open_hours.validate()?;

        Ok(Self {
            name,
            description,
            address,
            contact_number,
            email,
            price_per_hour: self.price_per_hour,
            amenities: tidy(self.amenities),
            sports: tidy(self.sports),
            images: tidy(self.images),
            open_hours,
        })
    }
}

/// Partial turf update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurfPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub price_per_hour: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub sports: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub open_hours: Option<OpenHours>,
}

/// Listing filters. `city` matches case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurfFilter {
    pub city: Option<String>,
    pub sport: Option<String>,
    pub max_price: Option<f64>,
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn tidy(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
