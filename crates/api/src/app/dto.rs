//! Request/response bodies that are not plain domain types.

use serde::{Deserialize, Serialize};

use turfbook_booking::{Booking, BookingStatus};
use turfbook_infra::services::BookingReceipt;
use turfbook_notifications::{Delivery, DispatchReport};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A booking together with its human-facing `BK…` reference.
#[derive(Debug, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub reference: String,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        let reference = booking.reference();
        Self { booking, reference }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    pub message: &'static str,
    pub booking: BookingView,
    pub notifications: DispatchReport,
}

impl From<BookingReceipt> for BookingCreatedResponse {
    fn from(receipt: BookingReceipt) -> Self {
        Self {
            message: "Booking created successfully",
            booking: receipt.booking.into(),
            notifications: receipt.notifications,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub message: String,
    pub success: bool,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl DeliveryResponse {
    /// `channel` names the message kind, e.g. "Email" or "WhatsApp message".
    pub fn new(channel: &str, delivery: Delivery) -> Self {
        match delivery {
            Delivery::Sent { message_id } => Self {
                message: format!("{channel} sent successfully"),
                success: true,
                skipped: false,
                message_id: Some(message_id),
            },
            Delivery::Skipped => Self {
                message: format!("{channel} skipped: channel not configured"),
                success: true,
                skipped: true,
                message_id: None,
            },
        }
    }
}
