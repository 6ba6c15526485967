//! Transactional notifications: email over SendGrid, WhatsApp over Twilio.

pub mod message;
pub mod sendgrid;
pub mod service;
pub mod templates;
pub mod twilio;

pub use message::{EmailMessage, EmailTransport, NotificationError, WhatsAppMessage, WhatsAppTransport};
pub use sendgrid::{SendGridConfig, SendGridEmailTransport};
pub use service::{ChannelReport, ChannelStatus, Delivery, DispatchReport, NotificationService, TransportStatus};
pub use templates::BookingConfirmation;
pub use twilio::{TwilioConfig, TwilioWhatsAppTransport};

use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
