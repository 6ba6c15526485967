//! Channel messages and the transport seams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider responded with {status}: {body}")]
    Provider { status: u16, body: String },
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl EmailMessage {
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.to.trim().is_empty() || self.subject.trim().is_empty() || self.text.trim().is_empty() {
            return Err(NotificationError::InvalidMessage(
                "to, subject, and text are required".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppMessage {
    pub to: String,
    #[serde(alias = "message")]
    pub body: String,
}

impl WhatsAppMessage {
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.to.trim().is_empty() || self.body.trim().is_empty() {
            return Err(NotificationError::InvalidMessage("to and message are required".into()));
        }
        Ok(())
    }
}

/// Sends email; returns the provider's message id.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<String, NotificationError>;

    /// Check credentials without sending anything.
    async fn verify(&self) -> Result<(), NotificationError>;
}

/// Sends WhatsApp messages; returns the provider's message id.
#[async_trait]
pub trait WhatsAppTransport: Send + Sync {
    async fn send(&self, message: &WhatsAppMessage) -> Result<String, NotificationError>;

    async fn verify(&self) -> Result<(), NotificationError>;
}

/// Turn a non-success provider response into an error.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, NotificationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(NotificationError::Provider {
        status: status.as_u16(),
        body,
    })
}
