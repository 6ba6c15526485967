//! Notification fan-out over the configured transports.

use std::sync::Arc;

use serde::Serialize;

use crate::message::{EmailMessage, EmailTransport, NotificationError, WhatsAppMessage, WhatsAppTransport};

/// Result of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { message_id: String },
    /// The channel is not configured; nothing was sent.
    Skipped,
}

/// Per-channel outcome of a best-effort dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ChannelReport {
    #[serde(rename_all = "camelCase")]
    Sent { message_id: String },
    Skipped,
    Failed { error: String },
    /// No message was produced for this channel (e.g. the user has no phone).
    NotRequested,
}

impl From<Result<Delivery, NotificationError>> for ChannelReport {
    fn from(result: Result<Delivery, NotificationError>) -> Self {
        match result {
            Ok(Delivery::Sent { message_id }) => Self::Sent { message_id },
            Ok(Delivery::Skipped) => Self::Skipped,
            Err(err) => Self::Failed {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub email: ChannelReport,
    pub whatsapp: ChannelReport,
}

impl DispatchReport {
    pub fn not_requested() -> Self {
        Self {
            email: ChannelReport::NotRequested,
            whatsapp: ChannelReport::NotRequested,
        }
    }
}

/// Health of one transport as reported by `verify_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    pub configured: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportStatus {
    pub email: ChannelStatus,
    pub whatsapp: ChannelStatus,
}

#[derive(Clone, Default)]
pub struct NotificationService {
    email: Option<Arc<dyn EmailTransport>>,
    whatsapp: Option<Arc<dyn WhatsAppTransport>>,
}

impl NotificationService {
    pub fn new(email: Option<Arc<dyn EmailTransport>>, whatsapp: Option<Arc<dyn WhatsAppTransport>>) -> Self {
        Self { email, whatsapp }
    }

    /// A service with no transports; every send is skipped.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    pub fn whatsapp_enabled(&self) -> bool {
        self.whatsapp.is_some()
    }

    pub async fn send_email(&self, message: &EmailMessage) -> Result<Delivery, NotificationError> {
        message.validate()?;
        let Some(transport) = &self.email else {
            tracing::warn!(to = %message.to, "email transport not configured; skipping");
            return Ok(Delivery::Skipped);
        };
        let message_id = transport.send(message).await?;
        Ok(Delivery::Sent { message_id })
    }

    pub async fn send_whatsapp(&self, message: &WhatsAppMessage) -> Result<Delivery, NotificationError> {
        message.validate()?;
        let Some(transport) = &self.whatsapp else {
            tracing::warn!(to = %message.to, "whatsapp transport not configured; skipping");
            return Ok(Delivery::Skipped);
        };
        let message_id = transport.send(message).await?;
        Ok(Delivery::Sent { message_id })
    }

    /// Send on both channels concurrently. Failures are logged and reported,
    /// never returned.
    pub async fn dispatch(&self, email: Option<EmailMessage>, whatsapp: Option<WhatsAppMessage>) -> DispatchReport {
        let email_fut = async {
            match &email {
                Some(msg) => self.report("email", self.send_email(msg).await),
                None => ChannelReport::NotRequested,
            }
        };
        let whatsapp_fut = async {
            match &whatsapp {
                Some(msg) => self.report("whatsapp", self.send_whatsapp(msg).await),
                None => ChannelReport::NotRequested,
            }
        };
        let (email, whatsapp) = tokio::join!(email_fut, whatsapp_fut);
        DispatchReport { email, whatsapp }
    }

    fn report(&self, channel: &'static str, result: Result<Delivery, NotificationError>) -> ChannelReport {
        if let Err(err) = &result {
            tracing::error!(channel, error = %err, "notification delivery failed");
        }
        result.into()
    }

    pub async fn verify_all(&self) -> TransportStatus {
        let email = match &self.email {
            Some(t) => status_of(t.verify().await),
            None => ChannelStatus::unconfigured(),
        };
        let whatsapp = match &self.whatsapp {
            Some(t) => status_of(t.verify().await),
            None => ChannelStatus::unconfigured(),
        };
        TransportStatus { email, whatsapp }
    }
}

impl ChannelStatus {
    fn unconfigured() -> Self {
        Self {
            configured: false,
            verified: false,
            error: None,
        }
    }
}

fn status_of(result: Result<(), NotificationError>) -> ChannelStatus {
    match result {
        Ok(()) => ChannelStatus {
            configured: true,
            verified: true,
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "transport verification failed");
            ChannelStatus {
                configured: true,
                verified: false,
                error: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmail {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl EmailTransport for RecordingEmail {
        async fn send(&self, message: &EmailMessage) -> Result<String, NotificationError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok("email-1".into())
        }

        async fn verify(&self) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    struct BrokenWhatsApp;

    #[async_trait]
    impl WhatsAppTransport for BrokenWhatsApp {
        async fn send(&self, _: &WhatsAppMessage) -> Result<String, NotificationError> {
            Err(NotificationError::Provider {
                status: 500,
                body: "down".into(),
            })
        }

        async fn verify(&self) -> Result<(), NotificationError> {
            Err(NotificationError::Transport("unreachable".into()))
        }
    }

    fn email() -> EmailMessage {
        EmailMessage {
            to: "a@b.in".into(),
            subject: "s".into(),
            text: "t".into(),
            html: None,
        }
    }

    fn whatsapp() -> WhatsAppMessage {
        WhatsAppMessage {
            to: "+919876543210".into(),
            body: "hi".into(),
        }
    }

    #[tokio::test]
    async fn missing_transport_is_skipped() {
        let svc = NotificationService::disabled();
        assert_eq!(svc.send_email(&email()).await.unwrap(), Delivery::Skipped);
        assert_eq!(svc.send_whatsapp(&whatsapp()).await.unwrap(), Delivery::Skipped);
    }

    #[tokio::test]
    async fn dispatch_reports_each_channel_independently() {
        let recorder = Arc::new(RecordingEmail::default());
        let svc = NotificationService::new(Some(recorder.clone()), Some(Arc::new(BrokenWhatsApp)));

        let report = svc.dispatch(Some(email()), Some(whatsapp())).await;
        assert_eq!(
            report.email,
            ChannelReport::Sent {
                message_id: "email-1".into()
            }
        );
        assert!(matches!(report.whatsapp, ChannelReport::Failed { .. }));
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);

        let report = svc.dispatch(Some(email()), None).await;
        assert_eq!(report.whatsapp, ChannelReport::NotRequested);
    }

    #[tokio::test]
    async fn verify_all_reports_configuration() {
        let svc = NotificationService::new(None, Some(Arc::new(BrokenWhatsApp)));
        let status = svc.verify_all().await;
        assert!(!status.email.configured);
        assert!(status.whatsapp.configured);
        assert!(!status.whatsapp.verified);
        assert!(status.whatsapp.error.is_some());
    }

    #[test]
    fn report_serializes_with_status_tag() {
        let json = serde_json::to_value(ChannelReport::Sent {
            message_id: "x".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "status": "sent", "messageId": "x" }));
    }
}
