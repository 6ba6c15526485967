//! Twilio Messages API transport for WhatsApp.

use async_trait::async_trait;
use serde::Deserialize;

use crate::message::{check_status, NotificationError, WhatsAppMessage, WhatsAppTransport};

pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, without the `whatsapp:` prefix.
    pub from: String,
    pub base_url: String,
}

impl TwilioConfig {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
            base_url: DEFAULT_TWILIO_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
}

pub struct TwilioWhatsAppTransport {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioWhatsAppTransport {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: crate::http_client(),
            config,
        }
    }

    fn account_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

#[async_trait]
impl WhatsAppTransport for TwilioWhatsAppTransport {
    #[tracing::instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &WhatsAppMessage) -> Result<String, NotificationError> {
        message.validate()?;
        let form = [
            ("From", whatsapp_address(&self.config.from)),
            ("To", whatsapp_address(&message.to)),
            ("Body", message.body.clone()),
        ];
        let resp = self
            .client
            .post(format!("{}/Messages.json", self.account_url()))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;
        let resource: MessageResource = check_status(resp).await?.json().await?;
        tracing::info!(sid = %resource.sid, "whatsapp message sent");
        Ok(resource.sid)
    }

    async fn verify(&self) -> Result<(), NotificationError> {
        let resp = self
            .client
            .get(format!("{}.json", self.account_url()))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Form, Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn prefixes_numbers_once() {
        assert_eq!(whatsapp_address("+14155238886"), "whatsapp:+14155238886");
        assert_eq!(whatsapp_address("whatsapp:+1415"), "whatsapp:+1415");
    }

    #[tokio::test]
    async fn posts_form_to_account_messages() {
        let seen: Arc<Mutex<Option<(String, HashMap<String, String>)>>> = Arc::default();
        let captured = seen.clone();
        let router = Router::new()
            .route(
                "/2010-04-01/Accounts/:sid/Messages.json",
                post(move |Path(sid): Path<String>, Form(form): Form<HashMap<String, String>>| {
                    let captured = captured.clone();
                    async move {
                        *captured.lock().unwrap() = Some((sid, form));
                        (StatusCode::CREATED, Json(serde_json::json!({ "sid": "SM42" })))
                    }
                }),
            )
            .route("/2010-04-01/Accounts/:sid", get(|| async { StatusCode::OK }));
        let base = serve(router).await;

        let transport = TwilioWhatsAppTransport::new(
            TwilioConfig::new("AC123", "token", "+14155238886").with_base_url(base),
        );
        let sid = transport
            .send(&WhatsAppMessage {
                to: "+919876543210".into(),
                body: "Booking confirmed".into(),
            })
            .await
            .unwrap();
        assert_eq!(sid, "SM42");

        let (account, form) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(account, "AC123");
        assert_eq!(form["From"], "whatsapp:+14155238886");
        assert_eq!(form["To"], "whatsapp:+919876543210");
        assert_eq!(form["Body"], "Booking confirmed");
    }

    #[tokio::test]
    async fn rejects_empty_body_without_calling_provider() {
        let transport = TwilioWhatsAppTransport::new(
            TwilioConfig::new("AC1", "t", "+1").with_base_url("http://127.0.0.1:9"),
        );
        let err = transport
            .send(&WhatsAppMessage {
                to: "+91".into(),
                body: "".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::InvalidMessage(_)));
    }
}
