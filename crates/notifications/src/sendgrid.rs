//! SendGrid v3 mail API transport.

use async_trait::async_trait;
use serde_json::json;

use crate::message::{check_status, EmailMessage, EmailTransport, NotificationError};

pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub from: String,
    pub base_url: String,
}

impl SendGridConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from: from.into(),
            base_url: DEFAULT_SENDGRID_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

pub struct SendGridEmailTransport {
    client: reqwest::Client,
    config: SendGridConfig,
}

impl SendGridEmailTransport {
    pub fn new(config: SendGridConfig) -> Self {
        Self {
            client: crate::http_client(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        let mut content = vec![json!({ "type": "text/plain", "value": message.text })];
        if let Some(html) = &message.html {
            content.push(json!({ "type": "text/html", "value": html }));
        }
        json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.config.from },
            "subject": message.subject,
            "content": content,
        })
    }
}

#[async_trait]
impl EmailTransport for SendGridEmailTransport {
    #[tracing::instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        message.validate()?;
        let resp = self
            .client
            .post(self.url("/v3/mail/send"))
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(message))
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let id = resp
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("accepted")
            .to_string();
        tracing::info!(message_id = %id, "email sent");
        Ok(id)
    }

    async fn verify(&self) -> Result<(), NotificationError> {
        let resp = self
            .client
            .get(self.url("/v3/scopes"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "player@example.com".into(),
            subject: "Booking Confirmation".into(),
            text: "See you on the field".into(),
            html: Some("<p>See you</p>".into()),
        }
    }

    #[tokio::test]
    async fn posts_mail_with_bearer_key() {
        let seen: Arc<Mutex<Option<(String, serde_json::Value)>>> = Arc::default();
        let captured = seen.clone();
        let router = Router::new().route(
            "/v3/mail/send",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *captured.lock().unwrap() = Some((auth, body));
                    (StatusCode::ACCEPTED, [("x-message-id", "msg-123")])
                }
            }),
        );
        let base = serve(router).await;

        let transport = SendGridEmailTransport::new(
            SendGridConfig::new("SG.key", "bookings@turfbook.in").with_base_url(base),
        );
        let id = transport.send(&message()).await.unwrap();
        assert_eq!(id, "msg-123");

        let (auth, body) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(auth, "Bearer SG.key");
        assert_eq!(body["from"]["email"], "bookings@turfbook.in");
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "player@example.com");
        assert_eq!(body["content"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn provider_error_is_reported() {
        let router = Router::new()
            .route("/v3/mail/send", post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }))
            .route("/v3/scopes", get(|| async { StatusCode::FORBIDDEN }));
        let base = serve(router).await;
        let transport =
            SendGridEmailTransport::new(SendGridConfig::new("nope", "a@b.in").with_base_url(base));

        match transport.send(&message()).await {
            Err(NotificationError::Provider { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(transport.verify().await.is_err());
    }
}
