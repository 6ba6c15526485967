//! Process configuration read from the environment.
//!
//! Every key may also be given with a `VITE_` prefix, which is how the
//! front-end build shares one `.env` file with the server.

use std::sync::Arc;

use turfbook_notifications::{
    EmailTransport, NotificationService, SendGridConfig, SendGridEmailTransport, TwilioConfig,
    TwilioWhatsAppTransport, WhatsAppTransport,
};

pub const DEFAULT_PORT: u16 = 3003;
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEV_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub bcrypt_cost: u32,
    /// Addresses that register with the admin role.
    pub admin_emails: Vec<String>,
    pub email: Option<SendGridConfig>,
    pub whatsapp: Option<TwilioConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            use_persistent_stores: false,
            cors_origin: DEFAULT_ORIGIN.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            frontend_url: DEFAULT_ORIGIN.to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            admin_emails: Vec::new(),
            email: None,
            whatsapp: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get = |key: &str| read(key).or_else(|| read(&format!("VITE_{key}")));

        let port = get("PORT").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT);
        let use_persistent_stores = get("USE_PERSISTENT_STORES")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);
        let bcrypt_cost = get("BCRYPT_COST")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BCRYPT_COST);

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let mut missing = Vec::new();

        let sendgrid_key = get("SENDGRID_API_KEY").or_else(|| get("SMTP_PASS"));
        let smtp_from = get("SMTP_FROM");
        if sendgrid_key.is_none() {
            missing.push("SENDGRID_API_KEY");
        }
        if smtp_from.is_none() {
            missing.push("SMTP_FROM");
        }
        let email = match (sendgrid_key, smtp_from) {
            (Some(key), Some(from)) => {
                let cfg = SendGridConfig::new(key, from);
                Some(match get("SENDGRID_BASE_URL") {
                    Some(base) => cfg.with_base_url(base),
                    None => cfg,
                })
            }
            _ => None,
        };

        let sid = get("TWILIO_ACCOUNT_SID");
        let token = get("TWILIO_AUTH_TOKEN");
        let wa_from = get("TWILIO_WHATSAPP_FROM");
        for (key, value) in [
            ("TWILIO_ACCOUNT_SID", &sid),
            ("TWILIO_AUTH_TOKEN", &token),
            ("TWILIO_WHATSAPP_FROM", &wa_from),
        ] {
            if value.is_none() {
                missing.push(key);
            }
        }
        let whatsapp = match (sid, token, wa_from) {
            (Some(sid), Some(token), Some(from)) => {
                let cfg = TwilioConfig::new(sid, token, from);
                Some(match get("TWILIO_BASE_URL") {
                    Some(base) => cfg.with_base_url(base),
                    None => cfg,
                })
            }
            _ => None,
        };

        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "notification settings incomplete; affected channels are disabled");
        }

        Self {
            port,
            database_url: get("DATABASE_URL"),
            use_persistent_stores,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            jwt_secret,
            frontend_url: get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            bcrypt_cost,
            admin_emails: get("ADMIN_EMAILS")
                .map(|v| {
                    v.split(',')
                        .map(|e| e.trim().to_lowercase())
                        .filter(|e| !e.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            email,
            whatsapp,
        }
    }

    /// Persistence is requested explicitly or implied by a database URL.
    pub fn wants_persistence(&self) -> bool {
        self.use_persistent_stores || self.database_url.is_some()
    }

    /// Notification service with whichever transports are configured.
    pub fn notification_service(&self) -> NotificationService {
        let email = self
            .email
            .clone()
            .map(|cfg| Arc::new(SendGridEmailTransport::new(cfg)) as Arc<dyn EmailTransport>);
        let whatsapp = self
            .whatsapp
            .clone()
            .map(|cfg| Arc::new(TwilioWhatsAppTransport::new(cfg)) as Arc<dyn WhatsAppTransport>);
        NotificationService::new(email, whatsapp)
    }
}
