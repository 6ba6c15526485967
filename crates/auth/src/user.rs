//! User accounts: registration rules, login lockout and password reset.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use turfbook_core::{DomainError, DomainResult, Entity, UserId};

use crate::{validate_password_policy, Role};

/// Consecutive failed logins that lock an account.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// How long a locked account stays locked.
pub const LOCK_DURATION: Duration = Duration::hours(2);

/// Lifetime of a password reset token.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("static regex"));

/// Channel opt-ins for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            push: true,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewUser {
    /// Validate and normalize (trimmed name, lowercased email, compact phone).
    pub fn validate(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        let name_len = name.chars().count();
        if name_len < 2 {
            return Err(DomainError::validation("Name must be at least 2 characters long"));
        }
        if name_len > 50 {
            return Err(DomainError::validation("Name cannot exceed 50 characters"));
        }

        let email = normalize_email(&self.email)?;

        validate_password_policy(&self.password).map_err(|e| DomainError::validation(e.to_string()))?;

        let phone = match self.phone.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(normalize_phone(raw)?),
        };

        Ok(Self {
            name,
            email,
            password: self.password,
            phone,
        })
    }
}

/// Trim, lowercase and syntax-check an email address.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(DomainError::validation("Invalid email format"));
    }
    Ok(email)
}

/// Strip separators and check the remaining digits form a plausible mobile number.
pub fn normalize_phone(raw: &str) -> DomainResult<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if !PHONE_RE.is_match(&compact) {
        return Err(DomainError::validation("Invalid phone number format"));
    }
    Ok(compact)
}

/// SHA-256 hex digest used to store reset tokens at rest.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub favorite_sports: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub notification_preferences: NotificationPreferences,
    pub login_attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub reset_token_hash: Option<String>,
    pub reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl UserAccount {
    /// Build a fresh account from validated input and an already hashed password.
    pub fn create(input: NewUser, password_hash: String, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: input.name,
            email: input.email,
            password_hash,
            phone: input.phone,
            role,
            avatar_url: None,
            favorite_sports: Vec::new(),
            preferred_locations: Vec::new(),
            notification_preferences: NotificationPreferences::default(),
            login_attempts: 0,
            lock_until: None,
            last_login: None,
            reset_token_hash: None,
            reset_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// Register a failed password comparison.
    ///
    /// An expired lock restarts the count at one. Reaching
    /// [`MAX_LOGIN_ATTEMPTS`] locks the account for [`LOCK_DURATION`].
    pub fn record_failed_login(&mut self, now: DateTime<Utc>) {
        if self.lock_until.is_some_and(|until| until <= now) {
            self.login_attempts = 1;
            self.lock_until = None;
        } else {
            self.login_attempts += 1;
            if self.login_attempts >= MAX_LOGIN_ATTEMPTS {
                self.lock_until = Some(now + LOCK_DURATION);
            }
        }
        self.updated_at = now;
    }

    pub fn record_successful_login(&mut self, now: DateTime<Utc>) {
        self.login_attempts = 0;
        self.lock_until = None;
        self.last_login = Some(now);
        self.updated_at = now;
    }

    /// Create a reset token, keeping only its digest. Returns the plaintext token.
    pub fn issue_reset_token(&mut self, now: DateTime<Utc>) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.reset_token_hash = Some(hash_reset_token(&token));
        self.reset_expires = Some(now + RESET_TOKEN_TTL);
        self.updated_at = now;
        token
    }

    pub fn reset_token_matches(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_expires) {
            (Some(hash), Some(expires)) => expires > now && *hash == hash_reset_token(token),
            _ => false,
        }
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_expires = None;
    }

    /// Swap in a new password hash; consumes any outstanding reset token and unlocks.
    pub fn set_password_hash(&mut self, password_hash: String, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.clear_reset_token();
        self.login_attempts = 0;
        self.lock_until = None;
        self.updated_at = now;
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public view of an account; never carries credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub favorite_sports: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub notification_preferences: NotificationPreferences,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserProfile {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            role: u.role,
            avatar_url: u.avatar_url.clone(),
            favorite_sports: u.favorite_sports.clone(),
            preferred_locations: u.preferred_locations.clone(),
            notification_preferences: u.notification_preferences,
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}
