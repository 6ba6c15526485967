use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use turfbook_auth::{
    ensure_self_or_admin, normalize_email, validate_password_policy, NewUser, PasswordHasher, Principal, Role,
    TokenIssuer, UserAccount, UserProfile,
};
use turfbook_core::{DomainError, UserId};
use turfbook_notifications::{templates, NotificationService};

use super::{blocking, ServiceError, ServiceResult};
use crate::repository::{RepositoryError, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Token plus public profile, returned from register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    notifier: NotificationService,
    frontend_url: String,
    admin_emails: Vec<String>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        notifier: NotificationService,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
            notifier,
            frontend_url: frontend_url.into(),
            admin_emails: Vec::new(),
        }
    }

    /// Accounts registered with one of these addresses get the admin role.
    pub fn with_admin_emails(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = emails.into_iter().map(|e| e.trim().to_lowercase()).collect();
        self
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: NewUser) -> ServiceResult<AuthSession> {
        let input = input.validate()?;
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict("Email already in use").into());
        }

        let hasher = self.hasher;
        let password = input.password.clone();
        let hash = blocking(move || hasher.hash(&password)).await??;

        let role = if self.admin_emails.contains(&input.email) {
            Role::Admin
        } else {
            Role::User
        };
        let now = Utc::now();
        let account = UserAccount::create(input, hash, role, now);
        self.users.insert(&account).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => DomainError::conflict("Email already in use").into(),
            other => ServiceError::from(other),
        })?;
        tracing::info!(user_id = %account.id, "user registered");

        self.notifier
            .dispatch(Some(templates::welcome(&account.email, &account.name)), None)
            .await;

        let token = self.issuer.issue(account.id, account.role, now)?;
        Ok(AuthSession {
            token,
            user: account.profile(),
        })
    }

    /// Check credentials, applying the lockout policy.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let email = normalize_email(email).map_err(|_| ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()))?;
        let Some(mut account) = self.users.find_by_email(&email).await? else {
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()));
        };

        let now = Utc::now();
        if let Some(until) = account.lock_until.filter(|_| account.is_locked(now)) {
            tracing::warn!(user_id = %account.id, "login attempt on locked account");
            return Err(ServiceError::Locked { until });
        }

        let hasher = self.hasher;
        let candidate = password.to_string();
        let stored = account.password_hash.clone();
        let matches = blocking(move || hasher.verify(&candidate, &stored)).await?;

        if !matches {
            account.record_failed_login(now);
            self.users.update(&account).await?;
            tracing::warn!(user_id = %account.id, attempts = account.login_attempts, "failed login");
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.into()));
        }

        account.record_successful_login(now);
        self.users.update(&account).await?;
        let token = self.issuer.issue(account.id, account.role, now)?;
        Ok(AuthSession {
            token,
            user: account.profile(),
        })
    }

    pub async fn me(&self, principal: &Principal) -> ServiceResult<UserProfile> {
        self.load(principal.user_id).await.map(|a| a.profile())
    }

    pub async fn get_user(&self, principal: &Principal, id: UserId) -> ServiceResult<UserProfile> {
        ensure_self_or_admin(principal, id)?;
        self.load(id).await.map(|a| a.profile())
    }

    /// Issue a reset token and e-mail the link. Unknown addresses are 404.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> ServiceResult<()> {
        let email = normalize_email(email)?;
        let Some(mut account) = self.users.find_by_email(&email).await? else {
            return Err(ServiceError::not_found("User"));
        };
        let token = account.issue_reset_token(Utc::now());
        self.users.update(&account).await?;

        let message = templates::password_reset_request(&account.email, &account.name, &self.frontend_url, &token);
        self.notifier.dispatch(Some(message), None).await;
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ServiceResult<()> {
        validate_password_policy(new_password)?;

        let now = Utc::now();
        let hash = turfbook_auth::hash_reset_token(token);
        let account = self.users.find_by_reset_token(&hash).await?;
        let Some(mut account) = account.filter(|a| a.reset_token_matches(token, now)) else {
            return Err(ServiceError::not_found("Reset token"));
        };

        let hasher = self.hasher;
        let password = new_password.to_string();
        let new_hash = blocking(move || hasher.hash(&password)).await??;
        account.set_password_hash(new_hash, now);
        self.users.update(&account).await?;
        tracing::info!(user_id = %account.id, "password reset");

        self.notifier
            .dispatch(Some(templates::password_reset_confirmation(&account.email, &account.name)), None)
            .await;
        Ok(())
    }

    async fn load(&self, id: UserId) -> ServiceResult<UserAccount> {
        self.users.get(id).await?.ok_or_else(|| ServiceError::not_found("User"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryUserRepository;
    use turfbook_auth::{Hs256JwtValidator, JwtValidator};

    fn service() -> (AccountService, Arc<InMemoryUserRepository>) {
        let users = Arc::new(InMemoryUserRepository::new());
        let svc = AccountService::new(
            users.clone(),
            PasswordHasher::with_cost(4),
            TokenIssuer::new("test-secret"),
            NotificationService::disabled(),
            "http://localhost:5173",
        )
        .with_admin_emails(vec!["Boss@TurfBook.in".into()]);
        (svc, users)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Asha Rao".into(),
            email: email.into(),
            password: "Str0ng!Pass".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (svc, _) = service();
        let session = svc.register(new_user("Asha@Example.com")).await.unwrap();
        assert_eq!(session.user.email, "asha@example.com");

        let claims = Hs256JwtValidator::new("test-secret")
            .validate(&session.token, Utc::now())
            .unwrap();
        assert_eq!(claims.sub, session.user.id);

        let again = svc.login("asha@example.com", "Str0ng!Pass").await.unwrap();
        assert_eq!(again.user.id, session.user.id);
        assert!(again.user.last_login.is_some());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (svc, _) = service();
        svc.register(new_user("asha@example.com")).await.unwrap();
        let err = svc.register(new_user("ASHA@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn admin_emails_get_admin_role() {
        let (svc, _) = service();
        let session = svc.register(new_user("boss@turfbook.in")).await.unwrap();
        assert_eq!(session.user.role, Role::Admin);
    }

    #[tokio::test]
    async fn three_failures_lock_the_account() {
        let (svc, users) = service();
        let session = svc.register(new_user("asha@example.com")).await.unwrap();

        for _ in 0..3 {
            let err = svc.login("asha@example.com", "Wr0ng!Pass").await.unwrap_err();
            assert!(matches!(err, ServiceError::Unauthenticated(_)));
        }
        let err = svc.login("asha@example.com", "Str0ng!Pass").await.unwrap_err();
        assert!(matches!(err, ServiceError::Locked { .. }));

        let stored = users.get(session.user.id).await.unwrap().unwrap();
        assert_eq!(stored.login_attempts, 3);
        assert!(stored.lock_until.is_some());
    }

    #[tokio::test]
    async fn success_resets_failure_counter() {
        let (svc, users) = service();
        let session = svc.register(new_user("asha@example.com")).await.unwrap();
        svc.login("asha@example.com", "nope").await.unwrap_err();
        svc.login("asha@example.com", "Str0ng!Pass").await.unwrap();
        let stored = users.get(session.user.id).await.unwrap().unwrap();
        assert_eq!(stored.login_attempts, 0);
    }

    #[tokio::test]
    async fn unknown_email_is_unauthenticated() {
        let (svc, _) = service();
        let err = svc.login("ghost@example.com", "Str0ng!Pass").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let (svc, users) = service();
        let session = svc.register(new_user("asha@example.com")).await.unwrap();
        svc.request_password_reset("asha@example.com").await.unwrap();

        // Plant a known token the way the e-mail link would carry it.
        let mut account = users.get(session.user.id).await.unwrap().unwrap();
        let token = account.issue_reset_token(Utc::now());
        users.update(&account).await.unwrap();

        let err = svc.reset_password("not-the-token", "N3w!Passw0rd").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));

        svc.reset_password(&token, "N3w!Passw0rd").await.unwrap();
        svc.login("asha@example.com", "N3w!Passw0rd").await.unwrap();
        assert!(svc.reset_password(&token, "An0ther!Pass").await.is_err());
    }

    #[tokio::test]
    async fn reset_for_unknown_email_is_not_found() {
        let (svc, _) = service();
        let err = svc.request_password_reset("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("User"))));
    }

    #[tokio::test]
    async fn users_only_see_themselves() {
        let (svc, _) = service();
        let a = svc.register(new_user("a@example.com")).await.unwrap();
        let b = svc.register(new_user("b@example.com")).await.unwrap();
        let principal = Principal::new(a.user.id, Role::User);
        assert!(svc.get_user(&principal, a.user.id).await.is_ok());
        assert!(matches!(
            svc.get_user(&principal, b.user.id).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        let admin = Principal::new(UserId::new(), Role::Admin);
        assert!(svc.get_user(&admin, b.user.id).await.is_ok());
    }
}
