//! `turfbook-auth`: authentication and authorization boundary.
//!
//! Token handling, password policy and the account lifecycle rules live here.
//! The crate knows nothing about HTTP or storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, ensure_self_or_admin, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use password::{validate_password_policy, PasswordError, PasswordHasher};
pub use permissions::{permissions_for, Permission};
pub use principal::Principal;
pub use roles::Role;
pub use token::{Hs256JwtValidator, JwtValidator, TokenError, TokenIssuer, SESSION_TTL};
pub use user::{
    hash_reset_token, normalize_email, normalize_phone,
    NewUser, NotificationPreferences, UserAccount, UserProfile, LOCK_DURATION, MAX_LOGIN_ATTEMPTS,
    RESET_TOKEN_TTL,
};
