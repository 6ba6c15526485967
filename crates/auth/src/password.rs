//! Password policy and bcrypt hashing.

use thiserror::Error;

const SPECIALS: &str = "@$!%*?&";
const MIN_LENGTH: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,

    #[error(
        "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character"
    )]
    TooWeak,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Check a plaintext password against the account policy.
///
/// At least eight characters drawn from ASCII letters, digits and `@$!%*?&`,
/// with at least one of each class.
pub fn validate_password_policy(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c));
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password.chars().any(|c| SPECIALS.contains(c));

    if allowed && lower && upper && digit && special {
        Ok(())
    } else {
        Err(PasswordError::TooWeak)
    }
}

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt wrapper with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: 12 }
    }
}

impl PasswordHasher {
    /// `cost` is clamped into bcrypt's supported range (4..=31).
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Returns `false` for a mismatch and for an unparsable stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("stored password hash could not be verified: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_accepted() {
        assert_eq!(validate_password_policy("Str0ng!Pass"), Ok(()));
    }

    #[test]
    fn short_password_rejected() {
        assert_eq!(validate_password_policy("Ab1!"), Err(PasswordError::TooShort));
    }

    #[test]
    fn each_character_class_is_required() {
        for weak in ["alllower1!", "ALLUPPER1!", "NoDigits!!", "NoSpecial12"] {
            assert_eq!(validate_password_policy(weak), Err(PasswordError::TooWeak), "{weak}");
        }
    }

    #[test]
    fn characters_outside_the_allowed_set_rejected() {
        assert_eq!(validate_password_policy("Has Space1!"), Err(PasswordError::TooWeak));
        assert_eq!(validate_password_policy("Hash#Tag1!"), Err(PasswordError::TooWeak));
    }

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::with_cost(MIN_COST);
        let hash = hasher.hash("Str0ng!Pass").unwrap();
        assert_ne!(hash, "Str0ng!Pass");
        assert!(hasher.verify("Str0ng!Pass", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn cost_is_clamped_to_bcrypt_range() {
        assert_eq!(PasswordHasher::with_cost(0).cost(), 4);
        assert_eq!(PasswordHasher::with_cost(10).cost(), 10);
        assert_eq!(PasswordHasher::with_cost(99).cost(), 31);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!PasswordHasher::default().verify("anything", "not-a-bcrypt-hash"));
    }
}
