use thiserror::Error;

use turfbook_core::UserId;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("forbidden: resource belongs to another user")]
    NotOwner,
}

/// Check that `principal` holds `required` (or the wildcard).
///
/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = principal
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Ownership check for per-user resources: the owner or an admin passes.
pub fn ensure_self_or_admin(principal: &Principal, owner: UserId) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.user_id == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{BOOKINGS_CREATE, TURFS_MANAGE};
    use crate::Role;

    #[test]
    fn user_can_create_bookings() {
        let p = Principal::new(UserId::new(), Role::User);
        assert!(authorize(&p, &BOOKINGS_CREATE).is_ok());
    }

    #[test]
    fn user_cannot_manage_turfs() {
        let p = Principal::new(UserId::new(), Role::User);
        assert_eq!(
            authorize(&p, &TURFS_MANAGE),
            Err(AuthzError::Forbidden("turfs.manage".to_string()))
        );
    }

    #[test]
    fn admin_wildcard_grants_everything() {
        let p = Principal::new(UserId::new(), Role::Admin);
        assert!(authorize(&p, &TURFS_MANAGE).is_ok());
        assert!(authorize(&p, &Permission::new("anything.at.all")).is_ok());
    }

    #[test]
    fn ownership_check() {
        let owner = UserId::new();
        let me = Principal::new(owner, Role::User);
        let other = Principal::new(UserId::new(), Role::User);
        let admin = Principal::new(UserId::new(), Role::Admin);

        assert!(ensure_self_or_admin(&me, owner).is_ok());
        assert_eq!(ensure_self_or_admin(&other, owner), Err(AuthzError::NotOwner));
        assert!(ensure_self_or_admin(&admin, owner).is_ok());
    }
}
