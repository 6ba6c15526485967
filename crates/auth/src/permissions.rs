use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are opaque strings (e.g. `"bookings.create"`). The wildcard
/// `"*"` grants everything and is only handed to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const BOOKINGS_CREATE: Permission = Permission::from_static("bookings.create");
pub const BOOKINGS_READ_OWN: Permission = Permission::from_static("bookings.read.own");
pub const BOOKINGS_CANCEL_OWN: Permission = Permission::from_static("bookings.cancel.own");
pub const BOOKINGS_MANAGE: Permission = Permission::from_static("bookings.manage");
pub const TURFS_REVIEW: Permission = Permission::from_static("turfs.review");
pub const TURFS_MANAGE: Permission = Permission::from_static("turfs.manage");
pub const USERS_READ_SELF: Permission = Permission::from_static("users.read.self");
pub const USERS_READ_ANY: Permission = Permission::from_static("users.read.any");
pub const NOTIFICATIONS_SEND: Permission = Permission::from_static("notifications.send");

/// Static role → permission mapping.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    match role {
        Role::Admin => vec![Permission::from_static("*")],
        Role::User => vec![
            BOOKINGS_CREATE,
            BOOKINGS_READ_OWN,
            BOOKINGS_CANCEL_OWN,
            TURFS_REVIEW,
            USERS_READ_SELF,
        ],
    }
}
