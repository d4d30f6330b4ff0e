use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "orders.place").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const CART_WRITE: Permission = Permission::from_static("carts.write");
pub const ORDER_PLACE: Permission = Permission::from_static("orders.place");
pub const ORDER_AMEND: Permission = Permission::from_static("orders.amend");
pub const ORDER_STATUS_UPDATE: Permission = Permission::from_static("orders.status.update");
pub const CATALOG_COMPOSE: Permission = Permission::from_static("catalog.compose");
pub const CATALOG_PRICE: Permission = Permission::from_static("catalog.price");
pub const CATALOG_REMOVE: Permission = Permission::from_static("catalog.remove");
/// Product types and stock flowers.
pub const CATALOG_REFERENCE: Permission = Permission::from_static("catalog.reference");
pub const CATALOG_BROWSE: Permission = Permission::from_static("catalog.browse");
pub const FAVORITES_WRITE: Permission = Permission::from_static("favorites.write");
pub const STATISTICS_READ: Permission = Permission::from_static("statistics.read");
pub const EARNINGS_READ: Permission = Permission::from_static("earnings.read");
pub const STAFF_MANAGE: Permission = Permission::from_static("staff.manage");

/// Anonymous visitors shop like clients but keep no favorites.
pub(crate) const ANONYMOUS: &[Permission] = &[CART_WRITE, ORDER_PLACE, ORDER_AMEND];
pub(crate) const CLIENT: &[Permission] = &[
    CART_WRITE,
    ORDER_PLACE,
    ORDER_AMEND,
    CATALOG_BROWSE,
    FAVORITES_WRITE,
];
pub(crate) const FLORIST: &[Permission] = &[
    CATALOG_COMPOSE,
    CATALOG_PRICE,
    CATALOG_REMOVE,
    EARNINGS_READ,
];
pub(crate) const COURIER: &[Permission] = &[ORDER_STATUS_UPDATE, EARNINGS_READ];
pub(crate) const ADMIN: &[Permission] = &[
    ORDER_STATUS_UPDATE,
    CATALOG_PRICE,
    CATALOG_REMOVE,
    CATALOG_REFERENCE,
    STATISTICS_READ,
    STAFF_MANAGE,
];
