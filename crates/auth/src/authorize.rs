use thiserror::Error;

use bloomshop_core::{DomainError, UserId};

use crate::permissions::{self, Permission};
use crate::{Requester, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {actor} lacks permission '{permission}'")]
    Forbidden { actor: String, permission: String },

    #[error("forbidden: {0}")]
    NotOwner(String),
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::permission(value.to_string())
    }
}

/// The requester, resolved to exactly one role variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Client(UserId),
    Florist(UserId),
    Courier(UserId),
    Admin(UserId),
}

impl Actor {
    pub fn user_id(&self) -> Option<UserId> {
        match *self {
            Actor::Anonymous => None,
            Actor::Client(id) | Actor::Florist(id) | Actor::Courier(id) | Actor::Admin(id) => {
                Some(id)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Actor::Anonymous => "anonymous",
            Actor::Client(_) => Role::Client.as_str(),
            Actor::Florist(_) => Role::Florist.as_str(),
            Actor::Courier(_) => Role::Courier.as_str(),
            Actor::Admin(_) => Role::Admin.as_str(),
        }
    }
}

impl core::fmt::Display for Actor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.user_id() {
            Some(id) => write!(f, "{} {id}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Per-request capability object.
///
/// Built once from the requester; every permission and ownership question
/// afterwards goes through it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    actor: Actor,
}

impl Capabilities {
    pub fn resolve(requester: &Requester) -> Self {
        let actor = match requester {
            Requester::Anonymous => Actor::Anonymous,
            Requester::Authenticated(p) => match p.role {
                Role::Client => Actor::Client(p.user_id),
                Role::Florist => Actor::Florist(p.user_id),
                Role::Courier => Actor::Courier(p.user_id),
                Role::Admin => Actor::Admin(p.user_id),
            },
        };
        Self { actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.actor.user_id()
    }

    pub fn permissions(&self) -> &'static [Permission] {
        match self.actor {
            Actor::Anonymous => permissions::ANONYMOUS,
            Actor::Client(_) => Role::Client.permissions(),
            Actor::Florist(_) => Role::Florist.permissions(),
            Actor::Courier(_) => Role::Courier.permissions(),
            Actor::Admin(_) => Role::Admin.permissions(),
        }
    }

    pub fn can(&self, permission: &Permission) -> bool {
        self.permissions().contains(permission)
    }

    pub fn require(&self, permission: &Permission) -> Result<(), AuthzError> {
        authorize(self, permission)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.actor, Actor::Admin(_))
    }

    /// Succeeds when the requester is the authenticated `owner`.
    pub fn require_owner(&self, owner: UserId, what: &str) -> Result<(), AuthzError> {
        if self.user_id() == Some(owner) {
            Ok(())
        } else {
            Err(AuthzError::NotOwner(format!("{what} belongs to another user")))
        }
    }
}

/// Pure policy check: no IO, no business logic.
pub fn authorize(capabilities: &Capabilities, required: &Permission) -> Result<(), AuthzError> {
    if capabilities.can(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            actor: capabilities.actor().label().to_string(),
            permission: required.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{CART_WRITE, ORDER_STATUS_UPDATE, STATISTICS_READ};

    #[test]
    fn anonymous_can_shop_but_not_manage_orders() {
        let caps = Capabilities::resolve(&Requester::Anonymous);
        assert_eq!(caps.actor(), Actor::Anonymous);
        assert!(caps.require(&CART_WRITE).is_ok());
        assert!(caps.require(&ORDER_STATUS_UPDATE).is_err());
    }

    #[test]
    fn courier_and_admin_update_status() {
        let courier = Capabilities::resolve(&Requester::user(UserId::new(), Role::Courier));
        let admin = Capabilities::resolve(&Requester::user(UserId::new(), Role::Admin));
        let client = Capabilities::resolve(&Requester::user(UserId::new(), Role::Client));

        assert!(courier.require(&ORDER_STATUS_UPDATE).is_ok());
        assert!(admin.require(&ORDER_STATUS_UPDATE).is_ok());
        assert!(client.require(&ORDER_STATUS_UPDATE).is_err());
    }

    #[test]
    fn forbidden_maps_to_permission_error() {
        let florist = Capabilities::resolve(&Requester::user(UserId::new(), Role::Florist));
        let err: DomainError = florist.require(&STATISTICS_READ).unwrap_err().into();
        match err {
            DomainError::Permission(msg) => assert!(msg.contains("statistics.read")),
            other => panic!("expected permission error, got {other:?}"),
        }
    }

    #[test]
    fn ownership_check() {
        let me = UserId::new();
        let caps = Capabilities::resolve(&Requester::user(me, Role::Client));
        assert!(caps.require_owner(me, "cart").is_ok());
        assert!(caps.require_owner(UserId::new(), "cart").is_err());
        assert!(Capabilities::resolve(&Requester::Anonymous)
            .require_owner(me, "cart")
            .is_err());
    }
}
