use serde::{Deserialize, Serialize};

use bloomshop_core::UserId;

use crate::Role;

/// An authenticated user as reported by the user directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Whoever issued the current request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requester {
    Anonymous,
    Authenticated(Principal),
}

impl Requester {
    pub fn user(user_id: UserId, role: Role) -> Self {
        Self::Authenticated(Principal::new(user_id, role))
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Requester::Anonymous => None,
            Requester::Authenticated(p) => Some(p.user_id),
        }
    }
}
