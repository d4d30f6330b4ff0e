use core::str::FromStr;

use serde::{Deserialize, Serialize};

use bloomshop_core::DomainError;

use crate::permissions::{self, Permission};

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Florist,
    Courier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Florist => "florist",
            Role::Courier => "courier",
            Role::Admin => "admin",
        }
    }

    /// Staff roles get an employee profile.
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Client)
    }

    /// Permissions granted to this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Client => permissions::CLIENT,
            Role::Florist => permissions::FLORIST,
            Role::Courier => permissions::COURIER,
            Role::Admin => permissions::ADMIN,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "florist" => Ok(Role::Florist),
            "courier" => Ok(Role::Courier),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(
                "role",
                format!("unknown role '{other}' (expected client, florist, courier or admin)"),
            )),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
