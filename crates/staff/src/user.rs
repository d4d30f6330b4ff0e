use serde::{Deserialize, Serialize};

use bloomshop_auth::Role;
use bloomshop_core::{DomainError, DomainResult, Entity, UserId};

/// Input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub username: String,
    pub phone: String,
    pub role: Role,
    #[serde(default)]
    pub is_superuser: bool,
}

/// A user as held by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    phone: String,
    role: Role,
    is_superuser: bool,
}

impl User {
    pub fn register(input: NewUser) -> DomainResult<Self> {
        if input.username.trim().is_empty() {
            return Err(DomainError::validation("username", "user must have a username"));
        }
        if input.phone.trim().is_empty() {
            return Err(DomainError::validation("phone", "user must have a phone number"));
        }
        // Superusers always act as admins.
        let role = if input.is_superuser { Role::Admin } else { input.role };

        Ok(Self {
            id: input.id,
            username: input.username.trim().to_string(),
            phone: input.phone.trim().to_string(),
            role,
            is_superuser: input.is_superuser,
        })
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Superusers and every staff role get an employee profile.
    pub fn is_employee(&self) -> bool {
        self.is_superuser || self.role.is_staff()
    }
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
