//! Well-known role names and the authenticated caller identity.
//!
//! These must match the `CHECK` constraint on `users.role`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// The two roles the system knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Role::User),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}', expected '{ROLE_USER}' or '{ROLE_ADMIN}'"
            ))),
        }
    }
}

/// Who is making a request: resolved from a credential by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: DbId,
    pub role: Role,
}

impl Caller {
    pub fn new(id: DbId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn user(id: DbId) -> Self {
        Self::new(id, Role::User)
    }

    pub fn admin(id: DbId) -> Self {
        Self::new(id, Role::Admin)
    }

    /// A privileged caller is one whose role is `admin`.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
