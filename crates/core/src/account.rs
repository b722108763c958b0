//! User accounts as seen by the figurine flows.

use serde::Serialize;

use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// A stored account. Deliberately not `Serialize`: the hash must never leave
/// the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: Timestamp,
}

impl UserAccount {
    pub fn profile(&self) -> OwnerProfile {
        OwnerProfile {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// The minimal public profile embedded in possession views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerProfile {
    pub id: DbId,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Profile update. Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
