//! Row of the `users` table.

use figtally_core::account::UserAccount;
use figtally_core::roles::Role;
use figtally_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row. Contains the password hash; never serialize it.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// `'user'` or `'admin'`, enforced by `ck_users_role`.
    pub role: String,
    pub created_at: Timestamp,
}

impl UserRow {
    /// Convert into the core account, rejecting a role the schema should
    /// never have allowed.
    pub fn into_account(self) -> Result<UserAccount, String> {
        let role: Role = self
            .role
            .parse()
            .map_err(|_| format!("user {} has unknown role '{}'", self.id, self.role))?;
        Ok(UserAccount {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}
