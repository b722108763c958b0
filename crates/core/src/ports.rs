//! Store ports: the only seam between the domain and persistence.
//!
//! Every operation in this crate is written against these traits. The
//! PostgreSQL adapter lives in `figtally-db`; an in-memory adapter is
//! available behind the `test-support` feature.
//!
//! Implementations must enforce the uniqueness constraints themselves and
//! report violations as [`StoreError::Conflict`](crate::error::StoreError):
//!
//! - definition `name`
//! - possession `(figurine_definition_id, user_id)`
//! - account `username` and `email`

use async_trait::async_trait;

use crate::account::{NewUserAccount, UserAccount, UserChanges};
use crate::definition::{DefinitionChanges, FigurineDefinition, NewDefinition};
use crate::error::StoreResult;
use crate::possession::{NewPossession, Possession, Quantities};
use crate::reference::{Faction, FigurineType, Order};
use crate::roles::Role;
use crate::types::DbId;

#[async_trait]
pub trait DefinitionRepository: Send + Sync {
    async fn find_definition(&self, id: DbId) -> StoreResult<Option<FigurineDefinition>>;

    async fn find_definition_by_name(&self, name: &str)
        -> StoreResult<Option<FigurineDefinition>>;

    /// All definitions ordered by name ascending.
    async fn list_definitions(&self) -> StoreResult<Vec<FigurineDefinition>>;

    async fn insert_definition(&self, input: &NewDefinition) -> StoreResult<FigurineDefinition>;

    /// Returns `None` if no definition with the given `id` exists.
    async fn update_definition(
        &self,
        id: DbId,
        changes: &DefinitionChanges,
    ) -> StoreResult<Option<FigurineDefinition>>;
}

#[async_trait]
pub trait PossessionRepository: Send + Sync {
    async fn find_possession(&self, id: DbId) -> StoreResult<Option<Possession>>;

    /// Look up the unique possession for a (definition, user) pair.
    async fn find_possession_for(
        &self,
        figurine_definition_id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<Possession>>;

    async fn list_possessions_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Possession>>;

    async fn list_possessions(&self) -> StoreResult<Vec<Possession>>;

    async fn insert_possession(&self, input: &NewPossession) -> StoreResult<Possession>;

    /// Overwrite all four quantities. Returns `None` if the row is gone.
    async fn save_quantities(
        &self,
        id: DbId,
        quantities: &Quantities,
    ) -> StoreResult<Option<Possession>>;

    /// Returns `true` if a row was removed.
    async fn delete_possession(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    async fn find_order(&self, id: DbId) -> StoreResult<Option<Order>>;

    async fn find_faction(&self, id: DbId) -> StoreResult<Option<Faction>>;

    async fn find_figurine_type(&self, id: DbId) -> StoreResult<Option<FigurineType>>;

    async fn list_factions(&self) -> StoreResult<Vec<Faction>>;

    async fn list_figurine_types(&self) -> StoreResult<Vec<FigurineType>>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<UserAccount>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    async fn insert_user(&self, input: &NewUserAccount) -> StoreResult<UserAccount>;

    async fn update_user(&self, id: DbId, changes: &UserChanges)
        -> StoreResult<Option<UserAccount>>;

    async fn set_role(&self, id: DbId, role: Role) -> StoreResult<Option<UserAccount>>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Round-trip to the backing store.
    async fn ping(&self) -> StoreResult<()>;
}

/// Everything the figurine operations need from persistence.
pub trait FigurineStore:
    DefinitionRepository
    + PossessionRepository
    + ReferenceRepository
    + AccountRepository
    + StoreHealth
{
}

impl<T> FigurineStore for T where
    T: DefinitionRepository
        + PossessionRepository
        + ReferenceRepository
        + AccountRepository
        + StoreHealth
{
}
