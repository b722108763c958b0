//! [`PgStore`]: the PostgreSQL implementation of the core store ports.

use async_trait::async_trait;
use figtally_core::account::{NewUserAccount, UserAccount, UserChanges};
use figtally_core::definition::{DefinitionChanges, FigurineDefinition, NewDefinition};
use figtally_core::error::{StoreError, StoreResult};
use figtally_core::ports::{
    AccountRepository, DefinitionRepository, PossessionRepository, ReferenceRepository,
    StoreHealth,
};
use figtally_core::possession::{NewPossession, Possession, Quantities};
use figtally_core::reference::{Faction, FigurineType, Order};
use figtally_core::roles::Role;
use figtally_core::types::DbId;

use crate::models::user::UserRow;
use crate::repositories::{
    DefinitionRepo, FactionRepo, FigurineTypeRepo, OrderRepo, PossessionRepo, UserRepo,
};
use crate::DbPool;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error into a [`StoreError`].
///
/// Unique violations on a `uq_`-prefixed constraint become
/// [`StoreError::Conflict`]; everything else is a backend fault.
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return StoreError::Conflict {
                    constraint: constraint.to_string(),
                };
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

fn account(row: UserRow) -> StoreResult<UserAccount> {
    row.into_account().map_err(StoreError::Backend)
}

fn optional_account(row: Option<UserRow>) -> StoreResult<Option<UserAccount>> {
    row.map(account).transpose()
}

/// Store ports backed by a connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DefinitionRepository for PgStore {
    async fn find_definition(&self, id: DbId) -> StoreResult<Option<FigurineDefinition>> {
        let row = DefinitionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_definition_by_name(
        &self,
        name: &str,
    ) -> StoreResult<Option<FigurineDefinition>> {
        let row = DefinitionRepo::find_by_name(&self.pool, name)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list_definitions(&self) -> StoreResult<Vec<FigurineDefinition>> {
        let rows = DefinitionRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_definition(&self, input: &NewDefinition) -> StoreResult<FigurineDefinition> {
        DefinitionRepo::create(&self.pool, input)
            .await
            .map(Into::into)
            .map_err(classify_sqlx_error)
    }

    async fn update_definition(
        &self,
        id: DbId,
        changes: &DefinitionChanges,
    ) -> StoreResult<Option<FigurineDefinition>> {
        let row = DefinitionRepo::update(&self.pool, id, changes)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl PossessionRepository for PgStore {
    async fn find_possession(&self, id: DbId) -> StoreResult<Option<Possession>> {
        let row = PossessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_possession_for(
        &self,
        figurine_definition_id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<Possession>> {
        let row =
            PossessionRepo::find_by_definition_and_user(&self.pool, figurine_definition_id, user_id)
                .await
                .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list_possessions_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Possession>> {
        let rows = PossessionRepo::list_by_user(&self.pool, user_id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_possessions(&self) -> StoreResult<Vec<Possession>> {
        let rows = PossessionRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_possession(&self, input: &NewPossession) -> StoreResult<Possession> {
        PossessionRepo::create(&self.pool, input)
            .await
            .map(Into::into)
            .map_err(classify_sqlx_error)
    }

    async fn save_quantities(
        &self,
        id: DbId,
        quantities: &Quantities,
    ) -> StoreResult<Option<Possession>> {
        let row = PossessionRepo::set_quantities(&self.pool, id, quantities)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_possession(&self, id: DbId) -> StoreResult<bool> {
        PossessionRepo::delete(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)
    }
}

#[async_trait]
impl ReferenceRepository for PgStore {
    async fn find_order(&self, id: DbId) -> StoreResult<Option<Order>> {
        let row = OrderRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_faction(&self, id: DbId) -> StoreResult<Option<Faction>> {
        let row = FactionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_figurine_type(&self, id: DbId) -> StoreResult<Option<FigurineType>> {
        let row = FigurineTypeRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn list_factions(&self) -> StoreResult<Vec<Faction>> {
        let rows = FactionRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_figurine_types(&self) -> StoreResult<Vec<FigurineType>> {
        let rows = FigurineTypeRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<UserAccount>> {
        let row = UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        optional_account(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let row = UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(classify_sqlx_error)?;
        optional_account(row)
    }

    async fn insert_user(&self, input: &NewUserAccount) -> StoreResult<UserAccount> {
        let row = UserRepo::create(&self.pool, input)
            .await
            .map_err(classify_sqlx_error)?;
        account(row)
    }

    async fn update_user(
        &self,
        id: DbId,
        changes: &UserChanges,
    ) -> StoreResult<Option<UserAccount>> {
        let row = UserRepo::update(&self.pool, id, changes)
            .await
            .map_err(classify_sqlx_error)?;
        optional_account(row)
    }

    async fn set_role(&self, id: DbId, role: Role) -> StoreResult<Option<UserAccount>> {
        let row = UserRepo::set_role(&self.pool, id, role)
            .await
            .map_err(classify_sqlx_error)?;
        optional_account(row)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }
}
