//! In-memory implementation of every store port.
//!
//! Enforces the same uniqueness constraints as the PostgreSQL schema and
//! reports them under the same constraint names, so tests exercise the
//! conflict paths. [`MemoryStore::set_unavailable`] simulates a store outage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::account::{NewUserAccount, UserAccount, UserChanges};
use crate::definition::{DefinitionChanges, FigurineDefinition, NewDefinition};
use crate::error::{StoreError, StoreResult};
use crate::ports::{
    AccountRepository, DefinitionRepository, PossessionRepository, ReferenceRepository,
    StoreHealth,
};
use crate::possession::{NewPossession, Possession, Quantities};
use crate::reference::{Faction, FigurineType, Order, DEFAULT_SORT_ORDER};
use crate::roles::Role;
use crate::types::DbId;

#[derive(Default)]
struct Tables {
    next_id: DbId,
    orders: BTreeMap<DbId, Order>,
    factions: BTreeMap<DbId, Faction>,
    figurine_types: BTreeMap<DbId, FigurineType>,
    definitions: BTreeMap<DbId, FigurineDefinition>,
    possessions: BTreeMap<DbId, Possession>,
    users: BTreeMap<DbId, UserAccount>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

fn conflict(constraint: &str) -> StoreError {
    StoreError::Conflict {
        constraint: constraint.to_string(),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    definition_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store is unavailable".into()));
        }
        Ok(self.lock_tables())
    }

    fn lock_tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent store call fail with [`StoreError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of definition inserts and updates performed so far.
    pub fn definition_writes(&self) -> usize {
        self.definition_writes.load(Ordering::SeqCst)
    }

    pub fn add_order(&self, name: &str) -> Order {
        let mut t = self.lock_tables();
        let id = t.next_id();
        let order = Order {
            id,
            name: name.to_string(),
            description: String::new(),
            logo_url: format!("https://img/{id}/logo.png"),
            image_url: String::new(),
            sort_order: DEFAULT_SORT_ORDER,
        };
        t.orders.insert(id, order.clone());
        order
    }

    pub fn add_faction(&self, order_id: DbId, name: &str) -> Faction {
        let mut t = self.lock_tables();
        let id = t.next_id();
        let faction = Faction {
            id,
            name: name.to_string(),
            description: String::new(),
            order_id,
            logo_url: String::new(),
            image_url: format!("https://img/{id}/faction.png"),
            sort_order: DEFAULT_SORT_ORDER,
        };
        t.factions.insert(id, faction.clone());
        faction
    }

    pub fn add_figurine_type(&self, name: &str) -> FigurineType {
        let mut t = self.lock_tables();
        let id = t.next_id();
        let kind = FigurineType {
            id,
            name: name.to_string(),
        };
        t.figurine_types.insert(id, kind.clone());
        kind
    }

    /// Seed one order, one faction in it and one figurine type.
    pub fn seed_faction_and_type(&self) -> (Faction, FigurineType) {
        let order = self.add_order("Order");
        let faction = self.add_faction(order.id, "Stormcast Eternals");
        let kind = self.add_figurine_type("Infantry");
        (faction, kind)
    }

    /// Seed an account with a dummy password hash.
    pub fn add_user(&self, username: &str, role: Role) -> UserAccount {
        let mut t = self.lock_tables();
        let id = t.next_id();
        let user = UserAccount {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        };
        t.users.insert(id, user.clone());
        user
    }
}

#[async_trait]
impl DefinitionRepository for MemoryStore {
    async fn find_definition(&self, id: DbId) -> StoreResult<Option<FigurineDefinition>> {
        Ok(self.tables()?.definitions.get(&id).cloned())
    }

    async fn find_definition_by_name(
        &self,
        name: &str,
    ) -> StoreResult<Option<FigurineDefinition>> {
        Ok(self
            .tables()?
            .definitions
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn list_definitions(&self) -> StoreResult<Vec<FigurineDefinition>> {
        let mut all: Vec<_> = self.tables()?.definitions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_definition(&self, input: &NewDefinition) -> StoreResult<FigurineDefinition> {
        let mut t = self.tables()?;
        if t.definitions.values().any(|d| d.name == input.name) {
            return Err(conflict("uq_figurine_definitions_name"));
        }
        let id = t.next_id();
        let definition = FigurineDefinition {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            faction_id: input.faction_id,
            figurine_type_id: input.figurine_type_id,
            image_url: input.image_url.clone(),
            created_at: Utc::now(),
        };
        t.definitions.insert(id, definition.clone());
        self.definition_writes.fetch_add(1, Ordering::SeqCst);
        Ok(definition)
    }

    async fn update_definition(
        &self,
        id: DbId,
        changes: &DefinitionChanges,
    ) -> StoreResult<Option<FigurineDefinition>> {
        let mut t = self.tables()?;
        if let Some(name) = &changes.name {
            if t.definitions.values().any(|d| d.id != id && &d.name == name) {
                return Err(conflict("uq_figurine_definitions_name"));
            }
        }
        let Some(definition) = t.definitions.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(definition);
        self.definition_writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(definition.clone()))
    }
}

#[async_trait]
impl PossessionRepository for MemoryStore {
    async fn find_possession(&self, id: DbId) -> StoreResult<Option<Possession>> {
        Ok(self.tables()?.possessions.get(&id).cloned())
    }

    async fn find_possession_for(
        &self,
        figurine_definition_id: DbId,
        user_id: DbId,
    ) -> StoreResult<Option<Possession>> {
        Ok(self
            .tables()?
            .possessions
            .values()
            .find(|p| p.figurine_definition_id == figurine_definition_id && p.user_id == user_id)
            .cloned())
    }

    async fn list_possessions_by_owner(&self, user_id: DbId) -> StoreResult<Vec<Possession>> {
        Ok(self
            .tables()?
            .possessions
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_possessions(&self) -> StoreResult<Vec<Possession>> {
        Ok(self.tables()?.possessions.values().cloned().collect())
    }

    async fn insert_possession(&self, input: &NewPossession) -> StoreResult<Possession> {
        let mut t = self.tables()?;
        let duplicate = t.possessions.values().any(|p| {
            p.figurine_definition_id == input.figurine_definition_id && p.user_id == input.user_id
        });
        if duplicate {
            return Err(conflict("uq_figurines_definition_user"));
        }
        let id = t.next_id();
        let possession = Possession {
            id,
            figurine_definition_id: input.figurine_definition_id,
            user_id: input.user_id,
            quantities: input.quantities,
            created_at: Utc::now(),
        };
        t.possessions.insert(id, possession.clone());
        Ok(possession)
    }

    async fn save_quantities(
        &self,
        id: DbId,
        quantities: &Quantities,
    ) -> StoreResult<Option<Possession>> {
        let mut t = self.tables()?;
        Ok(t.possessions.get_mut(&id).map(|p| {
            p.quantities = *quantities;
            p.clone()
        }))
    }

    async fn delete_possession(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables()?.possessions.remove(&id).is_some())
    }
}

#[async_trait]
impl ReferenceRepository for MemoryStore {
    async fn find_order(&self, id: DbId) -> StoreResult<Option<Order>> {
        Ok(self.tables()?.orders.get(&id).cloned())
    }

    async fn find_faction(&self, id: DbId) -> StoreResult<Option<Faction>> {
        Ok(self.tables()?.factions.get(&id).cloned())
    }

    async fn find_figurine_type(&self, id: DbId) -> StoreResult<Option<FigurineType>> {
        Ok(self.tables()?.figurine_types.get(&id).cloned())
    }

    async fn list_factions(&self) -> StoreResult<Vec<Faction>> {
        Ok(self.tables()?.factions.values().cloned().collect())
    }

    async fn list_figurine_types(&self) -> StoreResult<Vec<FigurineType>> {
        Ok(self.tables()?.figurine_types.values().cloned().collect())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<UserAccount>> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, input: &NewUserAccount) -> StoreResult<UserAccount> {
        let mut t = self.tables()?;
        if t.users.values().any(|u| u.username == input.username) {
            return Err(conflict("uq_users_username"));
        }
        if t.users.values().any(|u| u.email == input.email) {
            return Err(conflict("uq_users_email"));
        }
        let id = t.next_id();
        let user = UserAccount {
            id,
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role,
            created_at: Utc::now(),
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: DbId,
        changes: &UserChanges,
    ) -> StoreResult<Option<UserAccount>> {
        let mut t = self.tables()?;
        if let Some(username) = &changes.username {
            if t.users.values().any(|u| u.id != id && &u.username == username) {
                return Err(conflict("uq_users_username"));
            }
        }
        if let Some(email) = &changes.email {
            if t.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(conflict("uq_users_email"));
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            user.username.clone_from(username);
        }
        if let Some(email) = &changes.email {
            user.email.clone_from(email);
        }
        if let Some(hash) = &changes.password_hash {
            user.password_hash.clone_from(hash);
        }
        Ok(Some(user.clone()))
    }

    async fn set_role(&self, id: DbId, role: Role) -> StoreResult<Option<UserAccount>> {
        let mut t = self.tables()?;
        Ok(t.users.get_mut(&id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.tables().map(|_| ())
    }
}
