//! Read-side views: a possession joined with its definition, the definition's
//! faction (and that faction's order) and type, and the owner's public profile.
//!
//! Definitions and possessions are stored apart and only joined here.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::account::OwnerProfile;
use crate::definition::FigurineDefinition;
use crate::error::CoreError;
use crate::ports::{AccountRepository, DefinitionRepository, ReferenceRepository};
use crate::possession::{Possession, Quantities};
use crate::reference::{Faction, FigurineType, Order};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: DbId,
    pub name: String,
    pub logo_url: String,
    pub sort_order: i32,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            name: order.name,
            logo_url: order.logo_url,
            sort_order: order.sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionView {
    pub id: DbId,
    pub name: String,
    pub image_url: String,
    pub sort_order: i32,
    pub order: Option<OrderView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionView {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub created_at: Timestamp,
    /// `None` if the faction record no longer resolves.
    pub faction: Option<FactionView>,
    #[serde(rename = "type")]
    pub figurine_type: Option<FigurineType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PossessionView {
    pub id: DbId,
    #[serde(flatten)]
    pub quantities: Quantities,
    pub created_at: Timestamp,
    pub figurine_definition: DefinitionView,
    pub user: OwnerProfile,
}

/// Builds views, memoizing every reference lookup for its own lifetime.
///
/// Create one per request; a list of N possessions then costs one lookup per
/// distinct definition, faction, order, type and owner instead of N of each.
pub struct ViewAssembler<'a, S: ?Sized> {
    store: &'a S,
    orders: HashMap<DbId, Option<OrderView>>,
    factions: HashMap<DbId, Option<FactionView>>,
    figurine_types: HashMap<DbId, Option<FigurineType>>,
    definitions: HashMap<DbId, DefinitionView>,
    owners: HashMap<DbId, OwnerProfile>,
}

impl<'a, S> ViewAssembler<'a, S>
where
    S: DefinitionRepository + ReferenceRepository + AccountRepository + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            orders: HashMap::new(),
            factions: HashMap::new(),
            figurine_types: HashMap::new(),
            definitions: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    async fn order(&mut self, id: DbId) -> Result<Option<OrderView>, CoreError> {
        if let Some(cached) = self.orders.get(&id) {
            return Ok(cached.clone());
        }
        let view = self.store.find_order(id).await?.map(OrderView::from);
        self.orders.insert(id, view.clone());
        Ok(view)
    }

    async fn faction(&mut self, id: DbId) -> Result<Option<FactionView>, CoreError> {
        if let Some(cached) = self.factions.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.store.find_faction(id).await?;
        let view = match found {
            Some(Faction {
                id,
                name,
                image_url,
                sort_order,
                order_id,
                ..
            }) => Some(FactionView {
                id,
                name,
                image_url,
                sort_order,
                order: self.order(order_id).await?,
            }),
            None => None,
        };
        self.factions.insert(id, view.clone());
        Ok(view)
    }

    async fn figurine_type(&mut self, id: DbId) -> Result<Option<FigurineType>, CoreError> {
        if let Some(cached) = self.figurine_types.get(&id) {
            return Ok(cached.clone());
        }
        let kind = self.store.find_figurine_type(id).await?;
        self.figurine_types.insert(id, kind.clone());
        Ok(kind)
    }

    async fn owner(&mut self, user_id: DbId) -> Result<OwnerProfile, CoreError> {
        if let Some(cached) = self.owners.get(&user_id) {
            return Ok(cached.clone());
        }
        let profile = self
            .store
            .find_user(user_id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| {
                CoreError::Internal(format!("possession owner {user_id} does not exist"))
            })?;
        self.owners.insert(user_id, profile.clone());
        Ok(profile)
    }

    /// Populate `definition` with its faction, order and type.
    pub async fn definition(
        &mut self,
        definition: FigurineDefinition,
    ) -> Result<DefinitionView, CoreError> {
        let view = DefinitionView {
            faction: self.faction(definition.faction_id).await?,
            figurine_type: self.figurine_type(definition.figurine_type_id).await?,
            id: definition.id,
            name: definition.name,
            description: definition.description,
            image_url: definition.image_url,
            created_at: definition.created_at,
        };
        self.definitions.insert(view.id, view.clone());
        Ok(view)
    }

    async fn definition_by_id(&mut self, id: DbId) -> Result<DefinitionView, CoreError> {
        if let Some(cached) = self.definitions.get(&id) {
            return Ok(cached.clone());
        }
        let definition = self
            .store
            .find_definition(id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("definition {id} does not exist")))?;
        self.definition(definition).await
    }

    /// Join `possession` with its definition, looked up by id.
    pub async fn possession(&mut self, possession: Possession) -> Result<PossessionView, CoreError> {
        let definition = self
            .definition_by_id(possession.figurine_definition_id)
            .await?;
        self.finish(possession, definition).await
    }

    /// Join `possession` with a definition the caller already holds.
    pub async fn possession_with(
        &mut self,
        possession: Possession,
        definition: FigurineDefinition,
    ) -> Result<PossessionView, CoreError> {
        let definition = self.definition(definition).await?;
        self.finish(possession, definition).await
    }

    async fn finish(
        &mut self,
        possession: Possession,
        figurine_definition: DefinitionView,
    ) -> Result<PossessionView, CoreError> {
        Ok(PossessionView {
            id: possession.id,
            quantities: possession.quantities,
            created_at: possession.created_at,
            user: self.owner(possession.user_id).await?,
            figurine_definition,
        })
    }

    /// Assemble every possession, ordered by definition name ascending.
    pub async fn possessions(
        &mut self,
        possessions: Vec<Possession>,
    ) -> Result<Vec<PossessionView>, CoreError> {
        let mut views = Vec::with_capacity(possessions.len());
        for possession in possessions {
            views.push(self.possession(possession).await?);
        }
        views.sort_by(|a, b| {
            by_name(
                (a.figurine_definition.name.as_str(), a.id),
                (b.figurine_definition.name.as_str(), b.id),
            )
        });
        Ok(views)
    }

    /// Assemble every definition, ordered by name ascending.
    pub async fn definitions(
        &mut self,
        definitions: Vec<FigurineDefinition>,
    ) -> Result<Vec<DefinitionView>, CoreError> {
        let mut views = Vec::with_capacity(definitions.len());
        for definition in definitions {
            views.push(self.definition(definition).await?);
        }
        views.sort_by(|a, b| by_name((a.name.as_str(), a.id), (b.name.as_str(), b.id)));
        Ok(views)
    }
}

/// The one name ordering both listings use: byte order, then id.
///
/// Independent of the store's collation, so `"Zephyrs"` sorts before
/// `"aelves"`.
fn by_name(a: (&str, DbId), b: (&str, DbId)) -> Ordering {
    a.0.cmp(b.0).then(a.1.cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::definition::NewDefinition;
    use crate::memory::MemoryStore;
    use crate::ports::{DefinitionRepository, PossessionRepository};
    use crate::possession::NewPossession;
    use crate::roles::Role;

    async fn seed_definition(store: &MemoryStore, name: &str) -> FigurineDefinition {
        let (faction, kind) = store.seed_faction_and_type();
        store
            .insert_definition(&NewDefinition {
                name: name.into(),
                description: "d".into(),
                faction_id: faction.id,
                figurine_type_id: kind.id,
                image_url: "i".into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn possession_view_nests_definition_faction_order_and_owner() {
        let store = MemoryStore::new();
        let owner = store.add_user("painter", Role::User);
        let def = seed_definition(&store, "Liberators").await;
        let possession = store
            .insert_possession(&NewPossession {
                figurine_definition_id: def.id,
                user_id: owner.id,
                quantities: Quantities {
                    on_sprue: 1,
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        let view = ViewAssembler::new(&store)
            .possession(possession)
            .await
            .unwrap();
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["onSprue"], 1);
        assert_eq!(value["figurineDefinition"]["name"], "Liberators");
        assert_eq!(value["figurineDefinition"]["type"]["name"], "Infantry");
        assert_eq!(value["figurineDefinition"]["faction"]["order"]["name"], "Order");
        assert_eq!(value["user"], json!({ "id": owner.id, "username": "painter" }));
        assert!(value["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn dangling_faction_renders_as_null() {
        let store = MemoryStore::new();
        let (_, kind) = store.seed_faction_and_type();
        let def = store
            .insert_definition(&NewDefinition {
                name: "Orphan".into(),
                description: String::new(),
                faction_id: 404,
                figurine_type_id: kind.id,
                image_url: String::new(),
            })
            .await
            .unwrap();

        let view = ViewAssembler::new(&store).definition(def).await.unwrap();
        assert_eq!(view.faction, None);
        assert!(view.figurine_type.is_some());
    }

    #[tokio::test]
    async fn missing_owner_is_internal() {
        let store = MemoryStore::new();
        let def = seed_definition(&store, "Liberators").await;
        let possession = store
            .insert_possession(&NewPossession {
                figurine_definition_id: def.id,
                user_id: 999,
                quantities: Quantities::default(),
            })
            .await
            .unwrap();

        let err = ViewAssembler::new(&store)
            .possession(possession)
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }
}
