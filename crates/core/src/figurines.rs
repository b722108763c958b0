//! Figurine operations: the entry points the transport layer calls.
//!
//! Each function runs a whole request against a [`FigurineStore`] and returns
//! the assembled view. Every validation and authorization check runs before
//! the first write.

use crate::catalog::{self, resolve_or_create_definition, validate_references};
use crate::error::CoreError;
use crate::payload::{FigurineRecord, UpdatePayload};
use crate::policy::plan_update;
use crate::ports::FigurineStore;
use crate::possession::{self, merge_quantities, resolve_or_create_possession};
use crate::roles::Caller;
use crate::types::{DbId, Resolved};
use crate::view::{DefinitionView, PossessionView, ViewAssembler};

fn possession_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Possession",
        id,
    }
}

fn require_admin(caller: &Caller, action: &str) -> Result<(), CoreError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Only administrators may {action}"
        )))
    }
}

/// Resolve (or create) the definition named in `record`, then resolve (or
/// create) the caller's possession of it.
///
/// A pre-existing possession has the record's quantities merged in; fields
/// the record omits keep their stored values.
pub async fn create_or_merge_possession<S>(
    store: &S,
    caller: &Caller,
    record: &FigurineRecord,
) -> Result<PossessionView, CoreError>
where
    S: FigurineStore + ?Sized,
{
    record.quantities.checked()?;

    let definition =
        resolve_or_create_definition(store, caller, &record.name, &record.definition)
            .await?
            .into_inner();

    let possession = match resolve_or_create_possession(
        store,
        definition.id,
        caller.id,
        &record.quantities,
    )
    .await?
    {
        Resolved::Created(created) => created,
        Resolved::Existing(existing) => {
            let merged = merge_quantities(store, existing, &record.quantities).await?;
            tracing::info!(
                possession_id = merged.id,
                user_id = caller.id,
                "Merged quantities into existing possession"
            );
            merged
        }
    };

    ViewAssembler::new(store)
        .possession_with(possession, definition)
        .await
}

/// Every possession owned by `owner_id`, ordered by definition name.
pub async fn list_possessions<S>(store: &S, owner_id: DbId) -> Result<Vec<PossessionView>, CoreError>
where
    S: FigurineStore + ?Sized,
{
    let possessions = store.list_possessions_by_owner(owner_id).await?;
    ViewAssembler::new(store).possessions(possessions).await
}

/// Every possession of every user, ordered by definition name. Admin only.
pub async fn list_all_possessions<S>(
    store: &S,
    caller: &Caller,
) -> Result<Vec<PossessionView>, CoreError>
where
    S: FigurineStore + ?Sized,
{
    require_admin(caller, "list every user's possessions")?;
    let possessions = store.list_possessions().await?;
    ViewAssembler::new(store).possessions(possessions).await
}

pub async fn get_possession<S>(
    store: &S,
    caller: &Caller,
    possession_id: DbId,
) -> Result<PossessionView, CoreError>
where
    S: FigurineStore + ?Sized,
{
    let possession = store
        .find_possession(possession_id)
        .await?
        .ok_or_else(|| possession_not_found(possession_id))?;
    crate::policy::check_ownership(caller, possession.user_id)?;

    ViewAssembler::new(store).possession(possession).await
}

/// Apply an update payload through the mutation policy.
///
/// Quantities are written first, then any admin catalog changes are
/// cascaded to the linked definition. A failure in the second write does not
/// undo the first.
pub async fn update_possession<S>(
    store: &S,
    caller: &Caller,
    possession_id: DbId,
    payload: &UpdatePayload,
) -> Result<PossessionView, CoreError>
where
    S: FigurineStore + ?Sized,
{
    let possession = store
        .find_possession(possession_id)
        .await?
        .ok_or_else(|| possession_not_found(possession_id))?;

    let plan = plan_update(caller, possession.user_id, payload)?;
    if !plan.definition.is_empty() {
        validate_references(
            store,
            plan.definition.faction_id,
            plan.definition.figurine_type_id,
        )
        .await?;
    }

    let definition_id = possession.figurine_definition_id;
    let possession = merge_quantities(store, possession, &plan.quantities).await?;

    let mut views = ViewAssembler::new(store);
    if plan.definition.is_empty() {
        return views.possession(possession).await;
    }

    let definition = catalog::update_definition(store, definition_id, &plan.definition).await?;
    tracing::info!(
        possession_id,
        definition_id,
        user_id = caller.id,
        "Cascaded possession update to definition"
    );
    views.possession_with(possession, definition).await
}

/// Remove a possession. Admin only.
pub async fn delete_possession<S>(
    store: &S,
    caller: &Caller,
    possession_id: DbId,
) -> Result<(), CoreError>
where
    S: FigurineStore + ?Sized,
{
    require_admin(caller, "delete possessions")?;
    possession::delete_possession(store, possession_id).await
}

/// The whole catalog ordered by name. No ownership filter.
pub async fn list_definitions<S>(store: &S) -> Result<Vec<DefinitionView>, CoreError>
where
    S: FigurineStore + ?Sized,
{
    let definitions = store.list_definitions().await?;
    ViewAssembler::new(store).definitions(definitions).await
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::definition::DefinitionFields;
    use crate::memory::MemoryStore;
    use crate::ports::{DefinitionRepository, PossessionRepository};
    use crate::possession::{QuantityPatch, Quantities};
    use crate::reference::{Faction, FigurineType};
    use crate::roles::Role;

    struct Fixture {
        store: MemoryStore,
        admin: Caller,
        user: Caller,
        other: Caller,
        faction: Faction,
        kind: FigurineType,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let (faction, kind) = store.seed_faction_and_type();
        let admin = store.add_user("admin", Role::Admin);
        let user = store.add_user("alice", Role::User);
        let other = store.add_user("bob", Role::User);
        Fixture {
            admin: Caller::admin(admin.id),
            user: Caller::user(user.id),
            other: Caller::user(other.id),
            store,
            faction,
            kind,
        }
    }

    fn record(f: &Fixture, name: &str, quantities: QuantityPatch) -> FigurineRecord {
        FigurineRecord {
            name: name.into(),
            definition: DefinitionFields {
                faction: Some(f.faction.id),
                figurine_type: Some(f.kind.id),
                ..Default::default()
            },
            quantities,
        }
    }

    fn payload(value: serde_json::Value) -> UpdatePayload {
        serde_json::from_value(value).unwrap()
    }

    /// Create a definition as admin and a possession of it owned by `owner`.
    async fn possession_for(f: &Fixture, owner: &Caller, name: &str) -> PossessionView {
        create_or_merge_possession(&f.store, &f.admin, &record(f, name, QuantityPatch::default()))
            .await
            .unwrap();
        create_or_merge_possession(
            &f.store,
            owner,
            &record(
                f,
                name,
                QuantityPatch {
                    on_sprue: Some(3),
                    assembled: Some(2),
                    painted: Some(1),
                    needed: Some(4),
                },
            ),
        )
        .await
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // createOrMergePossession
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_builds_definition_and_possession() {
        let f = fixture();
        let view = create_or_merge_possession(
            &f.store,
            &f.admin,
            &record(
                &f,
                "Liberators",
                QuantityPatch {
                    on_sprue: Some(5),
                    ..Default::default()
                },
            ),
        )
        .await
        .unwrap();

        assert_eq!(view.figurine_definition.name, "Liberators");
        assert_eq!(view.figurine_definition.description, "Figurine Liberators.");
        assert_eq!(view.quantities.on_sprue, 5);
        assert_eq!(view.quantities.needed, 0);
        assert_eq!(view.user.id, f.admin.id);
    }

    #[tokio::test]
    async fn second_create_merges_into_same_possession() {
        let f = fixture();
        let first = create_or_merge_possession(
            &f.store,
            &f.admin,
            &record(
                &f,
                "Liberators",
                QuantityPatch {
                    on_sprue: Some(5),
                    painted: Some(1),
                    ..Default::default()
                },
            ),
        )
        .await
        .unwrap();
        let second = create_or_merge_possession(
            &f.store,
            &f.admin,
            &record(
                &f,
                "Liberators",
                QuantityPatch {
                    painted: Some(2),
                    ..Default::default()
                },
            ),
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantities.on_sprue, 5);
        assert_eq!(second.quantities.painted, 2);
        assert_eq!(f.store.list_possessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn negative_quantity_blocks_creation_entirely() {
        let f = fixture();
        let err = create_or_merge_possession(
            &f.store,
            &f.admin,
            &record(
                &f,
                "Liberators",
                QuantityPatch {
                    needed: Some(-2),
                    ..Default::default()
                },
            ),
        )
        .await
        .unwrap_err();

        assert_matches!(err, CoreError::InvalidQuantity { field: "needed", .. });
        assert!(f.store.list_definitions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_cannot_catalog_a_new_name() {
        let f = fixture();
        let err = create_or_merge_possession(
            &f.store,
            &f.user,
            &record(&f, "Liberators", QuantityPatch::default()),
        )
        .await
        .unwrap_err();
        assert_matches!(err, CoreError::Forbidden(_));
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_is_scoped_to_owner_and_sorted_by_name() {
        let f = fixture();
        possession_for(&f, &f.user, "Vindictors").await;
        possession_for(&f, &f.user, "Annihilators").await;
        possession_for(&f, &f.other, "Liberators").await;

        let names: Vec<_> = list_possessions(&f.store, f.user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.figurine_definition.name)
            .collect();

        assert_eq!(names, vec!["Annihilators", "Vindictors"]);
    }

    #[tokio::test]
    async fn catalog_and_possession_listings_share_one_name_order() {
        let f = fixture();
        for name in ["aelves", "Zephyrs", "Bloodreavers"] {
            possession_for(&f, &f.user, name).await;
        }

        let possessions: Vec<_> = list_possessions(&f.store, f.user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.figurine_definition.name)
            .collect();
        let catalog: Vec<_> = list_definitions(&f.store)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();

        assert_eq!(possessions, vec!["Bloodreavers", "Zephyrs", "aelves"]);
        assert_eq!(catalog, possessions);
    }

    #[tokio::test]
    async fn list_all_requires_admin() {
        let f = fixture();
        possession_for(&f, &f.user, "Vindictors").await;
        possession_for(&f, &f.other, "Liberators").await;

        assert_matches!(
            list_all_possessions(&f.store, &f.user).await,
            Err(CoreError::Forbidden(_))
        );
        let all = list_all_possessions(&f.store, &f.admin).await.unwrap();
        // The admin's own seed possessions are included.
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].figurine_definition.name, "Liberators");
    }

    #[tokio::test]
    async fn definitions_are_listed_by_name() {
        let f = fixture();
        possession_for(&f, &f.user, "Vindictors").await;
        possession_for(&f, &f.user, "Annihilators").await;

        let defs = list_definitions(&f.store).await.unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "Annihilators");
        assert_eq!(defs[0].faction.as_ref().unwrap().id, f.faction.id);
    }

    // -----------------------------------------------------------------------
    // getPossession
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_enforces_ownership() {
        let f = fixture();
        let mine = possession_for(&f, &f.user, "Liberators").await;

        assert!(get_possession(&f.store, &f.user, mine.id).await.is_ok());
        assert!(get_possession(&f.store, &f.admin, mine.id).await.is_ok());
        assert_matches!(
            get_possession(&f.store, &f.other, mine.id).await,
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(
            get_possession(&f.store, &f.user, 9999).await,
            Err(CoreError::NotFound { id: 9999, .. })
        );
    }

    // -----------------------------------------------------------------------
    // updatePossession
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn user_update_of_painted_preserves_other_quantities() {
        let f = fixture();
        let mine = possession_for(&f, &f.user, "Liberators").await;

        let updated = update_possession(&f.store, &f.user, mine.id, &payload(json!({ "painted": 9 })))
            .await
            .unwrap();

        assert_eq!(
            updated.quantities,
            Quantities {
                on_sprue: 3,
                assembled: 2,
                painted: 9,
                needed: 4
            }
        );
    }

    #[tokio::test]
    async fn user_update_with_name_is_rejected_and_nothing_changes() {
        let f = fixture();
        let mine = possession_for(&f, &f.user, "Liberators").await;

        let err = update_possession(
            &f.store,
            &f.user,
            mine.id,
            &payload(json!({ "onSprue": 5, "name": "X" })),
        )
        .await
        .unwrap_err();

        assert_matches!(err, CoreError::Forbidden(ref msg) if msg.contains("name"));
        let stored = f.store.find_possession(mine.id).await.unwrap().unwrap();
        assert_eq!(stored.quantities.on_sprue, 3);
    }

    #[tokio::test]
    async fn user_cannot_update_someone_elses_possession() {
        let f = fixture();
        let theirs = possession_for(&f, &f.other, "Liberators").await;

        let err = update_possession(&f.store, &f.user, theirs.id, &payload(json!({ "painted": 1 })))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Unauthorized(_));
    }

    #[tokio::test]
    async fn admin_update_cascades_to_definition() {
        let f = fixture();
        let theirs = possession_for(&f, &f.other, "Liberators").await;
        let new_type = f.store.add_figurine_type("Cavalry");

        let updated = update_possession(
            &f.store,
            &f.admin,
            theirs.id,
            &payload(json!({ "type": new_type.id, "description": "Hammers", "needed": 10 })),
        )
        .await
        .unwrap();

        assert_eq!(updated.quantities.needed, 10);
        assert_eq!(updated.figurine_definition.description, "Hammers");
        assert_eq!(
            updated.figurine_definition.figurine_type.as_ref().unwrap().name,
            "Cavalry"
        );
    }

    #[tokio::test]
    async fn admin_update_switches_faction() {
        let f = fixture();
        let theirs = possession_for(&f, &f.other, "Liberators").await;
        let nighthaunt = f.store.add_faction(f.faction.order_id, "Nighthaunt");

        let updated = update_possession(
            &f.store,
            &f.admin,
            theirs.id,
            &payload(json!({ "faction": nighthaunt.id })),
        )
        .await
        .unwrap();

        let faction = updated.figurine_definition.faction.as_ref().unwrap();
        assert_eq!(faction.id, nighthaunt.id);
        assert_eq!(faction.name, "Nighthaunt");
        assert_eq!(
            updated.figurine_definition.figurine_type.as_ref().unwrap().id,
            f.kind.id
        );
    }

    #[tokio::test]
    async fn admin_null_faction_leaves_reference_unchanged() {
        let f = fixture();
        let theirs = possession_for(&f, &f.other, "Liberators").await;

        let updated = update_possession(&f.store, &f.admin, theirs.id, &payload(json!({ "faction": null })))
            .await
            .unwrap();

        assert_eq!(
            updated.figurine_definition.faction.as_ref().unwrap().id,
            f.faction.id
        );
    }

    #[tokio::test]
    async fn admin_invalid_faction_touches_nothing() {
        let f = fixture();
        let theirs = possession_for(&f, &f.other, "Liberators").await;
        let writes_before = f.store.definition_writes();

        let err = update_possession(
            &f.store,
            &f.admin,
            theirs.id,
            &payload(json!({ "faction": 4040, "painted": 4, "description": "new" })),
        )
        .await
        .unwrap_err();

        assert_matches!(err, CoreError::InvalidReference { field: "faction", .. });
        let stored = f.store.find_possession(theirs.id).await.unwrap().unwrap();
        assert_eq!(stored.quantities.painted, 1);
        assert_eq!(f.store.definition_writes(), writes_before);
    }

    #[tokio::test]
    async fn admin_rename_to_taken_name_conflicts_after_quantities_are_written() {
        let f = fixture();
        let theirs = possession_for(&f, &f.other, "Liberators").await;
        possession_for(&f, &f.other, "Vindictors").await;

        let err = update_possession(
            &f.store,
            &f.admin,
            theirs.id,
            &payload(json!({ "name": "Vindictors", "painted": 3 })),
        )
        .await
        .unwrap_err();

        assert_matches!(err, CoreError::Conflict(_));
        let stored = f.store.find_possession(theirs.id).await.unwrap().unwrap();
        assert_eq!(stored.quantities.painted, 3);
        let def = f
            .store
            .find_definition(stored.figurine_definition_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(def.name, "Liberators");
    }

    #[tokio::test]
    async fn update_missing_possession_is_not_found() {
        let f = fixture();
        let err = update_possession(&f.store, &f.admin, 4242, &payload(json!({ "painted": 1 })))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { id: 4242, .. });
    }

    // -----------------------------------------------------------------------
    // deletePossession
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_is_admin_only_and_reports_missing_ids() {
        let f = fixture();
        let mine = possession_for(&f, &f.user, "Liberators").await;

        assert_matches!(
            delete_possession(&f.store, &f.user, mine.id).await,
            Err(CoreError::Forbidden(_))
        );
        delete_possession(&f.store, &f.admin, mine.id).await.unwrap();
        assert_matches!(
            delete_possession(&f.store, &f.admin, mine.id).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_internal() {
        let f = fixture();
        f.store.set_unavailable(true);
        assert_matches!(
            list_possessions(&f.store, f.user.id).await,
            Err(CoreError::Internal(_))
        );
    }
}
