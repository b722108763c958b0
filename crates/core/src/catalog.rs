//! Catalog Store: resolving, creating and updating figurine definitions.

use crate::definition::{
    normalize_name, placeholder_description, DefinitionChanges, DefinitionFields,
    FigurineDefinition, NewDefinition,
};
use crate::error::{CoreError, StoreError};
use crate::ports::{DefinitionRepository, ReferenceRepository};
use crate::roles::Caller;
use crate::types::{DbId, Resolved};

/// Check that the supplied faction and type ids resolve, faction first.
///
/// `None` means "not being changed" and is skipped.
pub async fn validate_references<S>(
    store: &S,
    faction_id: Option<DbId>,
    figurine_type_id: Option<DbId>,
) -> Result<(), CoreError>
where
    S: ReferenceRepository + ?Sized,
{
    if let Some(id) = faction_id {
        if store.find_faction(id).await?.is_none() {
            return Err(CoreError::unknown_reference("faction", id));
        }
    }
    if let Some(id) = figurine_type_id {
        if store.find_figurine_type(id).await?.is_none() {
            return Err(CoreError::unknown_reference("type", id));
        }
    }
    Ok(())
}

/// Find the definition called `name`, or create it from `fields`.
///
/// An existing definition is returned unchanged. Creating one requires a
/// privileged caller and resolvable `faction` and `type` ids. If a concurrent
/// writer wins the insert race the definition it created is returned.
pub async fn resolve_or_create_definition<S>(
    store: &S,
    caller: &Caller,
    name: &str,
    fields: &DefinitionFields,
) -> Result<Resolved<FigurineDefinition>, CoreError>
where
    S: DefinitionRepository + ReferenceRepository + ?Sized,
{
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(CoreError::Validation("name is required".into()));
    }

    if let Some(existing) = store.find_definition_by_name(name).await? {
        tracing::debug!(definition_id = existing.id, name, "Found existing definition");
        return Ok(Resolved::Existing(existing));
    }

    if !caller.is_admin() {
        return Err(CoreError::Forbidden(
            "Only administrators may add new figurine definitions".into(),
        ));
    }

    let faction_id = fields
        .faction
        .ok_or_else(|| CoreError::missing_reference("faction"))?;
    let figurine_type_id = fields
        .figurine_type
        .ok_or_else(|| CoreError::missing_reference("type"))?;
    validate_references(store, Some(faction_id), Some(figurine_type_id)).await?;

    let input = NewDefinition::with_defaults(
        name,
        fields,
        faction_id,
        figurine_type_id,
        placeholder_description,
    );

    match store.insert_definition(&input).await {
        Ok(created) => {
            tracing::info!(definition_id = created.id, name, "Created figurine definition");
            Ok(Resolved::Created(created))
        }
        Err(err @ StoreError::Conflict { .. }) => {
            // Someone else created it between our lookup and insert.
            store
                .find_definition_by_name(name)
                .await?
                .map(Resolved::Existing)
                .ok_or_else(|| err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Apply `changes` to definition `definition_id`.
///
/// Replaced faction/type ids are re-validated first. With no recognized
/// field present nothing is written and the current definition is returned.
/// Only privileged callers may reach this; the policy engine enforces that.
pub async fn update_definition<S>(
    store: &S,
    definition_id: DbId,
    changes: &DefinitionChanges,
) -> Result<FigurineDefinition, CoreError>
where
    S: DefinitionRepository + ReferenceRepository + ?Sized,
{
    let not_found = || CoreError::NotFound {
        entity: "FigurineDefinition",
        id: definition_id,
    };

    if changes.is_empty() {
        return store
            .find_definition(definition_id)
            .await?
            .ok_or_else(not_found);
    }

    if let Some(name) = &changes.name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()));
        }
    }
    validate_references(store, changes.faction_id, changes.figurine_type_id).await?;

    let updated = store
        .update_definition(definition_id, changes)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(
        definition_id,
        name = %updated.name,
        "Figurine definition updated by admin"
    );
    Ok(updated)
}
