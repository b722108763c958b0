//! Bulk Import Orchestrator.
//!
//! Runs a batch of create-or-merge records for the calling admin, one at a
//! time and in input order. A record that fails is logged in the report and
//! the batch moves on; only a store outage aborts the whole call.

use std::collections::HashMap;

use serde::Serialize;

use crate::definition::{
    import_placeholder_description, normalize_name, FigurineDefinition, NewDefinition,
};
use crate::error::{CoreError, StoreError};
use crate::payload::FigurineRecord;
use crate::ports::FigurineStore;
use crate::possession::{merge_quantities, resolve_or_create_possession};
use crate::reference::{Faction, FigurineType};
use crate::roles::Caller;
use crate::types::{DbId, Resolved};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    /// A new possession was created.
    Success,
    /// An existing possession had quantities merged in.
    Updated,
    Failed,
}

/// One line of the per-item log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub status: ImportStatus,
    pub name: String,
    /// The possession id, for records that did not fail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success_count: usize,
    pub update_count: usize,
    pub failure_count: usize,
    pub results: Vec<ImportOutcome>,
}

impl ImportReport {
    fn push(&mut self, outcome: ImportOutcome) {
        match outcome.status {
            ImportStatus::Success => self.success_count += 1,
            ImportStatus::Updated => self.update_count += 1,
            ImportStatus::Failed => self.failure_count += 1,
        }
        self.results.push(outcome);
    }

    /// True when at least one record failed.
    pub fn is_partial(&self) -> bool {
        self.failure_count > 0
    }

    pub fn message(&self) -> String {
        if self.is_partial() {
            format!(
                "Import completed with errors: {} created, {} updated, {} failed",
                self.success_count, self.update_count, self.failure_count
            )
        } else {
            format!(
                "Import completed: {} created, {} updated",
                self.success_count, self.update_count
            )
        }
    }
}

/// Batch-local lookups, loaded once before the first record.
///
/// Definitions created by earlier records are added here so later records in
/// the same batch find them without another store read.
#[derive(Debug, Default)]
pub struct BatchLookup {
    definitions: HashMap<String, FigurineDefinition>,
    factions: HashMap<DbId, Faction>,
    figurine_types: HashMap<DbId, FigurineType>,
}

impl BatchLookup {
    pub async fn preload<S>(store: &S) -> Result<Self, StoreError>
    where
        S: FigurineStore + ?Sized,
    {
        let definitions = store
            .list_definitions()
            .await?
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        let factions = store
            .list_factions()
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();
        let figurine_types = store
            .list_figurine_types()
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        Ok(Self {
            definitions,
            factions,
            figurine_types,
        })
    }

    pub fn definition(&self, name: &str) -> Option<&FigurineDefinition> {
        self.definitions.get(name)
    }

    pub fn remember(&mut self, definition: FigurineDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    /// Resolve the record's faction and type ids against the preloaded sets.
    fn references(&self, record: &FigurineRecord) -> Result<(DbId, DbId), CoreError> {
        let faction_id = match record.definition.faction {
            None => return Err(CoreError::missing_reference("faction")),
            Some(id) if !self.factions.contains_key(&id) => {
                return Err(CoreError::unknown_reference("faction", id))
            }
            Some(id) => id,
        };
        let figurine_type_id = match record.definition.figurine_type {
            None => return Err(CoreError::missing_reference("type")),
            Some(id) if !self.figurine_types.contains_key(&id) => {
                return Err(CoreError::unknown_reference("type", id))
            }
            Some(id) => id,
        };
        Ok((faction_id, figurine_type_id))
    }
}

fn record_name(value: &serde_json::Value) -> String {
    value
        .get("name")
        .and_then(serde_json::Value::as_str)
        .map(|n| normalize_name(n).to_string())
        .unwrap_or_default()
}

/// Resolve the record's definition from the batch lookup, inserting it if new.
async fn resolve_definition<S>(
    store: &S,
    lookup: &mut BatchLookup,
    name: &str,
    record: &FigurineRecord,
) -> Result<FigurineDefinition, CoreError>
where
    S: FigurineStore + ?Sized,
{
    if let Some(existing) = lookup.definition(name) {
        return Ok(existing.clone());
    }

    let (faction_id, figurine_type_id) = lookup.references(record)?;
    let input = NewDefinition::with_defaults(
        name,
        &record.definition,
        faction_id,
        figurine_type_id,
        import_placeholder_description,
    );
    let definition = match store.insert_definition(&input).await {
        Ok(created) => {
            tracing::info!(definition_id = created.id, name, "Created definition during import");
            created
        }
        Err(err @ StoreError::Conflict { .. }) => store
            .find_definition_by_name(name)
            .await?
            .ok_or_else(|| CoreError::from(err))?,
        Err(err) => return Err(err.into()),
    };
    lookup.remember(definition.clone());
    Ok(definition)
}

async fn import_record<S>(
    store: &S,
    caller: &Caller,
    lookup: &mut BatchLookup,
    value: serde_json::Value,
) -> Result<(ImportStatus, DbId), CoreError>
where
    S: FigurineStore + ?Sized,
{
    let record: FigurineRecord = serde_json::from_value(value)
        .map_err(|e| CoreError::Validation(format!("Malformed record: {e}")))?;
    let name = normalize_name(&record.name);
    if name.is_empty() {
        return Err(CoreError::Validation("name is required".into()));
    }
    record.quantities.checked()?;

    let definition = resolve_definition(store, lookup, name, &record).await?;

    match resolve_or_create_possession(store, definition.id, caller.id, &record.quantities).await? {
        Resolved::Created(created) => Ok((ImportStatus::Success, created.id)),
        Resolved::Existing(existing) => {
            let merged = merge_quantities(store, existing, &record.quantities).await?;
            Ok((ImportStatus::Updated, merged.id))
        }
    }
}

/// Import `records` as possessions of the calling admin.
///
/// Each record is decoded on its own, so a malformed entry only fails that
/// entry. Returns `Err` only for an empty batch, a non-admin caller or a
/// store outage.
pub async fn bulk_import<S>(
    store: &S,
    caller: &Caller,
    records: Vec<serde_json::Value>,
) -> Result<ImportReport, CoreError>
where
    S: FigurineStore + ?Sized,
{
    if !caller.is_admin() {
        return Err(CoreError::Forbidden(
            "Only administrators may bulk import figurines".into(),
        ));
    }
    if records.is_empty() {
        return Err(CoreError::Validation(
            "No figurines provided for import".into(),
        ));
    }

    let mut lookup = BatchLookup::preload(store).await?;
    let mut report = ImportReport::default();

    for (index, value) in records.into_iter().enumerate() {
        let name = record_name(&value);
        match import_record(store, caller, &mut lookup, value).await {
            Ok((status, id)) => report.push(ImportOutcome {
                status,
                name,
                id: Some(id),
                reason: None,
            }),
            // The store itself is failing; later records would fail the same way.
            Err(err @ CoreError::Internal(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(index, name = %name, error = %err, "Import record failed");
                report.push(ImportOutcome {
                    status: ImportStatus::Failed,
                    name,
                    id: None,
                    reason: Some(err.to_string()),
                });
            }
        }
    }

    tracing::info!(
        user_id = caller.id,
        success = report.success_count,
        updated = report.update_count,
        failed = report.failure_count,
        "Bulk import finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::ports::{DefinitionRepository, PossessionRepository};
    use crate::roles::Role;

    fn setup() -> (MemoryStore, Caller, Faction, FigurineType) {
        let store = MemoryStore::new();
        let (faction, kind) = store.seed_faction_and_type();
        let admin = store.add_user("admin", Role::Admin);
        (store, Caller::admin(admin.id), faction, kind)
    }

    #[tokio::test]
    async fn bad_reference_fails_only_its_own_record() {
        let (store, admin, faction, kind) = setup();
        let records = vec![
            json!({ "name": "Liberators", "faction": faction.id, "type": kind.id, "onSprue": 5 }),
            json!({ "name": "Ghosts", "faction": 4040, "type": kind.id }),
            json!({ "name": "Vindictors", "faction": faction.id, "type": kind.id, "painted": 2 }),
        ];

        let report = bulk_import(&store, &admin, records).await.unwrap();

        assert_eq!(report.success_count + report.update_count, 2);
        assert_eq!(report.failure_count, 1);
        assert!(report.is_partial());

        let failed = &report.results[1];
        assert_eq!(failed.status, ImportStatus::Failed);
        assert_eq!(failed.name, "Ghosts");
        assert!(failed.reason.as_deref().unwrap().contains("faction"));
        assert_eq!(failed.id, None);

        assert!(store.find_definition_by_name("Liberators").await.unwrap().is_some());
        assert!(store.find_definition_by_name("Vindictors").await.unwrap().is_some());
        assert!(store.find_definition_by_name("Ghosts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_record_is_isolated_at_either_end_of_the_batch() {
        for bad_at in [0, 2] {
            let (store, admin, faction, kind) = setup();
            let mut records = vec![
                json!({ "name": "Liberators", "faction": faction.id, "type": kind.id }),
                json!({ "name": "Vindictors", "faction": faction.id, "type": kind.id }),
            ];
            let bad = json!({ "name": "Ghosts", "faction": faction.id, "type": 4040 });
            records.insert(bad_at, bad);

            let report = bulk_import(&store, &admin, records).await.unwrap();

            assert_eq!(report.success_count, 2, "bad record at {bad_at}");
            assert_eq!(report.failure_count, 1, "bad record at {bad_at}");
            assert_eq!(report.results[bad_at].status, ImportStatus::Failed);
            assert_eq!(report.results[bad_at].name, "Ghosts");

            for name in ["Liberators", "Vindictors"] {
                let definition = store
                    .find_definition_by_name(name)
                    .await
                    .unwrap()
                    .unwrap_or_else(|| panic!("{name} missing, bad record at {bad_at}"));
                let possession = store
                    .find_possession_for(definition.id, admin.id)
                    .await
                    .unwrap();
                assert!(possession.is_some(), "{name} possession missing");
            }
            assert!(store.find_definition_by_name("Ghosts").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn repeated_name_in_batch_reuses_definition_and_possession() {
        let (store, admin, faction, kind) = setup();
        let records = vec![
            json!({ "name": "Liberators", "faction": faction.id, "type": kind.id, "onSprue": 5 }),
            json!({ "name": "Liberators", "painted": 1 }),
        ];

        let report = bulk_import(&store, &admin, records).await.unwrap();

        assert_eq!(report.results[0].status, ImportStatus::Success);
        assert_eq!(report.results[1].status, ImportStatus::Updated);
        assert_eq!(report.results[0].id, report.results[1].id);
        assert_eq!(store.definition_writes(), 1);

        let possession = store
            .find_possession(report.results[0].id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(possession.quantities.on_sprue, 5);
        assert_eq!(possession.quantities.painted, 1);
    }

    #[tokio::test]
    async fn imported_definition_gets_import_placeholder() {
        let (store, admin, faction, kind) = setup();
        bulk_import(
            &store,
            &admin,
            vec![json!({ "name": "Liberators", "faction": faction.id, "type": kind.id })],
        )
        .await
        .unwrap();

        let def = store
            .find_definition_by_name("Liberators")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(def.description, "Definition of figurine Liberators.");
    }

    #[tokio::test]
    async fn malformed_and_negative_records_are_item_failures() {
        let (store, admin, faction, kind) = setup();
        let records = vec![
            json!({ "name": "Liberators", "faction": "not-a-number", "type": kind.id }),
            json!({ "name": "Vindictors", "faction": faction.id, "type": kind.id, "needed": -1 }),
            json!({ "faction": faction.id, "type": kind.id }),
            json!({ "name": "Prosecutors", "faction": faction.id, "type": kind.id }),
        ];

        let report = bulk_import(&store, &admin, records).await.unwrap();

        assert_eq!(report.failure_count, 3);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.results[0].name, "Liberators");
        assert!(report.results[1].reason.as_deref().unwrap().contains("needed"));
        assert_eq!(report.results[2].name, "");
        assert_eq!(store.list_possessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let (store, admin, _, _) = setup();
        assert_matches!(
            bulk_import(&store, &admin, Vec::new()).await,
            Err(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let (store, _, faction, kind) = setup();
        let user = store.add_user("alice", Role::User);
        let err = bulk_import(
            &store,
            &Caller::user(user.id),
            vec![json!({ "name": "Liberators", "faction": faction.id, "type": kind.id })],
        )
        .await
        .unwrap_err();
        assert_matches!(err, CoreError::Forbidden(_));
    }

    #[tokio::test]
    async fn store_outage_is_fatal() {
        let (store, admin, faction, kind) = setup();
        store.set_unavailable(true);

        let err = bulk_import(
            &store,
            &admin,
            vec![json!({ "name": "Liberators", "faction": faction.id, "type": kind.id })],
        )
        .await
        .unwrap_err();
        assert_matches!(err, CoreError::Internal(_));
    }

    #[test]
    fn report_serializes_camel_case_and_omits_empty_fields() {
        let mut report = ImportReport::default();
        report.push(ImportOutcome {
            status: ImportStatus::Updated,
            name: "Liberators".into(),
            id: Some(7),
            reason: None,
        });

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["updateCount"], 1);
        assert_eq!(value["results"][0], json!({ "status": "updated", "name": "Liberators", "id": 7 }));
        assert!(!report.is_partial());
        assert_eq!(report.message(), "Import completed: 0 created, 1 updated");
    }
}
