//! Possession records and the Possession Store logic.
//!
//! A possession is one user's ownership and progress record for one catalog
//! definition. At most one exists per (definition, user) pair.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StoreError};
use crate::ports::PossessionRepository;
use crate::types::{DbId, Resolved, Timestamp};

/// Wire names of the quantity fields, in display order.
pub const QUANTITY_FIELDS: [&str; 4] = ["onSprue", "assembled", "painted", "needed"];

/// Build and paint progress counts. Every value is `>= 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantities {
    pub on_sprue: i32,
    pub assembled: i32,
    pub painted: i32,
    pub needed: i32,
}

impl Quantities {
    /// Return a copy with every field present in `patch` overwritten.
    ///
    /// All present values are checked before any is applied, so an invalid
    /// value leaves nothing half-merged.
    pub fn merged(&self, patch: &QuantityPatch) -> Result<Quantities, CoreError> {
        let [on_sprue, assembled, painted, needed] = patch.checked()?;
        Ok(Quantities {
            on_sprue: on_sprue.unwrap_or(self.on_sprue),
            assembled: assembled.unwrap_or(self.assembled),
            painted: painted.unwrap_or(self.painted),
            needed: needed.unwrap_or(self.needed),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Possession {
    pub id: DbId,
    pub figurine_definition_id: DbId,
    /// Immutable after creation.
    pub user_id: DbId,
    #[serde(flatten)]
    pub quantities: Quantities,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPossession {
    pub figurine_definition_id: DbId,
    pub user_id: DbId,
    pub quantities: Quantities,
}

/// Proposed quantity values. `None` means "leave untouched".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityPatch {
    pub on_sprue: Option<i64>,
    pub assembled: Option<i64>,
    pub painted: Option<i64>,
    pub needed: Option<i64>,
}

impl QuantityPatch {
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_none())
    }

    fn entries(&self) -> [(&'static str, Option<i64>); 4] {
        [
            (QUANTITY_FIELDS[0], self.on_sprue),
            (QUANTITY_FIELDS[1], self.assembled),
            (QUANTITY_FIELDS[2], self.painted),
            (QUANTITY_FIELDS[3], self.needed),
        ]
    }

    /// Range-check every present value, in field order.
    pub fn checked(&self) -> Result<[Option<i32>; 4], CoreError> {
        let mut out = [None; 4];
        for (slot, (field, value)) in out.iter_mut().zip(self.entries()) {
            if let Some(value) = value {
                *slot = Some(check_quantity(field, value)?);
            }
        }
        Ok(out)
    }
}

fn check_quantity(field: &'static str, value: i64) -> Result<i32, CoreError> {
    if value < 0 {
        return Err(CoreError::InvalidQuantity {
            field,
            reason: format!("must not be negative (got {value})"),
        });
    }
    i32::try_from(value).map_err(|_| CoreError::InvalidQuantity {
        field,
        reason: format!("{value} exceeds the maximum of {}", i32::MAX),
    })
}

/// Overwrite the quantities present in `patch`; absent fields are untouched.
///
/// Negative values are rejected with [`CoreError::InvalidQuantity`] before
/// anything is written. Returns whether any value actually changed.
pub fn apply_quantities(possession: &mut Possession, patch: &QuantityPatch) -> Result<bool, CoreError> {
    let merged = possession.quantities.merged(patch)?;
    let changed = merged != possession.quantities;
    possession.quantities = merged;
    Ok(changed)
}

/// Look up the possession for `(definition_id, user_id)`, creating it when absent.
///
/// An existing possession is returned as-is; `initial` only seeds a new
/// record, with unsupplied quantities defaulting to 0. A uniqueness conflict
/// on insert means a concurrent writer created the record first, in which
/// case that record is returned.
pub async fn resolve_or_create_possession<S>(
    store: &S,
    definition_id: DbId,
    user_id: DbId,
    initial: &QuantityPatch,
) -> Result<Resolved<Possession>, CoreError>
where
    S: PossessionRepository + ?Sized,
{
    if let Some(existing) = store.find_possession_for(definition_id, user_id).await? {
        return Ok(Resolved::Existing(existing));
    }

    let input = NewPossession {
        figurine_definition_id: definition_id,
        user_id,
        quantities: Quantities::default().merged(initial)?,
    };

    match store.insert_possession(&input).await {
        Ok(created) => {
            tracing::info!(
                possession_id = created.id,
                definition_id,
                user_id,
                "Created possession"
            );
            Ok(Resolved::Created(created))
        }
        Err(err @ StoreError::Conflict { .. }) => store
            .find_possession_for(definition_id, user_id)
            .await?
            .map(Resolved::Existing)
            .ok_or_else(|| err.into()),
        Err(err) => Err(err.into()),
    }
}

/// Apply `patch` to `possession` and persist it if anything changed.
pub async fn merge_quantities<S>(
    store: &S,
    mut possession: Possession,
    patch: &QuantityPatch,
) -> Result<Possession, CoreError>
where
    S: PossessionRepository + ?Sized,
{
    if !apply_quantities(&mut possession, patch)? {
        return Ok(possession);
    }
    let id = possession.id;
    store
        .save_quantities(id, &possession.quantities)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Possession",
            id,
        })
}

/// Remove a possession. Authorization is the caller's concern.
pub async fn delete_possession<S>(store: &S, id: DbId) -> Result<(), CoreError>
where
    S: PossessionRepository + ?Sized,
{
    if store.delete_possession(id).await? {
        tracing::info!(possession_id = id, "Deleted possession");
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "Possession",
            id,
        })
    }
}
