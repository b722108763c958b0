//! Mutation Policy Engine.
//!
//! Turns `(caller, possession owner, update payload)` into a [`WritePlan`] or
//! a refusal. The decision is pure; executing the plan is left to
//! [`crate::figurines::update_possession`].
//!
//! Decision order:
//!
//! 1. Ownership gate: a non-admin may only act on their own possession
//!    ([`CoreError::Unauthorized`]).
//! 2. Field-scope gate: each role has a declarative allow-list
//!    ([`FieldScope`]). Any key outside it rejects the whole payload with
//!    [`CoreError::Forbidden`] naming every offending key.
//! 3. Quantity values must be non-negative integers
//!    ([`CoreError::InvalidQuantity`]).
//! 4. For admins, catalog fields become [`DefinitionChanges`]. A `null`
//!    faction or type means "not supplied"; a non-integer one is
//!    [`CoreError::InvalidReference`].
//!
//! Values are only inspected after step 2, so a mistyped key that the caller
//! may not send at all is still refused as out of scope.

use serde_json::Value;

use crate::definition::{DefinitionChanges, DEFAULT_IMAGE_URL};
use crate::error::CoreError;
use crate::payload::UpdatePayload;
use crate::possession::{QuantityPatch, QUANTITY_FIELDS};
use crate::roles::{Caller, Role};
use crate::types::DbId;

/// The set of payload keys a role may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    /// Quantities only.
    User,
    /// Every possession field, plus catalog fields cascaded to the definition.
    Admin,
}

impl FieldScope {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::User => FieldScope::User,
            Role::Admin => FieldScope::Admin,
        }
    }

    /// The explicit allow-list, or `None` when every field is allowed.
    pub fn allowed_fields(&self) -> Option<&'static [&'static str]> {
        match self {
            FieldScope::User => Some(&QUANTITY_FIELDS),
            FieldScope::Admin => None,
        }
    }

    pub fn permits(&self, field: &str) -> bool {
        self.allowed_fields()
            .map_or(true, |allowed| allowed.contains(&field))
    }
}

/// What an authorized update will write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    pub quantities: QuantityPatch,
    /// Always empty for non-admin callers.
    pub definition: DefinitionChanges,
}

/// Step 1: reject a non-admin acting on someone else's possession.
pub fn check_ownership(caller: &Caller, owner_id: DbId) -> Result<(), CoreError> {
    if caller.is_admin() || caller.id == owner_id {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(
            "Not allowed to access this possession (not the owner and not an administrator)"
                .into(),
        ))
    }
}

/// Step 2: reject the payload if any key falls outside `scope`.
pub fn check_field_scope(scope: FieldScope, payload: &UpdatePayload) -> Result<(), CoreError> {
    let disallowed: Vec<&str> = payload
        .proposed_fields()
        .into_iter()
        .filter(|field| !scope.permits(field))
        .collect();

    if disallowed.is_empty() {
        return Ok(());
    }
    Err(CoreError::Forbidden(format!(
        "You are not allowed to modify the following fields: {}. Only the quantity fields ({}) may be modified.",
        disallowed.join(", "),
        QUANTITY_FIELDS.join(", ")
    )))
}

fn quantity(field: &'static str, value: Option<&Value>) -> Result<Option<i64>, CoreError> {
    match value {
        None => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| CoreError::InvalidQuantity {
            field,
            reason: format!("must be a non-negative integer, got {v}"),
        }),
    }
}

fn quantity_patch(payload: &UpdatePayload) -> Result<QuantityPatch, CoreError> {
    let patch = QuantityPatch {
        on_sprue: quantity("onSprue", payload.on_sprue.as_ref())?,
        assembled: quantity("assembled", payload.assembled.as_ref())?,
        painted: quantity("painted", payload.painted.as_ref())?,
        needed: quantity("needed", payload.needed.as_ref())?,
    };
    patch.checked()?;
    Ok(patch)
}

/// `null` means "not supplied"; anything but an integer id is unresolvable.
fn reference(field: &'static str, value: Option<&Value>) -> Result<Option<DbId>, CoreError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| CoreError::InvalidReference {
                field,
                value: v.to_string(),
            }),
    }
}

/// `Ok(None)` for omitted, `Ok(Some(None))` for `null`.
fn text(field: &str, value: Option<&Value>) -> Result<Option<Option<String>>, CoreError> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(CoreError::Validation(format!("{field} must be a string"))),
    }
}

fn definition_changes(payload: &UpdatePayload) -> Result<DefinitionChanges, CoreError> {
    let name = match text("name", payload.name.as_ref())? {
        None => None,
        Some(None) => return Err(CoreError::Validation("name cannot be null".into())),
        Some(Some(name)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CoreError::Validation("name must not be empty".into()));
            }
            Some(name.to_string())
        }
    };
    let description =
        text("description", payload.description.as_ref())?.map(Option::unwrap_or_default);
    let image_url = text("imageUrl", payload.image_url.as_ref())?.map(|u| {
        u.as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_IMAGE_URL)
            .to_string()
    });

    Ok(DefinitionChanges {
        name,
        description,
        image_url,
        faction_id: reference("faction", payload.faction.as_ref())?,
        figurine_type_id: reference("type", payload.figurine_type.as_ref())?,
    })
}

/// Decide whether `caller` may apply `payload` to a possession owned by
/// `owner_id`, and what exactly would be written.
///
/// Nothing is written here; every refusal happens before any write.
pub fn plan_update(
    caller: &Caller,
    owner_id: DbId,
    payload: &UpdatePayload,
) -> Result<WritePlan, CoreError> {
    check_ownership(caller, owner_id)?;

    let scope = FieldScope::for_role(caller.role);
    check_field_scope(scope, payload)?;

    let quantities = quantity_patch(payload)?;
    let definition = match scope {
        FieldScope::User => DefinitionChanges::default(),
        FieldScope::Admin => definition_changes(payload)?,
    };

    Ok(WritePlan {
        quantities,
        definition,
    })
}
