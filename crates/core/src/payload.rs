//! Request payloads accepted by the figurine operations.
//!
//! Create and import payloads treat `null` like an omitted field. The update
//! payload keeps the two apart because the policy engine must know exactly
//! which keys a caller sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::definition::DefinitionFields;
use crate::possession::QuantityPatch;

/// A create-or-merge request, also the shape of one bulk import record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FigurineRecord {
    pub name: String,
    #[serde(flatten)]
    pub definition: DefinitionFields,
    #[serde(flatten)]
    pub quantities: QuantityPatch,
}

/// Deserialize a field that was present in the payload, keeping `null`.
///
/// Combined with `#[serde(default)]` this yields `None` for an omitted key
/// and `Some(Value::Null)` for an explicit `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// An update request against an existing possession.
///
/// Values stay raw JSON until the policy has checked the key set, so a
/// mistyped field is judged by the same rules as any other key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub faction: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub figurine_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub on_sprue: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub assembled: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub painted: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub needed: Option<Value>,
    /// Keys that are not figurine fields at all.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl UpdatePayload {
    /// Wire names of every key present in the payload, `null` included.
    ///
    /// Known fields come first in declaration order, then unknown keys
    /// sorted.
    pub fn proposed_fields(&self) -> Vec<&str> {
        let known = [
            ("name", self.name.is_some()),
            ("description", self.description.is_some()),
            ("imageUrl", self.image_url.is_some()),
            ("faction", self.faction.is_some()),
            ("type", self.figurine_type.is_some()),
            ("onSprue", self.on_sprue.is_some()),
            ("assembled", self.assembled.is_some()),
            ("painted", self.painted.is_some()),
            ("needed", self.needed.is_some()),
        ];
        known
            .into_iter()
            .filter_map(|(field, present)| present.then_some(field))
            .chain(self.unknown.keys().map(String::as_str))
            .collect()
    }
}
