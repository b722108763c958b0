//! The shared catalog entry describing one figurine design.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Image shown for definitions created without one.
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/150";

/// A row of the catalog. `name` is globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FigurineDefinition {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub faction_id: DbId,
    pub figurine_type_id: DbId,
    pub image_url: String,
    pub created_at: Timestamp,
}

/// Definition attributes carried alongside a name in create and import payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionFields {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub faction: Option<DbId>,
    #[serde(rename = "type")]
    pub figurine_type: Option<DbId>,
}

/// Insert DTO for a new definition. Defaults are resolved before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDefinition {
    pub name: String,
    pub description: String,
    pub faction_id: DbId,
    pub figurine_type_id: DbId,
    pub image_url: String,
}

impl NewDefinition {
    /// Build an insert DTO, filling in `description` and `image_url` defaults.
    ///
    /// `placeholder` renders the description used when none is supplied.
    pub fn with_defaults(
        name: &str,
        fields: &DefinitionFields,
        faction_id: DbId,
        figurine_type_id: DbId,
        placeholder: fn(&str) -> String,
    ) -> Self {
        let description = fields
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map_or_else(|| placeholder(name), str::to_string);
        let image_url = fields
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_IMAGE_URL)
            .to_string();
        Self {
            name: name.to_string(),
            description,
            faction_id,
            figurine_type_id,
            image_url,
        }
    }
}

/// Description given to a definition created through a single possession write.
pub fn placeholder_description(name: &str) -> String {
    format!("Figurine {name}.")
}

/// Description given to a definition created by a bulk import.
pub fn import_placeholder_description(name: &str) -> String {
    format!("Definition of figurine {name}.")
}

/// Update DTO for a definition. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub faction_id: Option<DbId>,
    pub figurine_type_id: Option<DbId>,
}

impl DefinitionChanges {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.faction_id.is_none()
            && self.figurine_type_id.is_none()
    }

    /// Apply the present fields to an in-memory definition.
    pub fn apply_to(&self, definition: &mut FigurineDefinition) {
        if let Some(name) = &self.name {
            definition.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            definition.description.clone_from(description);
        }
        if let Some(image_url) = &self.image_url {
            definition.image_url.clone_from(image_url);
        }
        if let Some(faction_id) = self.faction_id {
            definition.faction_id = faction_id;
        }
        if let Some(figurine_type_id) = self.figurine_type_id {
            definition.figurine_type_id = figurine_type_id;
        }
    }
}

/// Normalize a definition name the way the catalog stores it.
pub fn normalize_name(name: &str) -> &str {
    name.trim()
}
