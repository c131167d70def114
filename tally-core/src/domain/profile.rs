//! Profile domain model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::reference::{Lookup, RecordId};

/// A profile row as stored in the `profiles_c` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Option<String>,
    #[serde(rename = "Owner", default)]
    pub owner: Option<Lookup>,
    #[serde(rename = "CreatedOn", default)]
    pub created_on: Option<String>,
    #[serde(rename = "CreatedBy", default)]
    pub created_by: Option<Lookup>,
    #[serde(rename = "ModifiedOn", default)]
    pub modified_on: Option<String>,
    #[serde(rename = "ModifiedBy", default)]
    pub modified_by: Option<Lookup>,

    /// Display name entered by the user
    #[serde(default)]
    pub name_c: Option<String>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_c: Option<String>,
    /// Personal website URL
    #[serde(default)]
    pub website_c: Option<String>,
    #[serde(default)]
    pub bio_c: Option<String>,
}

impl Profile {
    /// Best display name: the row name, then the user-entered name
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| non_empty(self.name_c.as_deref()))
    }
}

/// Fields accepted when creating a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_c: Option<String>,
}

impl ProfileDraft {
    /// Build the single record submitted on create
    ///
    /// `Name` falls back to `name_c` when no explicit row name is given.
    pub fn to_payload(&self) -> JsonValue {
        let mut record = Map::new();
        let row_name = non_empty(self.name.as_deref()).or_else(|| non_empty(self.name_c.as_deref()));
        insert_opt(&mut record, "Name", row_name);
        insert_opt(&mut record, "name_c", self.name_c.as_deref());
        insert_opt(&mut record, "avatar_c", self.avatar_c.as_deref());
        insert_opt(&mut record, "website_c", self.website_c.as_deref());
        insert_opt(&mut record, "bio_c", self.bio_c.as_deref());
        JsonValue::Object(record)
    }
}

/// Sparse profile update: only `Some` fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_c: Option<String>,
}

impl ProfilePatch {
    /// Build the single record submitted on update
    pub fn to_payload(&self, id: RecordId) -> JsonValue {
        let mut record = Map::new();
        record.insert("Id".to_string(), JsonValue::from(id));
        insert_opt(&mut record, "Name", self.name.as_deref());
        insert_opt(&mut record, "name_c", self.name_c.as_deref());
        insert_opt(&mut record, "avatar_c", self.avatar_c.as_deref());
        insert_opt(&mut record, "website_c", self.website_c.as_deref());
        insert_opt(&mut record, "bio_c", self.bio_c.as_deref());
        JsonValue::Object(record)
    }

    pub fn is_empty(&self) -> bool {
        self == &ProfilePatch::default()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn insert_opt(record: &mut Map<String, JsonValue>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        record.insert(key.to_string(), JsonValue::from(v));
    }
}
