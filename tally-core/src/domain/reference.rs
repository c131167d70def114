//! Record identifiers and reference (lookup) fields

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Identifier assigned by the hosted store. Never generated client-side.
pub type RecordId = i64;

/// A reference field as read back from the store
///
/// The backend resolves references to `{ "Id": 3, "Name": "Food" }` when the
/// projection asks for the referenced name, and returns the bare id otherwise.
/// Both shapes deserialize into a `Lookup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LookupRepr")]
pub struct Lookup {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Lookup {
    pub fn new(id: RecordId) -> Self {
        Self { id, name: None }
    }

    /// Display name, falling back to the id
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LookupRepr {
    Bare(RecordId),
    Object {
        #[serde(rename = "Id")]
        id: RecordId,
        #[serde(rename = "Name", default)]
        name: Option<String>,
    },
}

impl From<LookupRepr> for Lookup {
    fn from(repr: LookupRepr) -> Self {
        match repr {
            LookupRepr::Bare(id) => Lookup { id, name: None },
            LookupRepr::Object { id, name } => Lookup { id, name },
        }
    }
}

/// A reference as supplied by a caller on write
///
/// Callers hand over whatever they hold: the id itself, the id as text
/// (form inputs), or a previously fetched lookup object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceInput {
    Id(RecordId),
    Lookup(Lookup),
    Text(String),
}

impl ReferenceInput {
    /// The bare identifier, if one can be recovered
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            ReferenceInput::Id(id) => Some(*id),
            ReferenceInput::Lookup(lookup) => Some(lookup.id),
            ReferenceInput::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Wire value: always the bare id when one exists
    ///
    /// Text that is not an id is passed through untouched and left for the
    /// backend to accept or reject.
    pub fn to_wire(&self) -> JsonValue {
        match (self.record_id(), self) {
            (Some(id), _) => JsonValue::from(id),
            (None, ReferenceInput::Text(text)) => JsonValue::from(text.clone()),
            (None, _) => JsonValue::Null,
        }
    }
}

impl From<RecordId> for ReferenceInput {
    fn from(id: RecordId) -> Self {
        ReferenceInput::Id(id)
    }
}

impl From<Lookup> for ReferenceInput {
    fn from(lookup: Lookup) -> Self {
        ReferenceInput::Lookup(lookup)
    }
}
