//! Hosted-table client port
//!
//! The hosted backend exposes generic CRUD over named tables. Every call
//! returns a `TableResponse`; batch writes additionally report one
//! `RecordOutcome` per submitted record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::result::Result;
use crate::domain::RecordId;

/// A column to project in a fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: FieldName,
    /// For reference columns: which column of the referenced row to resolve
    #[serde(rename = "referenceField", default, skip_serializing_if = "Option::is_none")]
    pub reference_field: Option<ReferenceField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceField {
    pub field: FieldName,
}

impl FieldSpec {
    /// A plain column
    pub fn column(name: &str) -> Self {
        Self {
            field: FieldName {
                name: name.to_string(),
            },
            reference_field: None,
        }
    }

    /// A reference column resolved to the referenced row's `Name`
    pub fn reference(name: &str) -> Self {
        Self {
            field: FieldName {
                name: name.to_string(),
            },
            reference_field: Some(ReferenceField {
                field: FieldName {
                    name: "Name".to_string(),
                },
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub sort_type: SortType,
}

impl OrderBy {
    pub fn desc(field_name: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            sort_type: SortType::Desc,
        }
    }

    pub fn asc(field_name: &str) -> Self {
        Self {
            field_name: field_name.to_string(),
            sort_type: SortType::Asc,
        }
    }
}

/// Parameters for `fetch_records` and `get_record_by_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchParams {
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}

impl FetchParams {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            order_by: Vec::new(),
        }
    }

    pub fn ordered_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }
}

/// Parameters for `create_record` and `update_record`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteParams {
    pub records: Vec<JsonValue>,
}

impl WriteParams {
    /// A one-element batch
    pub fn single(record: JsonValue) -> Self {
        Self {
            records: vec![record],
        }
    }
}

/// Parameters for `delete_record`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}

impl DeleteParams {
    pub fn single(id: RecordId) -> Self {
        Self {
            record_ids: vec![id],
        }
    }
}

/// Field-level validation error attached to a failed batch entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "fieldLabel", default)]
    pub field_label: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of one entry in a batch write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl RecordOutcome {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// One-line summary for logs: message plus any field errors
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self.message.iter().cloned().collect();
        for err in &self.errors {
            match (&err.field_label, &err.message) {
                (Some(label), Some(msg)) => parts.push(format!("{}: {}", label, msg)),
                (None, Some(msg)) => parts.push(msg.clone()),
                (Some(label), None) => parts.push(format!("{}: invalid", label)),
                (None, None) => {}
            }
        }
        if parts.is_empty() {
            "unknown failure".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Response envelope returned by every backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordOutcome>>,
}

impl TableResponse {
    /// A successful read
    pub fn with_data(data: JsonValue) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            results: None,
        }
    }

    /// A completed batch write
    pub fn with_results(results: Vec<RecordOutcome>) -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            results: Some(results),
        }
    }

    /// A call the backend rejected outright
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            results: None,
        }
    }
}

/// Hosted-table backend abstraction
///
/// `Err` is reserved for calls that never produced a response (connection,
/// timeout, undecodable body). A response the backend sends back, including
/// `success: false`, is always `Ok`.
#[async_trait]
pub trait HostedTableClient: Send + Sync {
    /// Fetch all rows of a table
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<TableResponse>;

    /// Fetch one row by id; `data` is `null` when the row does not exist
    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &FetchParams,
    ) -> Result<TableResponse>;

    /// Insert a batch of rows
    async fn create_record(&self, table: &str, params: &WriteParams) -> Result<TableResponse>;

    /// Update a batch of rows (each record carries its `Id`)
    async fn update_record(&self, table: &str, params: &WriteParams) -> Result<TableResponse>;

    /// Delete a batch of rows by id
    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<TableResponse>;
}
