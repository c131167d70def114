//! In-process hosted-table store
//!
//! Implements `HostedTableClient` against tables held in memory, with the
//! same response contract as the hosted backend: ids are assigned on create,
//! batch writes report one outcome per record, and reference columns read
//! back as `{ "Id": n, "Name": ... }` lookups. A reference column resolves
//! against the table of the same name (`category_c` rows live in
//! `category_c`); without such a row the lookup carries only the id. Demo mode persists it as a JSON snapshot.
//!
//! Tests use the extra knobs: `require_fields` makes creates missing a
//! column fail per entry, `fail_table` makes every call on a table come back
//! with `success: false`, and `calls` records what was submitted.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::domain::result::{Error, Result};
use crate::domain::RecordId;
use crate::ports::{
    DeleteParams, FetchParams, FieldError, HostedTableClient, OrderBy, RecordOutcome, SortType,
    TableResponse, WriteParams,
};

type Row = Map<String, JsonValue>;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Table {
    next_id: RecordId,
    rows: BTreeMap<RecordId, Row>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryState {
    tables: HashMap<String, Table>,
    #[serde(skip)]
    required: HashMap<String, Vec<String>>,
    #[serde(skip)]
    faults: HashMap<String, String>,
    #[serde(skip)]
    calls: Vec<RecordedCall>,
}

/// A call as received by the memory store
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub table: String,
    pub operation: &'static str,
    /// The serialized parameters, exactly as a remote backend would see them
    pub body: JsonValue,
}

/// In-memory hosted-table client
#[derive(Debug, Default)]
pub struct MemoryTableClient {
    state: Mutex<MemoryState>,
}

impl MemoryTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot written by `save`; a missing file yields an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let state: MemoryState = serde_json::from_str(&content)?;
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Write all tables to `path` as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = {
            let state = self.lock()?;
            serde_json::to_string_pretty(&*state)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Insert a row directly, bypassing validation; returns the assigned id
    pub fn insert_row(&self, table: &str, row: JsonValue) -> Result<RecordId> {
        let mut state = self.lock()?;
        let JsonValue::Object(fields) = row else {
            return Err(Error::Decode("row must be a JSON object".to_string()));
        };
        Ok(insert(state.tables.entry(table.to_string()).or_default(), fields))
    }

    /// Number of rows currently stored in `table`
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let state = self.lock()?;
        Ok(state.tables.get(table).map(|t| t.rows.len()).unwrap_or(0))
    }

    /// Creates on `table` fail per entry unless these columns are non-empty
    pub fn require_fields(&self, table: &str, fields: &[&str]) -> Result<()> {
        let mut state = self.lock()?;
        state.required.insert(
            table.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        Ok(())
    }

    /// Every call on `table` answers `success: false` with `message`
    pub fn fail_table(&self, table: &str, message: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.faults.insert(table.to_string(), message.to_string());
        Ok(())
    }

    pub fn clear_faults(&self) -> Result<()> {
        self.lock()?.faults.clear();
        Ok(())
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Result<Vec<RecordedCall>> {
        Ok(self.lock()?.calls.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| Error::transport(format!("Lock poisoned: {}", e)))
    }

    /// Record the call and check the table fault switch
    fn begin<P: Serialize>(
        &self,
        table: &str,
        operation: &'static str,
        params: &P,
    ) -> Result<(MutexGuard<'_, MemoryState>, Option<TableResponse>)> {
        let body = serde_json::to_value(params)?;
        let mut state = self.lock()?;
        state.calls.push(RecordedCall {
            table: table.to_string(),
            operation,
            body,
        });
        let fault = state
            .faults
            .get(table)
            .map(|message| TableResponse::failure(message.clone()));
        Ok((state, fault))
    }
}

#[async_trait]
impl HostedTableClient for MemoryTableClient {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<TableResponse> {
        let (state, fault) = self.begin(table, "fetch_records", params)?;
        if let Some(fault) = fault {
            return Ok(fault);
        }

        let mut rows: Vec<&Row> = state
            .tables
            .get(table)
            .map(|t| t.rows.values().collect())
            .unwrap_or_default();
        sort_rows(&mut rows, &params.order_by);

        let data: Vec<JsonValue> = rows
            .into_iter()
            .map(|row| project(row, params, &state.tables))
            .collect();
        Ok(TableResponse::with_data(JsonValue::Array(data)))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &FetchParams,
    ) -> Result<TableResponse> {
        let (state, fault) = self.begin(table, "get_record_by_id", params)?;
        if let Some(fault) = fault {
            return Ok(fault);
        }

        let data = state
            .tables
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .map(|row| project(row, params, &state.tables))
            .unwrap_or(JsonValue::Null);
        Ok(TableResponse::with_data(data))
    }

    async fn create_record(&self, table: &str, params: &WriteParams) -> Result<TableResponse> {
        let (mut state, fault) = self.begin(table, "create_record", params)?;
        if let Some(fault) = fault {
            return Ok(fault);
        }

        let required = state.required.get(table).cloned().unwrap_or_default();
        let store = state.tables.entry(table.to_string()).or_default();

        let results = params
            .records
            .iter()
            .map(|record| {
                let Some(fields) = record.as_object() else {
                    return RecordOutcome::failed("Record must be an object");
                };
                let missing: Vec<&String> = required
                    .iter()
                    .filter(|name| is_blank(fields.get(name.as_str())))
                    .collect();
                if !missing.is_empty() {
                    return missing_fields_outcome(&missing);
                }

                let mut fields = fields.clone();
                fields.remove("Id");
                let now = timestamp();
                fields.insert("CreatedOn".to_string(), JsonValue::from(now.clone()));
                fields.insert("ModifiedOn".to_string(), JsonValue::from(now));
                let id = insert(store, fields);
                RecordOutcome::ok(JsonValue::Object(store.rows[&id].clone()))
            })
            .collect();

        Ok(TableResponse::with_results(results))
    }

    async fn update_record(&self, table: &str, params: &WriteParams) -> Result<TableResponse> {
        let (mut state, fault) = self.begin(table, "update_record", params)?;
        if let Some(fault) = fault {
            return Ok(fault);
        }

        let store = state.tables.entry(table.to_string()).or_default();
        let results = params
            .records
            .iter()
            .map(|record| {
                let Some(id) = record.get("Id").and_then(JsonValue::as_i64) else {
                    return RecordOutcome::failed("Id is required for update");
                };
                let Some(row) = store.rows.get_mut(&id) else {
                    return RecordOutcome::failed(format!("Record with Id {} does not exist", id));
                };
                if let Some(fields) = record.as_object() {
                    for (key, value) in fields {
                        if key != "Id" {
                            row.insert(key.clone(), value.clone());
                        }
                    }
                }
                row.insert("ModifiedOn".to_string(), JsonValue::from(timestamp()));
                RecordOutcome::ok(JsonValue::Object(row.clone()))
            })
            .collect();

        Ok(TableResponse::with_results(results))
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<TableResponse> {
        let (mut state, fault) = self.begin(table, "delete_record", params)?;
        if let Some(fault) = fault {
            return Ok(fault);
        }

        let store = state.tables.entry(table.to_string()).or_default();
        let results = params
            .record_ids
            .iter()
            .map(|id| match store.rows.remove(id) {
                Some(_) => RecordOutcome::ok(serde_json::json!({ "Id": id })),
                None => RecordOutcome::failed(format!("Record with Id {} does not exist", id)),
            })
            .collect();

        Ok(TableResponse::with_results(results))
    }
}

fn insert(table: &mut Table, mut fields: Row) -> RecordId {
    table.next_id += 1;
    let id = table.next_id;
    fields.insert("Id".to_string(), JsonValue::from(id));
    table.rows.insert(id, fields);
    id
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_blank(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn missing_fields_outcome(missing: &[&String]) -> RecordOutcome {
    let mut outcome = RecordOutcome::failed(format!(
        "Required fields missing: {}",
        missing
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    outcome.errors = missing
        .iter()
        .map(|name| FieldError {
            field_label: Some(name.to_string()),
            message: Some("is required".to_string()),
        })
        .collect();
    outcome
}

/// Keep only the requested columns; reference columns become lookups
fn project(row: &Row, params: &FetchParams, tables: &HashMap<String, Table>) -> JsonValue {
    if params.fields.is_empty() {
        return JsonValue::Object(row.clone());
    }

    let mut out = Map::new();
    for spec in &params.fields {
        let Some(value) = row.get(spec.name()) else {
            continue;
        };
        let value = match (&spec.reference_field, value.as_i64()) {
            (Some(reference), Some(id)) => {
                resolve_lookup(tables, spec.name(), id, &reference.field.name)
            }
            _ => value.clone(),
        };
        out.insert(spec.name().to_string(), value);
    }
    JsonValue::Object(out)
}

fn resolve_lookup(
    tables: &HashMap<String, Table>,
    table: &str,
    id: RecordId,
    column: &str,
) -> JsonValue {
    let mut lookup = Map::new();
    lookup.insert("Id".to_string(), JsonValue::from(id));
    let resolved = tables
        .get(table)
        .and_then(|t| t.rows.get(&id))
        .and_then(|row| row.get(column));
    if let Some(value) = resolved {
        lookup.insert(column.to_string(), value.clone());
    }
    JsonValue::Object(lookup)
}

fn sort_rows(rows: &mut [&Row], order_by: &[OrderBy]) {
    if order_by.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for order in order_by {
            let (x, y) = (a.get(&order.field_name), b.get(&order.field_name));
            let ordering = compare_values(x, y);
            if ordering == Ordering::Equal {
                continue;
            }
            // Rows without a value stay last in either direction
            let either_blank = is_blank(x) || is_blank(y);
            return match order.sort_type {
                SortType::Desc if !either_blank => ordering.reverse(),
                _ => ordering,
            };
        }
        Ordering::Equal
    });
}

/// Ascending order of two column values; missing and null sort after values
fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if !x.is_null() && !y.is_null() => match (x, y) {
            (JsonValue::Number(m), JsonValue::Number(n)) => m
                .as_f64()
                .partial_cmp(&n.as_f64())
                .unwrap_or(Ordering::Equal),
            (JsonValue::String(m), JsonValue::String(n)) => m.cmp(n),
            (JsonValue::Bool(m), JsonValue::Bool(n)) => m.cmp(n),
            _ => x.to_string().cmp(&y.to_string()),
        },
        (Some(x), _) if !x.is_null() => Ordering::Less,
        (_, Some(y)) if !y.is_null() => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
