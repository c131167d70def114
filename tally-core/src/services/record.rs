//! Shared record plumbing for the entity services
//!
//! Every entity service talks to one table through a `TableGateway`, which
//! owns the response interpretation rules:
//!
//! 1. a call that never got a response propagates the client error
//! 2. `success: false` becomes `Error::Request` with the backend message
//! 3. failed batch entries are logged; create/update raise the first entry
//!    message, delete follows the configured `BatchFailurePolicy`
//!
//! Each error is logged exactly once, when it leaves the gateway.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};

use crate::domain::result::{Error, Result};
use crate::domain::RecordId;
use crate::ports::{
    DeleteParams, FetchParams, HostedTableClient, RecordOutcome, TableResponse, WriteParams,
};

/// How delete treats failed batch entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchFailurePolicy {
    /// Failed delete entries are logged and the call still reports success
    #[default]
    Lenient,
    /// Failed delete entries raise, the same as create and update
    Strict,
}

/// The operations a gateway performs, for log context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    FetchAll,
    FetchOne,
    Create,
    Update,
    Delete,
}

impl Op {
    fn as_str(&self) -> &'static str {
        match self {
            Op::FetchAll => "fetch_all",
            Op::FetchOne => "fetch_one",
            Op::Create => "create",
            Op::Update => "update",
            Op::Delete => "delete",
        }
    }
}

/// One table on the hosted backend, seen through the response rules above
pub(crate) struct TableGateway {
    client: Arc<dyn HostedTableClient>,
    table: &'static str,
    policy: BatchFailurePolicy,
}

impl TableGateway {
    pub fn new(
        client: Arc<dyn HostedTableClient>,
        table: &'static str,
        policy: BatchFailurePolicy,
    ) -> Self {
        Self {
            client,
            table,
            policy,
        }
    }

    /// All rows; an absent `data` means an empty table
    pub async fn fetch_all<T: DeserializeOwned>(&self, params: &FetchParams) -> Result<Vec<T>> {
        let result = async {
            debug!(table = self.table, "fetching records");
            let response = self.client.fetch_records(self.table, params).await?;
            let response = expect_success(response)?;
            match response.data {
                None | Some(JsonValue::Null) => Ok(Vec::new()),
                Some(data) => decode::<Vec<T>>(data),
            }
        }
        .await;
        self.logged(Op::FetchAll, None, result)
    }

    /// One row; `None` when the backend has no such row
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        id: RecordId,
        params: &FetchParams,
    ) -> Result<Option<T>> {
        let result = async {
            debug!(table = self.table, id, "fetching record");
            let response = self.client.get_record_by_id(self.table, id, params).await?;
            let response = expect_success(response)?;
            decode_optional(response.data)
        }
        .await;
        self.logged(Op::FetchOne, Some(id), result)
    }

    /// Submit `record` as a one-element create batch
    pub async fn create<T: DeserializeOwned>(&self, record: JsonValue) -> Result<Option<T>> {
        let result = async {
            debug!(table = self.table, "creating record");
            let params = WriteParams::single(record);
            let response = self.client.create_record(self.table, &params).await?;
            let response = expect_success(response)?;
            self.unwrap_write(Op::Create, response)
        }
        .await;
        self.logged(Op::Create, None, result)
    }

    /// Submit `record` (which carries its `Id`) as a one-element update batch
    pub async fn update<T: DeserializeOwned>(
        &self,
        id: RecordId,
        record: JsonValue,
    ) -> Result<Option<T>> {
        let result = async {
            debug!(table = self.table, id, "updating record");
            let params = WriteParams::single(record);
            let response = self.client.update_record(self.table, &params).await?;
            let response = expect_success(response)?;
            self.unwrap_write(Op::Update, response)
        }
        .await;
        self.logged(Op::Update, Some(id), result)
    }

    /// Delete one row by id
    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        let result = async {
            debug!(table = self.table, id, "deleting record");
            let params = DeleteParams::single(id);
            let response = self.client.delete_record(self.table, &params).await?;
            let response = expect_success(response)?;

            if let Some(results) = &response.results {
                let failed = self.failed_entries(Op::Delete, results);
                if self.policy == BatchFailurePolicy::Strict {
                    if let Some(message) = first_message(&failed) {
                        return Err(Error::batch(message));
                    }
                }
            }
            Ok::<bool, Error>(true)
        }
        .await;
        self.logged(Op::Delete, Some(id), result)
    }

    /// Batch write interpretation shared by create and update
    ///
    /// The first failed entry with a message raises. Otherwise the first
    /// succeeded entry's data is the result.
    fn unwrap_write<T: DeserializeOwned>(
        &self,
        op: Op,
        response: TableResponse,
    ) -> Result<Option<T>> {
        let Some(results) = response.results else {
            return decode_optional(response.data);
        };

        let failed = self.failed_entries(op, &results);
        if let Some(message) = first_message(&failed) {
            return Err(Error::batch(message));
        }

        let data = results
            .into_iter()
            .find(|r| r.success)
            .and_then(|r| r.data);
        decode_optional(data)
    }

    /// Collect and log the failed entries of a batch
    fn failed_entries<'a>(&self, op: Op, results: &'a [RecordOutcome]) -> Vec<&'a RecordOutcome> {
        let failed: Vec<&RecordOutcome> = results.iter().filter(|r| !r.success).collect();
        if !failed.is_empty() {
            let details: Vec<String> = failed.iter().map(|r| r.describe()).collect();
            warn!(
                table = self.table,
                op = op.as_str(),
                failed = failed.len(),
                total = results.len(),
                details = ?details,
                "batch entries failed"
            );
        }
        failed
    }

    fn logged<T>(&self, op: Op, id: Option<RecordId>, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!(table = self.table, op = op.as_str(), id = ?id, error = %e, "record operation failed");
        }
        result
    }
}

/// Turn `success: false` into an error carrying the backend message
fn expect_success(response: TableResponse) -> Result<TableResponse> {
    if response.success {
        Ok(response)
    } else {
        Err(Error::request(
            response
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        ))
    }
}

fn first_message(failed: &[&RecordOutcome]) -> Option<String> {
    failed.iter().find_map(|r| r.message.clone())
}

fn decode<T: DeserializeOwned>(value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
}

fn decode_optional<T: DeserializeOwned>(value: Option<JsonValue>) -> Result<Option<T>> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => decode(v).map(Some),
    }
}
