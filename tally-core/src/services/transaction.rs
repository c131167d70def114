//! Transaction service - CRUD over the `transaction_c` table

use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::Result;
use crate::domain::{RecordId, Transaction, TransactionDraft, TransactionPatch};
use crate::ports::{FetchParams, FieldSpec, HostedTableClient, OrderBy};

use super::record::{BatchFailurePolicy, TableGateway};

/// Backend table holding transactions
pub const TRANSACTION_TABLE: &str = "transaction_c";

/// Transaction service
pub struct TransactionService {
    gateway: TableGateway,
}

impl TransactionService {
    pub fn new(client: Arc<dyn HostedTableClient>, policy: BatchFailurePolicy) -> Self {
        Self {
            gateway: TableGateway::new(client, TRANSACTION_TABLE, policy),
        }
    }

    /// Column projection used by every read
    pub fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::column("Id"),
            FieldSpec::column("Name"),
            FieldSpec::column("amount_c"),
            FieldSpec::column("type_c"),
            FieldSpec::column("description_c"),
            FieldSpec::column("date_c"),
            FieldSpec::column("created_at_c"),
            FieldSpec::reference("category_c"),
        ]
    }

    /// All transactions, newest `date_c` first
    pub async fn get_all(&self) -> Result<Vec<Transaction>> {
        let params = FetchParams::new(Self::fields()).ordered_by(OrderBy::desc("date_c"));
        self.gateway.fetch_all(&params).await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Option<Transaction>> {
        self.gateway
            .fetch_one(id, &FetchParams::new(Self::fields()))
            .await
    }

    /// Create a transaction, returning the stored row
    pub async fn create(&self, draft: &TransactionDraft) -> Result<Option<Transaction>> {
        self.gateway.create(draft.to_payload(Utc::now())).await
    }

    /// Rewrite a transaction
    ///
    /// Amount, type, category, description and date are always sent; see
    /// `TransactionPatch`. Use `amend` to change a subset of fields.
    pub async fn update(
        &self,
        id: RecordId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>> {
        self.gateway.update(id, patch.to_payload(id)).await
    }

    /// Change only some fields, keeping the stored values of the rest
    ///
    /// Reads the row first, overlays the fields set in `changes`, then
    /// performs a full `update`. Returns `None` if the row does not exist.
    pub async fn amend(
        &self,
        id: RecordId,
        changes: &TransactionPatch,
    ) -> Result<Option<Transaction>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut merged = TransactionPatch::from_existing(&existing);
        if changes.name.is_some() {
            merged.name = changes.name.clone();
        }
        if changes.amount_c.is_some() {
            merged.amount_c = changes.amount_c.clone();
        }
        if changes.type_c.is_some() {
            merged.type_c = changes.type_c.clone();
        }
        if changes.category_c.is_some() {
            merged.category_c = changes.category_c.clone();
        }
        if changes.description_c.is_some() {
            merged.description_c = changes.description_c.clone();
        }
        if changes.date_c.is_some() {
            merged.date_c = changes.date_c.clone();
        }

        self.update(id, &merged).await
    }

    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        self.gateway.delete(id).await
    }
}
