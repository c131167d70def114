//! Transaction domain model

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::amount::{amount_to_wire, AmountInput};
use super::reference::{Lookup, RecordId, ReferenceInput};

/// Row name used when neither a name nor a description is supplied
pub const DEFAULT_TRANSACTION_NAME: &str = "Transaction";

/// A transaction row as stored in the `transaction_c` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Stored amount; `None` when the row holds no number
    #[serde(default)]
    pub amount_c: Option<f64>,
    /// Transaction kind, e.g. "income" or "expense"
    #[serde(default)]
    pub type_c: Option<String>,
    #[serde(default)]
    pub description_c: Option<String>,
    #[serde(default)]
    pub date_c: Option<String>,
    #[serde(default)]
    pub created_at_c: Option<String>,
    #[serde(default)]
    pub category_c: Option<Lookup>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.type_c.as_deref() == Some("expense")
    }

    pub fn is_income(&self) -> bool {
        self.type_c.as_deref() == Some("income")
    }

    /// Amount with expenses negated, zero when no amount is stored
    pub fn signed_amount(&self) -> f64 {
        let amount = self.amount_c.unwrap_or(0.0);
        if self.is_expense() {
            -amount.abs()
        } else {
            amount
        }
    }
}

/// Fields accepted when creating a transaction
///
/// Every column may be given under its stored name (`amount_c`) or its plain
/// form name (`amount`). When both are present the first non-blank one wins,
/// so a form payload with the stored names spread over it still parses.
/// A row name is not accepted here; it is derived from the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionInput")]
pub struct TransactionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_c: Option<AmountInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_c: Option<ReferenceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_c: Option<String>,
}

impl TransactionDraft {
    /// Build the single record submitted on create
    ///
    /// - `Name`: the description, else "Transaction"
    /// - `amount_c`: always present, coerced to a number (`null` if unreadable)
    /// - `category_c`: bare id
    /// - `created_at_c`: given timestamp, else `now`
    pub fn to_payload(&self, now: DateTime<Utc>) -> JsonValue {
        let mut record = Map::new();

        let row_name =
            non_empty(self.description_c.as_deref()).unwrap_or(DEFAULT_TRANSACTION_NAME);
        record.insert("Name".to_string(), JsonValue::from(row_name));
        record.insert("amount_c".to_string(), amount_to_wire(self.amount_c.as_ref()));
        insert_opt(&mut record, "type_c", self.type_c.as_deref());
        if let Some(category) = &self.category_c {
            record.insert("category_c".to_string(), category.to_wire());
        }
        insert_opt(&mut record, "description_c", self.description_c.as_deref());
        insert_opt(&mut record, "date_c", self.date_c.as_deref());

        let created_at = non_empty(self.created_at_c.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
        record.insert("created_at_c".to_string(), JsonValue::from(created_at));

        JsonValue::Object(record)
    }
}

/// Transaction update
///
/// Unlike profiles, a transaction update always rewrites amount, type,
/// category, description and date. Fields left as `None` are written as
/// `null`, so callers wanting to keep a value must send it again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionInput")]
pub struct TransactionPatch {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_c: Option<AmountInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_c: Option<ReferenceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_c: Option<String>,
}

impl TransactionPatch {
    /// Seed a patch from a stored row so an update keeps its current values
    pub fn from_existing(tx: &Transaction) -> Self {
        Self {
            name: None,
            amount_c: tx.amount_c.map(AmountInput::Number),
            type_c: tx.type_c.clone(),
            category_c: tx.category_c.as_ref().map(|c| ReferenceInput::Id(c.id)),
            description_c: tx.description_c.clone(),
            date_c: tx.date_c.clone(),
        }
    }

    /// Build the single record submitted on update
    pub fn to_payload(&self, id: RecordId) -> JsonValue {
        let mut record = Map::new();
        record.insert("Id".to_string(), JsonValue::from(id));
        record.insert("amount_c".to_string(), amount_to_wire(self.amount_c.as_ref()));
        record.insert("type_c".to_string(), opt_to_wire(self.type_c.as_deref()));
        record.insert(
            "category_c".to_string(),
            self.category_c
                .as_ref()
                .map(ReferenceInput::to_wire)
                .unwrap_or(JsonValue::Null),
        );
        record.insert("description_c".to_string(), opt_to_wire(self.description_c.as_deref()));
        record.insert("date_c".to_string(), opt_to_wire(self.date_c.as_deref()));
        if let Some(name) = non_empty(self.name.as_deref()) {
            record.insert("Name".to_string(), JsonValue::from(name));
        }
        JsonValue::Object(record)
    }
}

/// Transaction input as callers send it, both spellings kept apart
#[derive(Deserialize)]
struct TransactionInput {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(default)]
    amount_c: Option<AmountInput>,
    #[serde(default)]
    amount: Option<AmountInput>,
    #[serde(default)]
    type_c: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    category_c: Option<ReferenceInput>,
    #[serde(default)]
    category: Option<ReferenceInput>,
    #[serde(default)]
    description_c: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date_c: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at_c: Option<String>,
    #[serde(rename = "createdAt", default)]
    created_at: Option<String>,
}

impl From<TransactionInput> for TransactionDraft {
    fn from(input: TransactionInput) -> Self {
        Self {
            amount_c: first_filled(input.amount_c, input.amount, blank_amount),
            type_c: first_filled(input.type_c, input.kind, blank_text),
            category_c: first_filled(input.category_c, input.category, blank_reference),
            description_c: first_filled(input.description_c, input.description, blank_text),
            date_c: first_filled(input.date_c, input.date, blank_text),
            created_at_c: first_filled(input.created_at_c, input.created_at, blank_text),
        }
    }
}

impl From<TransactionInput> for TransactionPatch {
    fn from(input: TransactionInput) -> Self {
        Self {
            name: input.name,
            amount_c: first_filled(input.amount_c, input.amount, blank_amount),
            type_c: first_filled(input.type_c, input.kind, blank_text),
            category_c: first_filled(input.category_c, input.category, blank_reference),
            description_c: first_filled(input.description_c, input.description, blank_text),
            date_c: first_filled(input.date_c, input.date, blank_text),
        }
    }
}

/// The stored-name value unless it is missing or blank, then the plain one
fn first_filled<T>(column: Option<T>, plain: Option<T>, blank: fn(&T) -> bool) -> Option<T> {
    match column {
        Some(value) if !blank(&value) => Some(value),
        column => match plain {
            Some(value) if !blank(&value) => Some(value),
            _ => column,
        },
    }
}

fn blank_text(value: &String) -> bool {
    value.is_empty()
}

fn blank_amount(value: &AmountInput) -> bool {
    matches!(value, AmountInput::Text(text) if text.is_empty())
}

fn blank_reference(value: &ReferenceInput) -> bool {
    matches!(value, ReferenceInput::Text(text) if text.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn opt_to_wire(value: Option<&str>) -> JsonValue {
    value.map(JsonValue::from).unwrap_or(JsonValue::Null)
}

fn insert_opt(record: &mut Map<String, JsonValue>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        record.insert(key.to_string(), JsonValue::from(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_draft_coerces_amount_and_category() {
        let draft: TransactionDraft = serde_json::from_value(json!({
            "amount_c": "12.5",
            "type_c": "expense",
            "category_c": {"Id": 3},
            "description_c": "coffee",
            "date_c": "2024-01-01"
        }))
        .unwrap();

        let payload = draft.to_payload(fixed_now());
        assert_eq!(payload["amount_c"], json!(12.5));
        assert!(payload["amount_c"].is_f64());
        assert_eq!(payload["category_c"], json!(3));
        assert_eq!(payload["Name"], json!("coffee"));
        assert_eq!(payload["created_at_c"], json!("2024-03-01T12:00:00.000Z"));
    }

    #[test]
    fn test_draft_accepts_plain_field_names() {
        let draft: TransactionDraft = serde_json::from_value(json!({
            "amount": 20,
            "type": "income",
            "category": 4,
            "description": "salary",
            "date": "2024-02-01",
            "createdAt": "2024-02-01T08:00:00.000Z"
        }))
        .unwrap();

        let payload = draft.to_payload(fixed_now());
        assert_eq!(payload["amount_c"], json!(20.0));
        assert_eq!(payload["type_c"], json!("income"));
        assert_eq!(payload["category_c"], json!(4));
        assert_eq!(payload["created_at_c"], json!("2024-02-01T08:00:00.000Z"));
    }

    #[test]
    fn test_draft_accepts_both_spellings_of_a_field() {
        let draft: TransactionDraft = serde_json::from_value(json!({
            "amount": "",
            "amount_c": "12.5",
            "type": "expense",
            "type_c": "",
            "description": "coffee",
            "description_c": "flat white",
            "category": 3
        }))
        .unwrap();

        assert_eq!(draft.amount_c, Some(AmountInput::from("12.5")));
        assert_eq!(draft.type_c.as_deref(), Some("expense"));
        assert_eq!(draft.description_c.as_deref(), Some("flat white"));
        assert_eq!(draft.to_payload(fixed_now())["category_c"], json!(3));
    }

    #[test]
    fn test_draft_row_name_ignores_given_name() {
        let draft: TransactionDraft = serde_json::from_value(json!({
            "Name": "Rent",
            "description_c": "June rent",
            "amount_c": 900
        }))
        .unwrap();
        assert_eq!(draft.to_payload(fixed_now())["Name"], json!("June rent"));
    }

    #[test]
    fn test_patch_accepts_both_spellings_of_a_field() {
        let patch: TransactionPatch = serde_json::from_value(json!({
            "Name": "Rent",
            "amount_c": 900,
            "amount": 850,
            "date": "2024-06-01"
        }))
        .unwrap();

        let payload = patch.to_payload(2);
        assert_eq!(payload["Name"], json!("Rent"));
        assert_eq!(payload["amount_c"], json!(900.0));
        assert_eq!(payload["date_c"], json!("2024-06-01"));
    }

    #[test]
    fn test_draft_default_name_and_missing_amount() {
        let payload = TransactionDraft::default().to_payload(fixed_now());
        assert_eq!(payload["Name"], json!(DEFAULT_TRANSACTION_NAME));
        assert_eq!(payload["amount_c"], JsonValue::Null);
        assert!(payload.get("type_c").is_none());
        assert!(payload.get("category_c").is_none());
    }

    #[test]
    fn test_patch_rewrites_omitted_fields_as_null() {
        let patch = TransactionPatch {
            description_c: Some("lunch".to_string()),
            ..Default::default()
        };
        assert_eq!(
            patch.to_payload(8),
            json!({
                "Id": 8,
                "amount_c": null,
                "type_c": null,
                "category_c": null,
                "description_c": "lunch",
                "date_c": null
            })
        );
    }

    #[test]
    fn test_patch_sends_name_only_when_present() {
        let patch = TransactionPatch {
            name: Some("Rent".to_string()),
            amount_c: Some(AmountInput::from("900")),
            ..Default::default()
        };
        let payload = patch.to_payload(2);
        assert_eq!(payload["Name"], json!("Rent"));
        assert_eq!(payload["amount_c"], json!(900.0));

        let unnamed = TransactionPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(unnamed.to_payload(2).get("Name").is_none());
    }

    #[test]
    fn test_patch_from_existing_preserves_values() {
        let tx: Transaction = serde_json::from_value(json!({
            "Id": 4,
            "amount_c": 15.0,
            "type_c": "expense",
            "category_c": {"Id": 2, "Name": "Food"},
            "description_c": "pizza",
            "date_c": "2024-01-05"
        }))
        .unwrap();

        let payload = TransactionPatch::from_existing(&tx).to_payload(tx.id);
        assert_eq!(payload["amount_c"], json!(15.0));
        assert_eq!(payload["category_c"], json!(2));
        assert_eq!(payload["description_c"], json!("pizza"));
        assert_eq!(payload["date_c"], json!("2024-01-05"));
    }

    #[test]
    fn test_signed_amount() {
        let tx: Transaction = serde_json::from_value(json!({
            "Id": 1, "amount_c": 12.5, "type_c": "expense"
        }))
        .unwrap();
        assert_eq!(tx.signed_amount(), -12.5);
        assert!(tx.is_expense());
        assert!(!tx.is_income());
    }
}
