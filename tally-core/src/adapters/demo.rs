//! Demo data for the in-memory store
//!
//! A handful of profiles and a month of transactions spread over three
//! categories, enough to exercise listing, ordering and lookups.

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value as JsonValue};

use crate::domain::result::Result;
use crate::services::{PROFILE_TABLE, TRANSACTION_TABLE};

use super::memory::MemoryTableClient;

/// Category table referenced by `transaction_c.category_c`
pub const CATEGORY_TABLE: &str = "category_c";

/// Generate demo profile rows
pub fn generate_demo_profiles() -> Vec<JsonValue> {
    vec![
        json!({
            "Name": "Ada Lovelace",
            "name_c": "Ada Lovelace",
            "avatar_c": "https://avatars.example.com/ada.png",
            "website_c": "https://ada.example.com",
            "bio_c": "Keeps the household books.",
            "Tags": "owner"
        }),
        json!({
            "Name": "Charles Babbage",
            "name_c": "Charles Babbage",
            "website_c": "https://engines.example.com",
            "bio_c": "Tracks the workshop expenses."
        }),
    ]
}

/// Generate demo category rows, in id order 1..=3
pub fn generate_demo_categories() -> Vec<JsonValue> {
    vec![
        json!({"Name": "Groceries"}),
        json!({"Name": "Salary"}),
        json!({"Name": "Utilities"}),
    ]
}

/// Generate 30 days of demo transactions ending at `end`
///
/// Category ids refer to the rows from `generate_demo_categories`.
pub fn generate_demo_transactions(end: NaiveDate) -> Vec<JsonValue> {
    let mut rows = Vec::new();
    for day in 0..30i64 {
        let date = end - Duration::days(day);
        let date_str = date.format("%Y-%m-%d").to_string();
        let created_at = format!("{}T09:00:00.000Z", date_str);

        // Groceries every third day, varying a little
        if day % 3 == 0 {
            let amount = 40.0 + (day % 7) as f64 * 3.25;
            rows.push(json!({
                "Name": "Weekly shop",
                "amount_c": amount,
                "type_c": "expense",
                "description_c": "Weekly shop",
                "date_c": date_str,
                "created_at_c": created_at,
                "category_c": 1
            }));
        }

        if day == 14 {
            rows.push(json!({
                "Name": "Monthly salary",
                "amount_c": 3200.0,
                "type_c": "income",
                "description_c": "Monthly salary",
                "date_c": date_str,
                "created_at_c": created_at,
                "category_c": 2
            }));
        }

        if day == 20 {
            rows.push(json!({
                "Name": "Electricity bill",
                "amount_c": 86.4,
                "type_c": "expense",
                "description_c": "Electricity bill",
                "date_c": date_str,
                "created_at_c": created_at,
                "category_c": 3
            }));
        }
    }
    rows
}

/// Fill an empty store with demo rows
pub fn seed(client: &MemoryTableClient, today: NaiveDate) -> Result<()> {
    for row in generate_demo_profiles() {
        client.insert_row(PROFILE_TABLE, row)?;
    }
    for row in generate_demo_categories() {
        client.insert_row(CATEGORY_TABLE, row)?;
    }
    for row in generate_demo_transactions(today) {
        client.insert_row(TRANSACTION_TABLE, row)?;
    }
    Ok(())
}
