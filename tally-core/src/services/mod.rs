//! Service layer - entity CRUD over the hosted-table port
//!
//! Each service owns one table and shares the response interpretation in
//! `record`.

pub mod demo;
mod profile;
mod record;
mod transaction;

pub use demo::DemoService;
pub use profile::{ProfileService, PROFILE_TABLE};
pub use record::BatchFailurePolicy;
pub use transaction::{TransactionService, TRANSACTION_TABLE};
