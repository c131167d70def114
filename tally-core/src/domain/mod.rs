//! Core domain entities
//!
//! Typed records, the drafts and patches callers submit, and the pure
//! normalization that turns them into wire payloads. No I/O happens here.

pub mod amount;
mod profile;
pub mod reference;
pub mod result;
mod transaction;

pub use amount::AmountInput;
pub use profile::{Profile, ProfileDraft, ProfilePatch};
pub use reference::{Lookup, RecordId, ReferenceInput};
pub use transaction::{Transaction, TransactionDraft, TransactionPatch, DEFAULT_TRANSACTION_NAME};
