//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on concrete implementations.

mod table_client;

pub use table_client::{
    DeleteParams, FetchParams, FieldError, FieldName, FieldSpec, HostedTableClient, OrderBy,
    RecordOutcome, ReferenceField, SortType, TableResponse, WriteParams,
};
