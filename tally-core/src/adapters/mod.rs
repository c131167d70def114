//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - HTTP client for the hosted-table backend
//! - In-memory table store for demo mode and tests
//! - Demo data for the in-memory store

pub mod demo;
pub mod http;
pub mod memory;

#[cfg(test)]
pub mod table_mock;
