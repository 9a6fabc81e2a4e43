//! Workload drivers built on top of the client
//!
//! - [`adapter`]: record-oriented benchmark adapter mapping table/key/field
//!   records onto the flat keyspace with composite keys
//! - [`workload`]: multi-threaded random-operation load generator with
//!   per-operation statistics

pub mod adapter;
pub mod workload;

pub use adapter::StoreAdapter;
pub use workload::{OpKind, OpStats, WorkloadConfig, WorkloadReport};
