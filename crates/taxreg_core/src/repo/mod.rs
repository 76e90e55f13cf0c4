//! Record Store contract and backends.
//!
//! # Responsibility
//! - Define the keyed `insert`/`get`/`list_all` contract over taxpayer records.
//! - Provide an in-memory backend and a durable SQLite backend.
//!
//! # Invariants
//! - At most one record exists per `tid`.
//! - `insert` is all-or-nothing; readers never observe a partial record.
//! - Absence on `get` is `Ok(None)`, never an error.

pub mod memory_repo;
pub mod sqlite_repo;
pub mod taxpayer_repo;
