//! Domain model for the taxpayer registry.
//!
//! # Responsibility
//! - Define the canonical taxpayer record exchanged with registry callers.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every record is identified by its `tid`, which never changes once stored.
//! - Every stored record has four non-empty fields.

pub mod taxpayer;
