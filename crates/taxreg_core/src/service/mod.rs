//! Registry use-case services.
//!
//! # Responsibility
//! - Validate caller input at the registry boundary.
//! - Translate store outcomes into the external registry contract.
//! - Keep transport layers decoupled from storage details.

pub mod registry_service;
