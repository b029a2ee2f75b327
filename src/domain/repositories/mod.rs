//! Repository trait definitions for the domain layer.
//!
//! This module defines the store interface (trait) that abstracts data access
//! following the Repository pattern. It is implemented by concrete
//! repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Testing
//!
//! See integration tests in `tests/repository_url.rs` for usage examples.

pub mod url_repository;

pub use url_repository::{InsertOutcome, StoreError, UniqueField, UrlRepository};

#[cfg(test)]
pub use url_repository::MockUrlRepository;
