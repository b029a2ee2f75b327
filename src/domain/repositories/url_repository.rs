//! Repository trait for the durable short code store.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a store operation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Connection loss, pool exhaustion or a statement timeout. Transient.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the data itself; repeating the call fails the same way.
    #[error("store rejected operation: {0}")]
    Rejected(String),
}

/// The uniqueness constraint rejected by a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// The candidate short code is already taken.
    Code,
    /// The target URL has already been shortened.
    TargetUrl,
}

/// Outcome of [`UrlRepository::insert_if_unique`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(UrlRecord),
    Conflict(UniqueField),
}

/// Repository interface for the durable `code -> record` mapping.
///
/// Both uniqueness constraints (on `code` and on `target_url`) are enforced by
/// the store itself, and every mutating operation is atomic. Services hold no
/// locks and rely entirely on these primitives.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - Process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts the record unless it would violate a uniqueness constraint.
    ///
    /// # Returns
    ///
    /// - `Ok(InsertOutcome::Inserted(record))` with `visits = 0` on success
    /// - `Ok(InsertOutcome::Conflict(field))` naming the constraint that fired
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database errors.
    async fn insert_if_unique(&self, new_record: NewUrlRecord) -> Result<InsertOutcome, StoreError>;

    /// Finds the record for an already shortened URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database errors.
    async fn find_by_target_url(&self, target_url: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Finds a record by its short code without touching the counter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Atomically increments `visits` and returns the post-increment record.
    ///
    /// Concurrent calls for the same code never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database errors.
    async fn find_and_increment_visits(&self, code: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Atomically increments `visits` without reading the record back.
    ///
    /// Returns `Ok(false)` if no record exists for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database errors.
    async fn increment_visits(&self, code: &str) -> Result<bool, StoreError>;

    /// Verifies the store answers queries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be reached.
    async fn health_check(&self) -> Result<(), StoreError>;
}
