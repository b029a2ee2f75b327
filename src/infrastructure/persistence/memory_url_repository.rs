//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{InsertOutcome, StoreError, UniqueField, UrlRepository};

#[derive(Debug, Default)]
struct Tables {
    by_code: HashMap<String, UrlRecord>,
    /// target URL -> code
    by_target_url: HashMap<String, String>,
}

/// Process-local store with the same guarantees as the PostgreSQL one.
///
/// Both unique indexes sit behind a single lock, so the conditional insert
/// checks and claims `code` and `target_url` in one step. The lock is never
/// held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    tables: Mutex<Tables>,
}

impl InMemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.tables.lock().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deletes a record, as an external retention policy would.
    ///
    /// Returns the removed record, if any.
    pub fn remove(&self, code: &str) -> Option<UrlRecord> {
        let mut tables = self.tables.lock();
        let record = tables.by_code.remove(code)?;
        tables.by_target_url.remove(&record.target_url);
        Some(record)
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn insert_if_unique(&self, new_record: NewUrlRecord) -> Result<InsertOutcome, StoreError> {
        let mut tables = self.tables.lock();

        if tables.by_code.contains_key(&new_record.code) {
            return Ok(InsertOutcome::Conflict(UniqueField::Code));
        }
        if tables.by_target_url.contains_key(&new_record.target_url) {
            return Ok(InsertOutcome::Conflict(UniqueField::TargetUrl));
        }

        let record = new_record.into_record();
        tables
            .by_target_url
            .insert(record.target_url.clone(), record.code.clone());
        tables.by_code.insert(record.code.clone(), record.clone());

        Ok(InsertOutcome::Inserted(record))
    }

    async fn find_by_target_url(&self, target_url: &str) -> Result<Option<UrlRecord>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .by_target_url
            .get(target_url)
            .and_then(|code| tables.by_code.get(code))
            .cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.tables.lock().by_code.get(code).cloned())
    }

    async fn find_and_increment_visits(&self, code: &str) -> Result<Option<UrlRecord>, StoreError> {
        let mut tables = self.tables.lock();
        Ok(tables.by_code.get_mut(code).map(|record| {
            record.visits += 1;
            record.clone()
        }))
    }

    async fn increment_visits(&self, code: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock();
        match tables.by_code.get_mut(code) {
            Some(record) => {
                record.visits += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
