//! URL record entity representing a stored short-code mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its visit counter.
///
/// `code` and `target_url` are each unique across the store and never change
/// once the record is created. `visits` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
    pub visits: i64,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(code: String, target_url: String, created_at: DateTime<Utc>, visits: i64) -> Self {
        Self {
            code,
            target_url,
            created_at,
            visits,
        }
    }
}

/// Input data for inserting a new record.
///
/// New records always start with zero visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub code: String,
    pub target_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewUrlRecord {
    pub fn new(code: String, target_url: String) -> Self {
        Self {
            code,
            target_url,
            created_at: Utc::now(),
        }
    }

    /// Materializes the record as the store would persist it.
    pub fn into_record(self) -> UrlRecord {
        UrlRecord::new(self.code, self.target_url, self.created_at, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_record_creation() {
        let now = Utc::now();
        let record = UrlRecord::new(
            "abc123".to_string(),
            "https://example.com/a".to_string(),
            now,
            3,
        );

        assert_eq!(record.code, "abc123");
        assert_eq!(record.target_url, "https://example.com/a");
        assert_eq!(record.created_at, now);
        assert_eq!(record.visits, 3);
    }

    #[test]
    fn test_new_url_record_starts_without_visits() {
        let new_record = NewUrlRecord::new("xyz789".to_string(), "https://rust-lang.org".to_string());
        let created_at = new_record.created_at;

        let record = new_record.into_record();

        assert_eq!(record.code, "xyz789");
        assert_eq!(record.target_url, "https://rust-lang.org");
        assert_eq!(record.created_at, created_at);
        assert_eq!(record.visits, 0);
    }
}
