//! Classification of PostgreSQL errors raised by the `urls` table.

use crate::domain::repositories::{StoreError, UniqueField};

/// Primary key constraint on `urls.code`.
pub const CODE_CONSTRAINT: &str = "urls_pkey";

/// Unique index on the digest of `urls.target_url`.
pub const TARGET_URL_CONSTRAINT: &str = "urls_target_url_key";

/// Returns the field whose uniqueness constraint `e` violated, if any.
pub fn unique_violation_field(e: &sqlx::Error) -> Option<UniqueField> {
    let db_err = e.as_database_error()?;

    if !db_err.is_unique_violation() {
        return None;
    }

    constraint_field(db_err.constraint())
}

/// Maps a constraint name to the field it guards.
pub fn constraint_field(constraint: Option<&str>) -> Option<UniqueField> {
    match constraint {
        Some(CODE_CONSTRAINT) => Some(UniqueField::Code),
        Some(TARGET_URL_CONSTRAINT) => Some(UniqueField::TargetUrl),
        _ => None,
    }
}

/// Returns true for SQLSTATEs that reject the data rather than the attempt.
///
/// Classes 22 (data exception), 23 (integrity constraint violation) and
/// 54 (program limit exceeded, e.g. an oversized index row).
pub fn is_permanent_sqlstate(code: &str) -> bool {
    matches!(code.get(..2), Some("22" | "23" | "54"))
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        let permanent = e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| is_permanent_sqlstate(&code));

        if permanent {
            StoreError::Rejected(e.to_string())
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }
}
