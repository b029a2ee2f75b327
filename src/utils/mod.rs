//! Utility functions for code generation, URL handling and database error handling.
//!
//! - [`code_generator`] - Short code candidate generation
//! - [`db_error`] - PostgreSQL constraint violation classification
//! - [`url_normalizer`] - Target URL canonicalization

pub mod code_generator;
pub mod db_error;
pub mod url_normalizer;
