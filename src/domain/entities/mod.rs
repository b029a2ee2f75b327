//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`UrlRecord`] - A stored short code mapping with its visit counter
//!
//! Entities follow the "New Type" pattern with a separate struct for creation
//! ([`NewUrlRecord`]), since the store owns the visit counter.

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
