//! Domain layer containing business entities and logic.
//!
//! Defines the entities, the store contract and the background visit
//! counting pipeline, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`visit_event`] - Pending counter increment model
//! - [`visit_worker`] - Asynchronous counter update worker
//!
//! # Visit Counting Flow
//!
//! 1. Redirect on a cache miss increments the counter inline via
//!    [`repositories::UrlRepository::find_and_increment_visits`]
//! 2. Redirect on a cache hit submits a [`visit_event::VisitEvent`] to the
//!    bounded [`visit_worker::VisitQueue`]
//! 3. [`visit_worker::run_visit_worker`] applies it via
//!    [`repositories::UrlRepository::increment_visits`]

pub mod entities;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
