//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls. Services consume the repository trait and provide a clean API
//! for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shortening_service::ShorteningService`] - Collision-free code allocation
//! - [`services::redirect_service::RedirectService`] - Cache-aside resolution and visit counting
//! - [`services::stats_service::StatsService`] - Visit count lookup
//!
//! [`retry`] holds the bounded retry policy used for code collisions.

pub mod retry;
pub mod services;
