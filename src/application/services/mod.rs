//! Business logic services for the application layer.

pub mod redirect_service;
pub mod shortening_service;
pub mod stats_service;

pub use redirect_service::{RedirectService, Resolution, ResolutionSource};
pub use shortening_service::ShorteningService;
pub use stats_service::StatsService;
