//! Shelfscroll library catalog
//!
//! A REST JSON API serving a paginated book catalog, and the client core that
//! consumes it: a filter holder, an incrementally loaded collection store and
//! an infinite-scroll trigger.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
