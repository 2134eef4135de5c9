#![warn(clippy::nursery, clippy::pedantic)]

//! HTTP wiring for the Pastebox server.

use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use pastebox_common::API_ENDPOINT;

pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod short_code;
pub mod store;

pub use config::Config;
pub use lifecycle::{LifecycleManager, ReadOutcome};
pub use store::{FileStore, MemoryStore, PasteStore};

/// The manager variant served over HTTP.
pub type Manager = LifecycleManager<FileStore>;

/// Builds the API router over a shared lifecycle manager. All routes hang
/// off [`API_ENDPOINT`], the prefix the CLI composes its URLs from.
pub fn router(manager: Arc<Manager>) -> Router {
    Router::new()
        .route(&format!("{API_ENDPOINT}/paste"), post(handlers::create))
        .route(
            &format!("{API_ENDPOINT}/paste/:id"),
            get(handlers::read).delete(handlers::delete),
        )
        .route(&format!("{API_ENDPOINT}/pastes"), get(handlers::list))
        .layer(Extension(manager))
}
