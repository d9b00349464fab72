//! Appwrite-backed services for a blogging application: accounts and
//! sessions, post documents keyed by slug, and image files.
//!
//! Build a [`Backend`] once at startup and hand its trait-object handles to
//! whatever needs them.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use app::Backend;
pub use error::{BackendError, Result};
pub use services::{AccountBackend, FileStore, PostStore, Query};

/// Initialize logging at info level unless `RUST_LOG` says otherwise.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .filter_module("hyper", log::LevelFilter::Warn)
        .parse_default_env()
        .try_init();
}
