pub mod auth_service;
pub mod backend_trait;
pub mod client;
pub mod content_service;
pub mod query;
pub mod settings_service;

pub use auth_service::AuthService;
pub use backend_trait::{AccountBackend, FileStore, PostStore};
pub use client::AppwriteClient;
pub use content_service::ContentService;
pub use query::Query;
pub use settings_service::SettingsService;
