// ============================================================================
// Settings loading
// ============================================================================
// Layers built-in defaults, an optional settings file and `BLOG_*`
// environment variables (e.g. BLOG_BACKEND__PROJECT_ID), then validates the
// result before any service is built from it.
// ============================================================================

use std::path::Path;

use ::config::{Config, Environment, File};
use url::Url;

use crate::error::{BackendError, Result};
use crate::models::AppSettings;
use crate::utils::normalize_endpoint;

pub const ENV_PREFIX: &str = "BLOG";

pub fn load_settings(file: Option<&Path>) -> Result<AppSettings> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppSettings::default())?);

    if let Some(path) = file {
        log::info!("Loading settings from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let settings: AppSettings = builder.build()?.try_deserialize()?;
    validate(&settings)?;

    Ok(settings)
}

/// Runs `f` with every `BLOG_*` variable removed and `vars` set, then restores
/// the previous environment. Callers must hold the `env` serial lock.
#[cfg(test)]
pub(crate) fn with_blog_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let saved: Vec<(String, String)> = std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();

    for (key, _) in &saved {
        std::env::remove_var(key);
    }
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, _) in vars {
        std::env::remove_var(key);
    }
    for (key, value) in &saved {
        std::env::set_var(key, value);
    }

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Rejects settings that could never produce a working client.
pub fn validate(settings: &AppSettings) -> Result<()> {
    let backend = &settings.backend;
    let endpoint = normalize_endpoint(&backend.endpoint);

    Url::parse(&endpoint)
        .map_err(|e| BackendError::Config(format!("endpoint '{}' is not a URL: {}", endpoint, e)))?;

    let required = [
        ("project_id", &backend.project_id),
        ("database_id", &backend.database_id),
        ("collection_id", &backend.collection_id),
        ("bucket_id", &backend.bucket_id),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(BackendError::Config(format!("backend.{} must be set", name)));
        }
    }

    if settings.client.timeout_secs == 0 {
        return Err(BackendError::Config(
            "client.timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
