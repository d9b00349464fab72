use crate::models::AppSettings;
use anyhow::Result;

const APP_NAME: &str = "blog-backend";
const CONFIG_NAME: &str = "settings";

/// Per-user settings persisted in the platform config directory.
pub struct SettingsService;

impl SettingsService {
    pub async fn load_settings() -> Result<AppSettings> {
        match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                // If loading fails, return default settings and save them
                log::warn!("Could not read stored settings ({}), using defaults", err);
                let default_settings = AppSettings::default();
                if let Err(save_err) = Self::save_settings(&default_settings).await {
                    log::warn!("Could not store default settings: {}", save_err);
                }
                Ok(default_settings)
            }
        }
    }

    pub async fn save_settings(settings: &AppSettings) -> Result<()> {
        // Incomplete settings may still be saved; `Backend::new` checks them again.
        if let Err(err) = crate::config::validate(settings) {
            log::debug!("Saving incomplete settings: {}", err);
        }

        confy::store(APP_NAME, CONFIG_NAME, settings)
            .map_err(|e| anyhow::anyhow!("Failed to save settings: {}", e))
    }

    pub fn settings_path() -> Result<std::path::PathBuf> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
            .map_err(|e| anyhow::anyhow!("Failed to locate settings file: {}", e))
    }
}

/// Points confy at `path` for the lifetime of the guard (Linux only).
/// Callers must hold the `env` serial lock.
#[cfg(all(test, target_os = "linux"))]
pub(crate) struct ConfigHomeGuard {
    previous: Option<std::ffi::OsString>,
}

#[cfg(all(test, target_os = "linux"))]
impl ConfigHomeGuard {
    pub(crate) fn set(path: &std::path::Path) -> Self {
        let previous = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", path);
        Self { previous }
    }
}

#[cfg(all(test, target_os = "linux"))]
impl Drop for ConfigHomeGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial(env)]
    async fn saved_settings_load_back() {
        let home = tempfile::tempdir().unwrap();
        let _guard = ConfigHomeGuard::set(home.path());

        let mut settings = AppSettings::default();
        settings.backend.project_id = "stored-project".to_string();
        settings.backend.bucket_id = "stored-images".to_string();
        SettingsService::save_settings(&settings).await.unwrap();

        assert!(SettingsService::settings_path()
            .unwrap()
            .starts_with(home.path()));

        let loaded = SettingsService::load_settings().await.unwrap();
        assert_eq!(loaded.backend.project_id, "stored-project");
        assert_eq!(loaded.backend.bucket_id, "stored-images");
    }

    #[tokio::test]
    #[serial(env)]
    async fn unwritable_config_dir_falls_back_to_defaults() {
        // A regular file where the config directory should be: neither
        // loading nor storing the defaults can succeed.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let _guard = ConfigHomeGuard::set(blocker.path());

        assert!(SettingsService::save_settings(&AppSettings::default())
            .await
            .is_err());

        let loaded = SettingsService::load_settings().await.unwrap();
        assert!(loaded.backend.project_id.is_empty());
        assert_eq!(loaded.client.timeout_secs, 30);
    }
}
