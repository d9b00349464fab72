use std::path::Path;
use std::sync::Arc;

use crate::config::{load_settings, validate};
use crate::error::Result;
use crate::models::AppSettings;
use crate::services::{
    AccountBackend, AppwriteClient, AuthService, ContentService, FileStore, PostStore,
    SettingsService,
};

/// Service handles built once at application startup.
///
/// Both services share one `AppwriteClient`, so a session started through
/// `accounts()` authorizes the post and file calls too. Cloning is cheap.
#[derive(Clone)]
pub struct Backend {
    settings: Arc<AppSettings>,
    auth: Arc<AuthService>,
    content: Arc<ContentService>,
}

impl Backend {
    pub fn new(settings: AppSettings) -> Result<Self> {
        validate(&settings)?;

        let client = AppwriteClient::new(&settings.backend, &settings.client)?;
        let auth = AuthService::new(client.clone(), &settings.auth);
        let content = ContentService::new(client, &settings);

        log::info!(
            "Backend ready for project {} at {}",
            settings.backend.project_id,
            settings.backend.endpoint
        );

        Ok(Self {
            settings: Arc::new(settings),
            auth: Arc::new(auth),
            content: Arc::new(content),
        })
    }

    /// Defaults, then `file`, then `BLOG_*` environment variables.
    pub fn from_environment(file: Option<&Path>) -> Result<Self> {
        Self::new(load_settings(file)?)
    }

    /// Settings saved in the user's config directory.
    pub async fn from_stored_settings() -> anyhow::Result<Self> {
        let settings = SettingsService::load_settings().await?;
        Ok(Self::new(settings)?)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn accounts(&self) -> Arc<dyn AccountBackend> {
        self.auth.clone()
    }

    pub fn posts(&self) -> Arc<dyn PostStore> {
        self.content.clone()
    }

    pub fn files(&self) -> Arc<dyn FileStore> {
        self.content.clone()
    }

    /// Concrete content service, for operations outside the traits such as downloads.
    pub fn content(&self) -> &ContentService {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn rejects_incomplete_settings() {
        assert!(Backend::new(AppSettings::default()).is_err());
    }

    #[test]
    fn builds_from_complete_settings() {
        let mut settings = AppSettings::default();
        settings.backend.project_id = "proj".to_string();
        settings.backend.database_id = "blog".to_string();
        settings.backend.collection_id = "posts".to_string();
        settings.backend.bucket_id = "images".to_string();

        let backend = Backend::new(settings).unwrap();
        assert_eq!(backend.settings().backend.bucket_id, "images");

        let url = backend.files().file_view_url("f1").unwrap();
        assert!(url.as_str().contains("/storage/buckets/images/files/f1/view"));
    }

    #[test]
    #[serial(env)]
    fn from_environment_reads_blog_variables() {
        let backend = crate::config::with_blog_env(
            &[
                ("BLOG_BACKEND__PROJECT_ID", "env-project"),
                ("BLOG_BACKEND__DATABASE_ID", "env-db"),
                ("BLOG_BACKEND__COLLECTION_ID", "env-posts"),
                ("BLOG_BACKEND__BUCKET_ID", "env-images"),
            ],
            || Backend::from_environment(None),
        )
        .unwrap();

        assert_eq!(backend.settings().backend.project_id, "env-project");
        assert_eq!(backend.settings().backend.collection_id, "env-posts");
    }

    #[test]
    #[serial(env)]
    fn from_environment_without_ids_fails() {
        let result = crate::config::with_blog_env(&[], || Backend::from_environment(None));
        assert!(matches!(result, Err(crate::error::BackendError::Config(_))));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    #[serial(env)]
    async fn from_stored_settings_uses_saved_settings() {
        use crate::services::settings_service::ConfigHomeGuard;

        let home = tempfile::tempdir().unwrap();
        let _guard = ConfigHomeGuard::set(home.path());

        let mut settings = AppSettings::default();
        settings.backend.project_id = "stored".to_string();
        settings.backend.database_id = "blog".to_string();
        settings.backend.collection_id = "posts".to_string();
        settings.backend.bucket_id = "covers".to_string();
        SettingsService::save_settings(&settings).await.unwrap();

        let backend = Backend::from_stored_settings().await.unwrap();
        assert_eq!(backend.settings().backend.project_id, "stored");
        assert_eq!(backend.settings().backend.bucket_id, "covers");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    #[serial(env)]
    async fn from_stored_settings_rejects_incomplete_defaults() {
        use crate::services::settings_service::ConfigHomeGuard;

        let home = tempfile::tempdir().unwrap();
        let _guard = ConfigHomeGuard::set(home.path());

        assert!(Backend::from_stored_settings().await.is_err());
    }
}
