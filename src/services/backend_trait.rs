// ============================================================================
// Backend Traits - the seams consumers depend on
// ============================================================================
// The application holds these as `Arc<dyn ...>` handles built once at
// startup (see `app::Backend`). `AuthService` implements `AccountBackend`;
// `ContentService` implements `PostStore` and `FileStore`.
// ============================================================================

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::models::{
    FileUpload, NewPost, Post, PostList, PostPatch, PreviewOptions, Session, StoredFile, User,
};
use crate::services::query::{default_post_queries, Query};

/// Account and session management
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// Create an account and log straight into it.
    ///
    /// Returns whatever `login` returns for the new credentials.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Option<Session>>;

    /// Start an email/password session.
    ///
    /// `Ok(None)` only happens under `LoginFailurePolicy::TreatAsSignedOut`.
    async fn login(&self, email: &str, password: &str) -> Result<Option<Session>>;

    /// The signed-in user, or `None` when there is no session.
    async fn get_current_user(&self) -> Result<Option<User>>;

    /// Delete every session of the current user.
    async fn logout(&self) -> Result<()>;

    /// Delete only the session this client holds.
    async fn logout_current(&self) -> Result<()>;
}

/// Blog post documents keyed by slug
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<Post>;

    async fn update_post(&self, slug: &str, patch: PostPatch) -> Result<Post>;

    /// Fails with a not-found error when the slug does not exist.
    async fn delete_post(&self, slug: &str) -> Result<()>;

    /// `Ok(None)` when no post has this slug.
    async fn get_post(&self, slug: &str) -> Result<Option<Post>>;

    /// List posts matching every query in `queries`.
    async fn list_posts(&self, queries: &[Query]) -> Result<PostList>;

    /// List posts, defaulting to active ones when no queries are given.
    async fn get_posts(&self, queries: Option<Vec<Query>>) -> Result<PostList> {
        let queries = queries.unwrap_or_else(default_post_queries);
        self.list_posts(&queries).await
    }
}

/// Binary assets in the configured bucket
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload_file(&self, file: FileUpload) -> Result<StoredFile>;

    /// Fails with a not-found error when the file is already gone.
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    async fn get_file(&self, file_id: &str) -> Result<StoredFile>;

    /// Renderable preview URL; built locally, no request is made.
    fn preview_file(&self, file_id: &str, options: &PreviewOptions) -> Result<Url>;

    /// URL of the original bytes; built locally.
    fn file_view_url(&self, file_id: &str) -> Result<Url>;
}
