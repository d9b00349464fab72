use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{BackendError, Result};
use crate::models::{
    AppSettings, FileUpload, NewPost, Post, PostList, PostPatch, PreviewOptions, StoredFile,
};
use crate::services::client::segment;
use crate::services::{AppwriteClient, FileStore, PostStore, Query};
use crate::utils::{unique_id, validate_id};

/// Appwrite requires uploads above this size to arrive in chunks of this size.
pub const UPLOAD_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Post documents in one collection plus file assets in one bucket.
#[derive(Clone)]
pub struct ContentService {
    client: AppwriteClient,
    database_id: String,
    collection_id: String,
    bucket_id: String,
    download_dir: PathBuf,
}

impl ContentService {
    pub fn new(client: AppwriteClient, settings: &AppSettings) -> Self {
        Self {
            client,
            database_id: settings.backend.database_id.clone(),
            collection_id: settings.backend.collection_id.clone(),
            bucket_id: settings.backend.bucket_id.clone(),
            download_dir: PathBuf::from(&settings.storage.download_dir),
        }
    }

    fn documents_path(&self) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            segment(&self.database_id),
            segment(&self.collection_id)
        )
    }

    fn document_path(&self, slug: &str) -> String {
        format!("{}/{}", self.documents_path(), segment(slug))
    }

    fn files_path(&self) -> String {
        format!("/storage/buckets/{}/files", segment(&self.bucket_id))
    }

    fn file_path(&self, file_id: &str) -> String {
        format!("{}/{}", self.files_path(), segment(file_id))
    }

    fn file_url(&self, file_id: &str, action: &str) -> Result<Url> {
        validate_id(file_id)?;

        let raw = self
            .client
            .url(&format!("{}/{}", self.file_path(file_id), action));
        let mut url = Url::parse(&raw)
            .map_err(|e| BackendError::Config(format!("cannot build file URL '{}': {}", raw, e)))?;
        url.query_pairs_mut()
            .append_pair("project", self.client.project_id());

        Ok(url)
    }

    async fn upload_chunk(
        &self,
        file_id: &str,
        file: &FileUpload,
        start: usize,
        end: usize,
    ) -> Result<StoredFile> {
        let total = file.bytes.len();
        let mut part = Part::bytes(file.bytes[start..end].to_vec()).file_name(file.name.clone());
        if let Some(mime_type) = file.mime_type.as_deref() {
            part = part.mime_str(mime_type)?;
        }

        let form = Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let path = self.files_path();
        let mut request = self.client.http().post(self.client.url(&path)).multipart(form);

        if total > UPLOAD_CHUNK_SIZE {
            log::debug!("Uploading {} bytes {}-{} of {}", file.name, start, end, total);
            request = request.header("Content-Range", format!("bytes {}-{}/{}", start, end - 1, total));
            if start > 0 {
                request = request.header("X-Appwrite-ID", file_id);
            }
        }

        let response = self.client.send("POST", &path, request).await?;
        AppwriteClient::decode(response).await
    }

    /// Fetches a file and writes it into the configured download directory.
    pub async fn download_file(&self, file_id: &str) -> Result<PathBuf> {
        let metadata = self.get_file(file_id).await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let file_path = self.download_dir.join(Self::local_file_name(&metadata));

        let path = format!("{}/download", self.file_path(file_id));
        let request = self.client.http().get(self.client.url(&path));
        let response = self.client.send("GET", &path, request).await.map_err(|err| {
            log::warn!("content :: download_file :: {}", err);
            err
        })?;

        let mut file = tokio::fs::File::create(&file_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        log::info!("Downloaded file {} to {}", file_id, file_path.display());

        Ok(file_path)
    }

    fn local_file_name(metadata: &StoredFile) -> String {
        let name = Path::new(&metadata.name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("file");

        format!("{}_{}", metadata.id, name)
    }
}

#[async_trait]
impl PostStore for ContentService {
    async fn create_post(&self, post: NewPost) -> Result<Post> {
        validate_id(&post.slug)?;

        let body = json!({
            "documentId": post.slug,
            "data": post,
        });

        match self.client.post_json(&self.documents_path(), &body).await {
            Ok(created) => Ok(created),
            Err(err) if err.is_conflict() => {
                log::warn!("content :: create_post :: slug '{}' already exists", post.slug);
                Err(BackendError::SlugTaken(post.slug))
            }
            Err(err) => {
                log::error!("content :: create_post :: {}", err);
                Err(err)
            }
        }
    }

    async fn update_post(&self, slug: &str, patch: PostPatch) -> Result<Post> {
        validate_id(slug)?;

        let body = json!({ "data": patch });

        self.client
            .patch_json(&self.document_path(slug), &body)
            .await
            .map_err(|err| {
                log::error!("content :: update_post :: {}", err);
                err
            })
    }

    async fn delete_post(&self, slug: &str) -> Result<()> {
        validate_id(slug)?;

        self.client
            .delete(&self.document_path(slug))
            .await
            .map_err(|err| {
                log::error!("content :: delete_post :: {}", err);
                err
            })
    }

    async fn get_post(&self, slug: &str) -> Result<Option<Post>> {
        validate_id(slug)?;

        match self.client.get(&self.document_path(slug), &[]).await {
            Ok(post) => Ok(Some(post)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => {
                log::error!("content :: get_post :: {}", err);
                Err(err)
            }
        }
    }

    async fn list_posts(&self, queries: &[Query]) -> Result<PostList> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_param()))
            .collect();

        self.client
            .get(&self.documents_path(), &params)
            .await
            .map_err(|err| {
                log::error!("content :: get_posts :: {}", err);
                err
            })
    }
}

#[async_trait]
impl FileStore for ContentService {
    async fn upload_file(&self, file: FileUpload) -> Result<StoredFile> {
        let file_id = unique_id();
        let total = file.bytes.len();

        if total <= UPLOAD_CHUNK_SIZE {
            return self
                .upload_chunk(&file_id, &file, 0, total)
                .await
                .map_err(|err| {
                    log::error!("content :: upload_file :: {}", err);
                    err
                });
        }

        let mut start = 0;
        loop {
            let end = (start + UPLOAD_CHUNK_SIZE).min(total);
            let stored = self
                .upload_chunk(&file_id, &file, start, end)
                .await
                .map_err(|err| {
                    log::error!("content :: upload_file :: chunk at {}: {}", start, err);
                    err
                })?;

            if end == total {
                return Ok(stored);
            }
            start = end;
        }
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        validate_id(file_id)?;

        self.client
            .delete(&self.file_path(file_id))
            .await
            .map_err(|err| {
                log::error!("content :: delete_file :: {}", err);
                err
            })
    }

    async fn get_file(&self, file_id: &str) -> Result<StoredFile> {
        validate_id(file_id)?;
        self.client.get(&self.file_path(file_id), &[]).await
    }

    fn preview_file(&self, file_id: &str, options: &PreviewOptions) -> Result<Url> {
        let mut url = self.file_url(file_id, "preview")?;

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(width) = options.width {
                pairs.append_pair("width", &width.to_string());
            }
            if let Some(height) = options.height {
                pairs.append_pair("height", &height.to_string());
            }
            if let Some(quality) = options.quality {
                pairs.append_pair("quality", &quality.min(100).to_string());
            }
            if let Some(output) = options.output {
                pairs.append_pair("output", output.as_str());
            }
        }

        Ok(url)
    }

    fn file_view_url(&self, file_id: &str) -> Result<Url> {
        self.file_url(file_id, "view")
    }
}
