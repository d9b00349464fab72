// ============================================================================
// Appwrite Client - shared HTTP plumbing for every service
// ============================================================================
// Owns the reqwest client (connection pool + session cookie jar), the
// normalized endpoint and the project header. Services clone this handle;
// clones share the same session.
// ============================================================================

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{BackendError, Result};
use crate::models::{BackendSettings, ClientSettings};
use crate::utils::normalize_endpoint;

const PROJECT_HEADER: &str = "X-Appwrite-Project";

#[derive(Clone)]
pub struct AppwriteClient {
    http: Client,
    endpoint: String,
    project_id: String,
}

impl AppwriteClient {
    pub fn new(backend: &BackendSettings, client: &ClientSettings) -> Result<Self> {
        let endpoint = normalize_endpoint(&backend.endpoint);
        Url::parse(&endpoint).map_err(|e| {
            BackendError::Config(format!("endpoint '{}' is not a URL: {}", endpoint, e))
        })?;

        let project = HeaderValue::from_str(&backend.project_id).map_err(|_| {
            BackendError::Config(format!(
                "project id '{}' is not a valid header value",
                backend.project_id
            ))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(PROJECT_HEADER, project);

        let http = Client::builder()
            .user_agent(client.user_agent.clone())
            .timeout(Duration::from_secs(client.timeout_secs))
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            project_id: backend.project_id.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Absolute URL for an API path such as `/account`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.http.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.send("GET", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        let response = self.send("POST", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.patch(self.url(path)).json(body);
        let response = self.send("PATCH", path, request).await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let request = self.http.delete(self.url(path));
        self.send("DELETE", path, request).await?;
        Ok(())
    }

    /// Sends a prepared request and turns non-2xx answers into `BackendError::Remote`.
    pub(crate) async fn send(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Response> {
        log::debug!("Appwrite {} {}", method, path);

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_response_body(status.as_u16(), &body));
        }

        Ok(response)
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Percent-encodes one path segment (slugs and ids are caller-supplied).
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
