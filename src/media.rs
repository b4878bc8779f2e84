use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Moves a client-supplied local file into media storage and hands back
/// its public URL.
///
/// Upload failures degrade to `None`; callers decide whether the asset
/// was required or optional.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, local_path: &str) -> Option<String>;
}

#[derive(Clone)]
pub struct MediaClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    path: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

impl MediaClient {
    pub fn new(base_url: String, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url,
        }
    }
}

#[async_trait]
impl MediaStore for MediaClient {
    async fn upload(&self, local_path: &str) -> Option<String> {
        let url = format!("{}/upload", self.base_url);
        let request = UploadRequest { path: local_path };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach media storage: {}", e);
            })
            .ok()?
            .error_for_status()
            .map_err(|e| {
                tracing::error!("Media storage returned error: {}", e);
            })
            .ok()?;

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse media storage response: {}", e);
            })
            .ok()?;

        Some(uploaded.url)
    }
}
