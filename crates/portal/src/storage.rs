//! Blob storage client for avatar images.
//!
//! Speaks the storage REST API exposed by Supabase-style backends:
//!
//! - upload: `POST {url}/storage/v1/object/{bucket}/{key}` with `x-upsert: true`
//! - public read: `{url}/storage/v1/object/public/{bucket}/{key}`
//!
//! The stored reference is the object key within the bucket, never the URL.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use clubhouse_core::ports::BlobStore;
use clubhouse_core::{AvatarRef, PendingImage};

use crate::config::StorageConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur talking to blob storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage rejected the request.
    #[error("storage returned {status}: {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },

    /// A key or reference could not be turned into a URL.
    #[error("invalid object URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The reference is empty.
    #[error("empty object reference")]
    EmptyReference,
}

/// Client for the avatar bucket.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorageClientInner {
                client,
                base_url: with_trailing_slash(&config.url),
                service_key: config.service_key.expose_secret().to_string(),
                bucket: config.avatar_bucket.clone(),
            }),
        })
    }

    /// URL used to write an object.
    fn object_url(&self, key: &str) -> Result<Url, StorageError> {
        Ok(self
            .inner
            .base_url
            .join(&format!("storage/v1/object/{}/{key}", self.inner.bucket))?)
    }

    /// Upload `image` under `key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the request fails or storage rejects it.
    #[instrument(skip(self, image), fields(bucket = %self.inner.bucket, size = image.len()))]
    pub async fn put_object(&self, key: &str, image: &PendingImage) -> Result<AvatarRef, StorageError> {
        if key.is_empty() {
            return Err(StorageError::EmptyReference);
        }

        let response = self
            .inner
            .client
            .post(self.object_url(key)?)
            .bearer_auth(&self.inner.service_key)
            .header("apikey", &self.inner.service_key)
            .header("x-upsert", "true")
            .header(CONTENT_TYPE, &image.content_type)
            .body(image.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Storage upload rejected"
            );
            return Err(StorageError::Rejected {
                status,
                message: body.chars().take(200).collect(),
            });
        }

        debug!(key, "Avatar uploaded");
        Ok(AvatarRef::new(key))
    }

    /// Public URL of a stored object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the reference is empty or not a valid path.
    pub fn object_public_url(&self, reference: &AvatarRef) -> Result<Url, StorageError> {
        let key = reference.as_str().trim_start_matches('/');
        if key.is_empty() {
            return Err(StorageError::EmptyReference);
        }

        Ok(self
            .inner
            .base_url
            .join(&format!("storage/v1/object/public/{}/{key}", self.inner.bucket))?)
    }
}

impl BlobStore for StorageClient {
    type Error = StorageError;

    async fn upload(&self, key: &str, image: &PendingImage) -> Result<AvatarRef, Self::Error> {
        self.put_object(key, image).await
    }

    fn public_url(&self, reference: &AvatarRef) -> Result<Url, Self::Error> {
        self.object_public_url(reference)
    }
}

/// `Url::join` replaces the last segment unless the base ends in a slash.
fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
