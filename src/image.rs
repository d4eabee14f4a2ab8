//! Image hosting client.
//!
//! Uploads go to the configured HTTP host first; when that fails the
//! bytes land in the local public images directory and its path is
//! served instead. Only a failure of both surfaces an error.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use crate::config;
use crate::error::{Result, ServerError};

const DEFAULT_FALLBACK_DIR: &str = "./public/images";
const DEFAULT_PUBLIC_PREFIX: &str = "/images";

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("host rejected upload with status {0}")]
    Rejected(u16),
    #[error("host reply carried no image URL")]
    MalformedResponse,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct HostResponse {
    status_code: Option<u16>,
    image: Option<HostImage>,
}

#[derive(Debug, Deserialize)]
struct HostImage {
    url: String,
}

/// Client for the image host with a local-storage fallback.
#[derive(Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    endpoint: Option<Url>,
    api_key: Option<String>,
    fallback_dir: PathBuf,
    public_prefix: String,
}

impl ImageHost {
    /// Create a new [`ImageHost`] from configuration.
    pub fn new(config: Option<&config::Images>) -> Self {
        let endpoint = config
            .and_then(|cfg| cfg.endpoint.as_deref())
            .and_then(|endpoint| Url::parse(endpoint).ok());

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: config.and_then(|cfg| cfg.api_key.clone()),
            fallback_dir: config
                .and_then(|cfg| cfg.fallback_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_DIR)),
            public_prefix: config
                .and_then(|cfg| cfg.public_prefix.clone())
                .unwrap_or_else(|| DEFAULT_PUBLIC_PREFIX.to_owned()),
        }
    }

    /// Upload bytes, returning the URL they are now served from.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String> {
        if let Some(endpoint) = self.endpoint.clone() {
            match self.upload_remote(endpoint, bytes.clone(), filename).await {
                Ok(url) => return Ok(url),
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        %filename,
                        "image host unreachable, falling back to local storage"
                    );
                },
            }
        }

        self.store_local(bytes, filename)
            .await
            .map_err(|err| ServerError::Upload {
                details: err.to_string(),
            })
    }

    async fn upload_remote(
        &self,
        endpoint: Url,
        bytes: Vec<u8>,
        filename: &str,
    ) -> std::result::Result<String, HostError> {
        let mut form = Form::new()
            .part("source", Part::bytes(bytes).file_name(filename.to_owned()))
            .text("format", "json");

        if let Some(key) = &self.api_key {
            form = form.text("key", key.clone());
        }

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HostError::Rejected(response.status().as_u16()));
        }

        let reply: HostResponse = response.json().await?;
        match reply {
            HostResponse {
                status_code: Some(200) | None,
                image: Some(image),
            } => Ok(image.url),
            _ => Err(HostError::MalformedResponse),
        }
    }

    async fn store_local(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> std::result::Result<String, HostError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let name = format!("{millis}-{}", sanitize(filename));

        tokio::fs::create_dir_all(&self.fallback_dir).await?;
        tokio::fs::write(self.fallback_dir.join(&name), bytes).await?;

        Ok(format!("{}/{name}", self.public_prefix))
    }
}

/// Keep filename characters that are safe on disk and in URLs.
fn sanitize(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
