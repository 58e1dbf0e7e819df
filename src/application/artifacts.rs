//! Artifact extraction for tool results.
//!
//! Screenshot and recording tools answer with a JSON object carrying either
//! an inline base64 payload or a download URL, both paired with a filename.
//! Inline payloads are persisted and stripped before the text re-enters the
//! transcript; the raw encoding is far larger than useful context and the
//! model cannot consume it. Download URLs are fetched and the object is
//! forwarded untouched.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map as JsonMap, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ArtifactError>;
}

/// Fetcher backed by a plain HTTP GET.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ArtifactError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ArtifactError::Fetch {
                url: url.to_string(),
                message: source.to_string(),
            })?;
        let bytes = response.bytes().await.map_err(|source| ArtifactError::Fetch {
            url: url.to_string(),
            message: source.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// Result of one extraction pass: the text to append to the transcript and
/// the files persisted along the way.
#[derive(Debug)]
pub struct Extraction {
    pub text: String,
    pub saved: Vec<PathBuf>,
}

pub struct ArtifactExtractor {
    fetcher: Arc<dyn ArtifactFetcher>,
    output_dir: PathBuf,
}

impl ArtifactExtractor {
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            output_dir: output_dir.into(),
        }
    }

    /// Inspect one raw tool result. Non-JSON text and JSON without artifact
    /// fields pass through unchanged. Decode and persistence failures degrade
    /// to pass-through; they never abort the run.
    ///
    /// `base64` and `download_url` are independently optional; when a result
    /// carries both, both rules apply.
    pub async fn process(&self, raw: &str) -> Extraction {
        let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(raw) else {
            return Extraction {
                text: raw.to_string(),
                saved: Vec::new(),
            };
        };

        let filename = object
            .get("filename")
            .and_then(Value::as_str)
            .map(str::to_string);
        let encoded = object
            .get("base64")
            .and_then(Value::as_str)
            .map(str::to_string);
        let download_url = object
            .get("download_url")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut saved = Vec::new();
        let mut rewritten = false;

        if let (Some(encoded), Some(name)) = (encoded, filename.as_deref()) {
            match BASE64.decode(encoded.as_bytes()) {
                Ok(bytes) => {
                    let path = self.output_dir.join(name);
                    match tokio::fs::write(&path, &bytes).await {
                        Ok(()) => {
                            info!(path = %path.display(), "saved artifact");
                            saved.push(path);
                            object.remove("base64");
                            object.insert("saved".to_string(), Value::Bool(true));
                            rewritten = true;
                        }
                        Err(source) => {
                            warn!(
                                path = %path.display(),
                                %source,
                                "failed to persist artifact; forwarding original result"
                            );
                        }
                    }
                }
                Err(source) => {
                    debug!(%source, "base64 field did not decode; passing result through");
                }
            }
        }

        if let (Some(url), Some(name)) = (download_url, filename.as_deref()) {
            match self.save_remote(&url, name).await {
                Ok(path) => {
                    info!(path = %path.display(), "saved artifact");
                    saved.push(path);
                }
                Err(source) => {
                    warn!(%source, "failed to persist artifact; forwarding original result");
                }
            }
        }

        let text = if rewritten {
            serialize_object(object).unwrap_or_else(|| raw.to_string())
        } else {
            raw.to_string()
        };
        Extraction { text, saved }
    }

    async fn save_remote(&self, url: &str, name: &str) -> Result<PathBuf, ArtifactError> {
        let bytes = self.fetcher.fetch(url).await?;
        let path = self.output_dir.join(name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| ArtifactError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

fn serialize_object(object: JsonMap<String, Value>) -> Option<String> {
    serde_json::to_string(&Value::Object(object)).ok()
}
