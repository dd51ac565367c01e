//! Artifact file resolution.
//!
//! Every artifact has a local path. When the file is absent and a remote
//! source is configured, the file is fetched first and written verbatim to
//! that path, so later starts read it from disk.
//!
//! ## Main Types
//!
//! - [`ArtifactLocation`] - Local path plus optional remote source
//! - [`RemoteSource`] - Plain HTTP(S) URL or a Hugging Face Hub file
//! - [`HttpLoader`] - Downloads a URL to a destination path
//! - [`HfLoader`] - Resolves a file through the Hugging Face Hub cache

use std::fmt;
use std::path::{Path, PathBuf};

use hf_hub::api::tokio::ApiBuilder;

use crate::core::error::{Result, SentimentError};

const HF_SCHEME: &str = "hf://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSource {
    Http(String),
    HuggingFace { repo: String, filename: String },
}

impl RemoteSource {
    /// Parse `http(s)://...` or `hf://<owner>/<repo>/<filename>`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(RemoteSource::Http(raw.to_string()));
        }

        if let Some(rest) = raw.strip_prefix(HF_SCHEME) {
            let mut parts = rest.splitn(3, '/');
            let owner = parts.next().unwrap_or_default();
            let name = parts.next().unwrap_or_default();
            let filename = parts.next().unwrap_or_default();
            if owner.is_empty() || name.is_empty() || filename.is_empty() {
                return Err(SentimentError::Download(format!(
                    "expected hf://<owner>/<repo>/<filename>, got `{raw}`"
                )));
            }
            return Ok(RemoteSource::HuggingFace {
                repo: format!("{owner}/{name}"),
                filename: filename.to_string(),
            });
        }

        Err(SentimentError::Download(format!(
            "unsupported remote source `{raw}` (use http://, https:// or hf://)"
        )))
    }

    /// Fetch the remote file and write it to `dest`.
    pub async fn fetch_to(&self, dest: &Path) -> Result<()> {
        match self {
            RemoteSource::Http(url) => HttpLoader::new(url).load(dest).await,
            RemoteSource::HuggingFace { repo, filename } => {
                let cached = HfLoader::new(repo, filename).load().await?;
                ensure_parent(dest).await?;
                tokio::fs::copy(&cached, dest).await?;
                Ok(())
            }
        }
    }
}

impl fmt::Display for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteSource::Http(url) => f.write_str(url),
            RemoteSource::HuggingFace { repo, filename } => {
                write!(f, "{HF_SCHEME}{repo}/{filename}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub path: PathBuf,
    pub remote: Option<RemoteSource>,
}

impl ArtifactLocation {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote: None,
        }
    }

    pub fn with_remote(mut self, remote: RemoteSource) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Return the local path, downloading the file first if it is missing.
    pub async fn ensure_local(&self) -> Result<PathBuf> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(self.path.clone());
        }

        let Some(remote) = &self.remote else {
            return Err(SentimentError::ArtifactNotFound(self.path.clone()));
        };

        tracing::info!(source = %remote, path = %self.path.display(), "artifact missing locally, downloading");
        remote.fetch_to(&self.path).await?;
        tracing::info!(path = %self.path.display(), "artifact downloaded");

        Ok(self.path.clone())
    }
}

#[derive(Debug, Clone)]
pub struct HttpLoader {
    pub url: String,
}

impl HttpLoader {
    pub fn new(url: &str) -> Self {
        Self { url: url.into() }
    }

    /// Download the body verbatim. The file appears at `dest` only once complete.
    pub async fn load(&self, dest: &Path) -> Result<()> {
        let response = reqwest::get(self.url.as_str()).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::Download(format!(
                "GET {} returned {status}",
                self.url
            )));
        }
        let bytes = response.bytes().await?;

        ensure_parent(dest).await?;
        let partial = partial_path(dest);
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, dest).await?;

        tracing::debug!(url = %self.url, bytes = bytes.len(), "download complete");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    /// Resolve the file through the hub cache and return its cached path.
    pub async fn load(&self) -> Result<PathBuf> {
        let hf_api = ApiBuilder::new().with_chunk_size(None).build()?;
        let hf_api = hf_api.model(self.repo.clone());
        Ok(hf_api.get(self.filename.as_str()).await?)
    }
}

async fn ensure_parent(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
