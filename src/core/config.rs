//! Runtime configuration read once from the process environment.
//!
//! Every value is parsed into a typed field up front so a bad deployment
//! fails at startup, naming the offending variable, instead of on the first
//! request.

use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::{Result, SentimentError};
use crate::loaders::{ArtifactLocation, RemoteSource};
use crate::models::ArtifactFamily;
use crate::pipelines::sentiment::Polarity;
use crate::pipelines::utils::DeviceRequest;

const PREFIX: &str = "BADBUZZ_";

/// When the artifact is read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Load (and warm up) before the listener is bound.
    #[default]
    Eager,
    /// Load on the first prediction request.
    Lazy,
}

impl FromStr for LoadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" => Ok(LoadMode::Eager),
            "lazy" => Ok(LoadMode::Lazy),
            other => Err(format!("expected `eager` or `lazy`, got `{other}`")),
        }
    }
}

/// Where the artifact files live and how their output is interpreted.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub family: ArtifactFamily,
    /// Pipeline JSON, classifier JSON or safetensors weights depending on the family.
    pub model: ArtifactLocation,
    pub vectorizer: ArtifactLocation,
    pub tokenizer: ArtifactLocation,
    pub model_config: ArtifactLocation,
    pub scalar_polarity: Polarity,
    pub device: DeviceRequest,
}

impl ArtifactConfig {
    /// Defaults for `family` with every file in the working directory.
    pub fn new(family: ArtifactFamily) -> Self {
        Self {
            family,
            model: ArtifactLocation::local(default_model_path(family)),
            vectorizer: ArtifactLocation::local("vectorizer.json"),
            tokenizer: ArtifactLocation::local("tokenizer.json"),
            model_config: ArtifactLocation::local("config.json"),
            scalar_polarity: Polarity::default(),
            device: DeviceRequest::default(),
        }
    }
}

fn default_model_path(family: ArtifactFamily) -> &'static str {
    match family {
        ArtifactFamily::Pipeline => "pipeline.json",
        ArtifactFamily::Vectorizer => "model.json",
        ArtifactFamily::Sequence => "model.safetensors",
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub artifacts: ArtifactConfig,
    pub load_mode: LoadMode,
    pub warmup: bool,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let family: ArtifactFamily = parse_or(&var, "MODEL_FAMILY", ArtifactFamily::Pipeline)?;
        let mut artifacts = ArtifactConfig::new(family);

        artifacts.model = location(&var, "MODEL", artifacts.model)?;
        artifacts.vectorizer = location(&var, "VECTORIZER", artifacts.vectorizer)?;
        artifacts.tokenizer = location(&var, "TOKENIZER", artifacts.tokenizer)?;
        artifacts.model_config = location(&var, "MODEL_CONFIG", artifacts.model_config)?;
        artifacts.scalar_polarity = parse_or(&var, "SCALAR_POLARITY", Polarity::default())?;
        artifacts.device = parse_or(&var, "DEVICE", DeviceRequest::default())?;

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "PORT", 5000u16)?,
            artifacts,
            load_mode: parse_or(&var, "LOAD_MODE", LoadMode::default())?,
            warmup: parse_bool(&var, "WARMUP", true)?,
            log_filter: var("LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, V>(var: &V, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| SentimentError::config(&format!("{PREFIX}{name}"), e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool<V>(var: &V, name: &str, default: bool) -> Result<bool>
where
    V: Fn(&str) -> Option<String>,
{
    match var(name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(SentimentError::config(
            &format!("{PREFIX}{name}"),
            format!("expected a boolean, got `{v}`"),
        )),
    }
}

fn location<V>(var: &V, name: &str, default: ArtifactLocation) -> Result<ArtifactLocation>
where
    V: Fn(&str) -> Option<String>,
{
    let path = var(&format!("{name}_PATH"))
        .map(PathBuf::from)
        .unwrap_or(default.path);
    let remote = match var(&format!("{name}_URL")) {
        Some(raw) => Some(RemoteSource::parse(&raw).map_err(|e| {
            SentimentError::config(&format!("{PREFIX}{name}_URL"), e.to_string())
        })?),
        None => None,
    };
    Ok(ArtifactLocation { path, remote })
}
