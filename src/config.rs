//! Proxy configuration file parsing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rewriter::{Codec, CodecKind, ProxyEnvironment, UrlRewriter};

pub const DEFAULT_PREFIX: &str = "/service/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("prefix {0:?} must start and end with '/'")]
    InvalidPrefix(String),
}

/// Where proxied addresses live and how they are encoded.
///
/// ```toml
/// origin = "https://proxy.test"
/// prefix = "/service/"
/// codec = "xor"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Proxy origin, e.g. `https://proxy.test`.
    pub origin: String,

    /// Path segment marking proxied addresses.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Codec for address components.
    #[serde(default)]
    pub codec: CodecKind,

    /// Current proxied location of the frame, used when a document's base
    /// is an `about:` address.
    #[serde(default)]
    pub location: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl ProxyConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        ProxyConfig {
            origin: origin.into(),
            prefix: default_prefix(),
            codec: CodecKind::default(),
            location: None,
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ProxyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.prefix.starts_with('/') || !self.prefix.ends_with('/') {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        Ok(())
    }

    pub fn environment(&self) -> ProxyEnvironment {
        let env = ProxyEnvironment::new(self.origin.clone(), self.prefix.clone());
        match &self.location {
            Some(location) => env.with_location(location.clone()),
            None => env,
        }
    }

    pub fn codec(&self) -> Box<dyn Codec> {
        self.codec.build()
    }

    pub fn rewriter(&self) -> UrlRewriter {
        UrlRewriter::new(self.environment(), self.codec())
    }
}
