//! Configuration file parser for crib's config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// `base_url` is empty, unparseable, or not http(s).
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level configuration for the cheat-sheet store.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`. Note the default `base_url`
/// is empty and fails [`Config::validate`]; a usable config must name a host.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resource root the documents are served under, e.g.
    /// `https://docs.example.com/cheat-sheets`. A trailing slash is tolerated.
    pub base_url: String,

    /// File extension of the hosted documents (no leading dot).
    pub extension: String,

    /// Candidate category identifiers to probe during discovery.
    /// Discovery preserves this order in the discovered list.
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            extension: "md".to_string(),
            categories: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to prevent memory exhaustion
        // from a maliciously large or corrupted config file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {} // Size is within limits, proceed
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["base_url", "extension", "categories"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            candidates = config.categories.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Validate the configuration for use by a store.
    ///
    /// Rejects an empty or unparseable `base_url` and any scheme other than
    /// http/https. An empty candidate list is valid (discovery finds nothing).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidBaseUrl(
                "base_url is not set".to_string(),
            ));
        }

        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidBaseUrl(format!(
                "unsupported scheme '{}' in {}",
                other, self.base_url
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
