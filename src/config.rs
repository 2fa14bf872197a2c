//! Secure password configuration module
//!
//! Per-model configuration (which column holds the digest, what bcrypt cost to
//! use, when to hash) plus plugin-wide defaults loaded from the environment.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Name of the virtual plaintext attribute
pub const PASSWORD_FIELD: &str = "password";

/// Column the digest is written to unless a model names its own
pub const DEFAULT_PASSWORD_DIGEST_FIELD: &str = "password_digest";

/// Default bcrypt cost factor
pub const DEFAULT_HASH_COST: u32 = 12;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_$]*$").expect("identifier regex is valid"));

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load environment variables: {0}")]
    EnvLoad(#[from] dotenvy::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Where (and whether) a model stores its password digest.
///
/// Deserializes from the same shapes the model flag accepts: `false`,
/// `true`, or a column name. An empty column name counts as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDigestField", into = "RawDigestField")]
pub enum DigestFieldConfig {
    #[default]
    Disabled,
    Default,
    Named(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDigestField {
    Flag(bool),
    Column(String),
}

impl From<RawDigestField> for DigestFieldConfig {
    fn from(raw: RawDigestField) -> Self {
        match raw {
            RawDigestField::Flag(false) => DigestFieldConfig::Disabled,
            RawDigestField::Flag(true) => DigestFieldConfig::Default,
            RawDigestField::Column(c) if c.is_empty() => DigestFieldConfig::Disabled,
            RawDigestField::Column(c) => DigestFieldConfig::Named(c),
        }
    }
}

impl From<DigestFieldConfig> for RawDigestField {
    fn from(config: DigestFieldConfig) -> Self {
        match config {
            DigestFieldConfig::Disabled => RawDigestField::Flag(false),
            DigestFieldConfig::Default => RawDigestField::Flag(true),
            DigestFieldConfig::Named(c) => RawDigestField::Column(c),
        }
    }
}

impl DigestFieldConfig {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DigestFieldConfig::Disabled)
    }
}

/// When the plaintext is turned into a digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashingMode {
    /// Hash inline while the attribute is being set
    SyncOnSet,
    /// Hold the plaintext until the next save and hash in a saving hook
    #[default]
    AsyncOnPersist,
}

impl std::fmt::Display for HashingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashingMode::SyncOnSet => write!(f, "sync_on_set"),
            HashingMode::AsyncOnPersist => write!(f, "async_on_persist"),
        }
    }
}

/// Per-model-type configuration. Fixed once the model type is defined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, alias = "hasSecurePassword")]
    pub secure_password: DigestFieldConfig,
    #[serde(default, alias = "bcryptRounds", deserialize_with = "lenient_cost")]
    pub hash_cost: Option<u32>,
    #[serde(default)]
    pub hashing_mode: Option<HashingMode>,
}

impl ModelConfig {
    /// Secure password disabled
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Secure password stored in the default digest column
    pub fn enabled() -> Self {
        Self {
            secure_password: DigestFieldConfig::Default,
            ..Self::default()
        }
    }

    /// Secure password stored in a custom column
    pub fn with_column(column: impl Into<String>) -> Self {
        Self {
            secure_password: DigestFieldConfig::Named(column.into()),
            ..Self::default()
        }
    }

    pub fn cost(mut self, cost: u32) -> Self {
        self.hash_cost = Some(cost);
        self
    }

    pub fn mode(mut self, mode: HashingMode) -> Self {
        self.hashing_mode = Some(mode);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.secure_password.is_enabled()
    }

    pub fn hashing_mode(&self) -> HashingMode {
        self.hashing_mode.unwrap_or_default()
    }

    /// Fill unset fields from plugin-wide defaults
    pub fn with_defaults(mut self, settings: &Settings) -> Self {
        if self.hash_cost.is_none() {
            self.hash_cost = settings.hash_cost;
        }
        if self.hashing_mode.is_none() {
            self.hashing_mode = settings.hashing_mode;
        }
        self
    }

    /// Check that a custom digest column is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let DigestFieldConfig::Named(column) = &self.secure_password {
            if column == PASSWORD_FIELD {
                return Err(ConfigError::InvalidValue(format!(
                    "digest column cannot be the virtual '{}' attribute",
                    PASSWORD_FIELD
                )));
            }
            validate_identifier(column).map_err(|e| {
                ConfigError::InvalidValue(
                    e.message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid digest column '{}'", column)),
                )
            })?;
        }
        Ok(())
    }
}

/// Validate a column identifier
fn validate_identifier(name: &str) -> Result<(), validator::ValidationError> {
    if !IDENTIFIER_RE.is_match(name) {
        let mut err = validator::ValidationError::new("invalid_identifier");
        err.message = Some(
            format!(
                "Invalid digest column '{}'. Must start with a letter or underscore and contain only letters, digits, underscores.",
                name
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// A missing `.env` file is fine; an unreadable or malformed one is not
fn load_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvLoad(e)),
    }
}

/// Accept any JSON value for a cost; only positive integers that fit a `u32`
/// are kept, everything else falls back to the default cost.
fn lenient_cost<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .filter(|cost| *cost > 0)
        .and_then(|cost| u32::try_from(cost).ok()))
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Plugin-wide settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hash_cost: Option<u32>,
    #[serde(default)]
    pub hashing_mode: Option<HashingMode>,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from `SECURE_PASSWORD_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        load_dotenv(dotenvy::dotenv())?;

        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("SECURE_PASSWORD").try_parsing(true))
            .build()?;

        Self::from_config(source)
    }

    /// Build settings from an already assembled configuration source
    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let settings: Settings = source
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if settings.hash_cost == Some(0) {
            return Err(ConfigError::InvalidValue(
                "hash_cost must be a positive integer".to_string(),
            ));
        }

        Ok(settings)
    }
}
