//! Plugin state
//!
//! Holds the hash primitive and plugin-wide defaults shared by every model type.

use crate::auth::{BcryptHasher, PasswordHasher};
use crate::config::{ConfigError, ModelConfig, Settings};
use crate::models::ModelType;
use std::sync::Arc;
use tracing::info;

/// Entry point: define model types with secure passwords
#[derive(Clone)]
pub struct SecurePassword {
    hasher: Arc<dyn PasswordHasher>,
    settings: Settings,
}

impl SecurePassword {
    /// Plugin with an explicit hasher and default settings
    pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            hasher,
            settings: Settings::default(),
        }
    }

    /// Bcrypt plugin configured from `SECURE_PASSWORD_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Settings::load()?;
        Ok(Self::new(Arc::new(BcryptHasher::new())).with_settings(settings))
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Define a model type. Unset cost and mode fall back to plugin settings.
    pub fn model_type(&self, name: impl Into<String>, config: ModelConfig) -> Result<ModelType, ConfigError> {
        let name = name.into();
        let config = config.with_defaults(&self.settings);
        config.validate()?;

        info!(
            model = %name,
            enabled = config.is_enabled(),
            mode = %config.hashing_mode(),
            "Model type defined"
        );

        Ok(ModelType::new(name, config, self.hasher.clone()))
    }
}

impl Default for SecurePassword {
    fn default() -> Self {
        Self::new(Arc::new(BcryptHasher::new()))
    }
}

impl std::fmt::Debug for SecurePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurePassword")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
