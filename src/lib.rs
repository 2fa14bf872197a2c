//! Secure passwords for models
//!
//! Assigning the virtual `password` attribute of a secure model stores a salted
//! bcrypt digest instead of the plaintext; `authenticate` checks a candidate
//! password against that digest.
//!
//! ```no_run
//! use secure_password::{Model, ModelConfig, MemoryStore, SecurePassword};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let plugin = SecurePassword::default();
//! let users = plugin.model_type("users", ModelConfig::enabled())?;
//!
//! let mut user = users.create(Arc::new(MemoryStore::new()), Default::default())?;
//! user.set("password", json!("testing"))?;
//! user.save().await?;
//!
//! user.authenticate(Some("testing")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Hashing happens on save by default. Models configured with
//! [`HashingMode::SyncOnSet`] hash inline while the attribute is set.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod plugin;
pub mod telemetry;

pub use auth::{BcryptHasher, PasswordHasher};
pub use config::{DigestFieldConfig, HashingMode, ModelConfig, Settings};
pub use error::{AuthError, HashError, ModelError, PasswordMismatchError};
pub use models::{Attributes, MemoryStore, Model, ModelType, Record, RecordStore, SavingHook, SecureModel};
pub use plugin::SecurePassword;
