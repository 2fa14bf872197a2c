//! Error handling module
//!
//! Provides unified error types for hashing, saving and authenticating models.

use crate::config::ConfigError;
use thiserror::Error;

/// Raised when a supplied password does not match the stored digest.
///
/// Carries no information about *why* the check failed: a wrong password,
/// an empty password, a missing digest and a malformed digest all look the
/// same to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PasswordMismatchError {
    message: String,
}

impl PasswordMismatchError {
    pub fn new() -> Self {
        Self {
            message: "Invalid password".to_string(),
        }
    }

    /// Create a mismatch error with a custom message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for PasswordMismatchError {
    fn default() -> Self {
        Self::new()
    }
}

/// Failures of the underlying hash primitive
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to generate salt: {0}")]
    Salt(String),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Hash primitive error: {0}")]
    Primitive(String),
}

/// Authentication error type
#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    PasswordMismatch(#[from] PasswordMismatchError),

    #[error("Model '{model}' does not support authentication")]
    NotConfigured { model: String },
}

impl AuthError {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, AuthError::PasswordMismatch(_))
    }
}

/// Model-level error type for set and save operations
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] HashError),

    #[error("Invalid password value: {0}")]
    InvalidPassword(String),

    #[error("Attribute '{0}' is managed by secure password and cannot be set directly")]
    ProtectedAttribute(String),

    #[error("Saving hook failed: {0}")]
    Hook(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type alias for authentication
pub type AuthResult<T> = Result<T, AuthError>;

/// Helper function to create a mismatch error with the default message
pub fn password_mismatch() -> AuthError {
    AuthError::PasswordMismatch(PasswordMismatchError::new())
}

/// Helper function to create a hook error
pub fn hook_error(msg: impl Into<String>) -> ModelError {
    ModelError::Hook(msg.into())
}

/// Helper function to create a store error
pub fn store_error(msg: impl Into<String>) -> ModelError {
    ModelError::Store(msg.into())
}
