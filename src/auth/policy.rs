//! Field policy resolution
//!
//! Pure lookups shared by the hashing controller and the authenticator.

use crate::config::{DigestFieldConfig, ModelConfig, DEFAULT_HASH_COST, DEFAULT_PASSWORD_DIGEST_FIELD};
use crate::error::ModelError;
use serde_json::Value;

/// What an assigned plaintext value asks the controller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordAssignment {
    /// `null`: clear the digest
    Clear,
    /// Absent or `""`: leave the digest alone
    Unchanged,
    /// Anything else, whitespace-only included
    Hash(String),
}

/// Column holding the digest for a model
pub fn resolve_digest_field(config: &ModelConfig) -> &str {
    match &config.secure_password {
        DigestFieldConfig::Named(column) if !column.is_empty() => column.as_str(),
        _ => DEFAULT_PASSWORD_DIGEST_FIELD,
    }
}

/// Bcrypt cost for a model
pub fn resolve_hash_cost(config: &ModelConfig) -> u32 {
    match config.hash_cost {
        Some(cost) if cost > 0 => cost,
        _ => DEFAULT_HASH_COST,
    }
}

/// `None` and `""` are empty. Whitespace is not.
pub fn is_empty(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

/// Classify a newly assigned plaintext value
pub fn classify(value: Option<&Value>) -> Result<PasswordAssignment, ModelError> {
    match value {
        None => Ok(PasswordAssignment::Unchanged),
        Some(Value::Null) => Ok(PasswordAssignment::Clear),
        Some(Value::String(s)) if s.is_empty() => Ok(PasswordAssignment::Unchanged),
        Some(Value::String(s)) => Ok(PasswordAssignment::Hash(s.clone())),
        Some(other) => Err(ModelError::InvalidPassword(format!(
            "expected a string or null, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
