//! Model layer
//!
//! A small attribute-bag model with dirty tracking and saving hooks, plus the
//! [`SecureModel`] decorator that layers password hashing and authentication
//! on top of any [`Model`].

pub mod record;
pub mod secure;

pub use crate::error::PasswordMismatchError;
pub use record::{MemoryStore, Record, RecordStore, StoredRecord};
pub use secure::{ModelType, SecureModel};

use crate::error::{AuthError, AuthResult, ModelResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Durable attributes of a model instance
pub type Attributes = Map<String, Value>;

/// Capability interface shared by base models and their decorators
#[async_trait]
pub trait Model: Send + Sync {
    /// Model type name (usually the table)
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<&Value>;

    fn set(&mut self, key: &str, value: Value) -> ModelResult<()>;

    fn unset(&mut self, key: &str) -> Option<Value>;

    /// Whether `key` differs from its value at the last save
    fn has_changed(&self, key: &str) -> bool;

    fn attributes(&self) -> &Attributes;

    /// Register a hook awaited before every save, in registration order
    fn on_saving(&mut self, hook: Arc<dyn SavingHook>);

    async fn save(&mut self) -> ModelResult<()>;

    /// Default authentication: models without credentials cannot authenticate
    async fn authenticate(&self, _password: Option<&str>) -> AuthResult<&Self> {
        Err(AuthError::NotConfigured {
            model: self.name().to_string(),
        })
    }
}

/// Callback run before a model is persisted. Returning an error aborts the save.
#[async_trait]
pub trait SavingHook: Send + Sync {
    async fn on_saving(&self, attributes: &mut Attributes) -> ModelResult<()>;
}

#[async_trait]
impl<F> SavingHook for F
where
    F: Fn(&mut Attributes) -> ModelResult<()> + Send + Sync,
{
    async fn on_saving(&self, attributes: &mut Attributes) -> ModelResult<()> {
        self(attributes)
    }
}
