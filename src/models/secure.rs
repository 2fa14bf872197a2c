//! Secure password models
//!
//! [`SecureModel`] wraps a base model and owns the virtual `password`
//! attribute. Depending on the model's [`HashingMode`] the plaintext is either
//! hashed as soon as it is set, or parked in a transient slot and hashed by a
//! saving hook right before the record is persisted. Either way the plaintext
//! never becomes part of the durable attributes.

use super::{Attributes, Model, Record, RecordStore, SavingHook};
use crate::auth::{self, classify, resolve_digest_field, resolve_hash_cost, PasswordAssignment, PasswordHasher};
use crate::config::{HashingMode, ModelConfig, PASSWORD_FIELD};
use crate::error::{AuthResult, ModelError, ModelResult};
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Plaintext waiting for the next save. `Some` means changed since last save.
type PendingPassword = Arc<Mutex<Option<Value>>>;

fn lock(pending: &PendingPassword) -> MutexGuard<'_, Option<Value>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Saving hook that turns the pending plaintext into a digest
struct PasswordHashingHook {
    model: String,
    field: String,
    cost: u32,
    hasher: Arc<dyn PasswordHasher>,
    pending: PendingPassword,
}

#[async_trait]
impl SavingHook for PasswordHashingHook {
    async fn on_saving(&self, attributes: &mut Attributes) -> ModelResult<()> {
        attributes.remove(PASSWORD_FIELD);

        let value = lock(&self.pending).clone();
        let Some(value) = value else {
            return Ok(());
        };

        let digest = match classify(Some(&value))? {
            PasswordAssignment::Clear => Some(Value::Null),
            PasswordAssignment::Unchanged => None,
            PasswordAssignment::Hash(plaintext) => {
                Some(Value::String(self.hasher.hash(&plaintext, self.cost).await?))
            }
        };

        if let Some(digest) = digest {
            attributes.insert(self.field.clone(), digest);
            debug!(model = %self.model, field = %self.field, cost = self.cost, "Password digest updated on save");
        }
        *lock(&self.pending) = None;

        Ok(())
    }
}

/// A model with a secure `password` attribute
pub struct SecureModel<M: Model = Record> {
    inner: M,
    config: Arc<ModelConfig>,
    hasher: Arc<dyn PasswordHasher>,
    pending: PendingPassword,
}

impl<M: Model> SecureModel<M> {
    /// Wrap `inner`. With secure password enabled any plaintext `password`
    /// attribute already on `inner` is dropped, and in async mode the hashing
    /// hook is registered on `inner`.
    pub fn new(mut inner: M, config: Arc<ModelConfig>, hasher: Arc<dyn PasswordHasher>) -> Self {
        let pending: PendingPassword = Arc::new(Mutex::new(None));

        if config.is_enabled() {
            inner.unset(PASSWORD_FIELD);
        }

        if config.is_enabled() && config.hashing_mode() == HashingMode::AsyncOnPersist {
            let model = inner.name().to_string();
            inner.on_saving(Arc::new(PasswordHashingHook {
                model,
                field: resolve_digest_field(&config).to_string(),
                cost: resolve_hash_cost(&config),
                hasher: hasher.clone(),
                pending: pending.clone(),
            }));
        }

        Self {
            inner,
            config,
            hasher,
            pending,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn into_inner(self) -> M {
        self.inner
    }

    /// Column holding this model's digest
    pub fn digest_field(&self) -> &str {
        resolve_digest_field(&self.config)
    }

    /// Set several attributes, routing `password` through the controller
    pub fn set_all(&mut self, attributes: Attributes) -> ModelResult<()> {
        for (key, value) in attributes {
            self.set(&key, value)?;
        }
        Ok(())
    }

    fn assign_password(&mut self, value: Value) -> ModelResult<()> {
        let assignment = classify(Some(&value))?;

        match self.config.hashing_mode() {
            HashingMode::AsyncOnPersist => {
                *lock(&self.pending) = Some(value);
            }
            HashingMode::SyncOnSet => {
                let field = self.digest_field().to_string();
                match assignment {
                    PasswordAssignment::Clear => self.inner.set(&field, Value::Null)?,
                    PasswordAssignment::Unchanged => {}
                    PasswordAssignment::Hash(plaintext) => {
                        let cost = resolve_hash_cost(&self.config);
                        let digest = self.hasher.hash_blocking(&plaintext, cost)?;
                        self.inner.set(&field, Value::String(digest))?;
                        debug!(model = %self.inner.name(), field = %field, cost, "Password digest updated on set");
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<M: Model> Model for SecureModel<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, key: &str) -> Option<&Value> {
        if self.config.is_enabled() && key == PASSWORD_FIELD {
            return None;
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> ModelResult<()> {
        if !self.config.is_enabled() {
            return self.inner.set(key, value);
        }
        if key == PASSWORD_FIELD {
            return self.assign_password(value);
        }
        if key == self.digest_field() {
            return Err(ModelError::ProtectedAttribute(key.to_string()));
        }
        self.inner.set(key, value)
    }

    fn unset(&mut self, key: &str) -> Option<Value> {
        if self.config.is_enabled() && key == PASSWORD_FIELD {
            *lock(&self.pending) = None;
            return None;
        }
        self.inner.unset(key)
    }

    fn has_changed(&self, key: &str) -> bool {
        if self.config.is_enabled() && key == PASSWORD_FIELD {
            return lock(&self.pending).is_some();
        }
        self.inner.has_changed(key)
    }

    fn attributes(&self) -> &Attributes {
        self.inner.attributes()
    }

    fn on_saving(&mut self, hook: Arc<dyn SavingHook>) {
        self.inner.on_saving(hook);
    }

    async fn save(&mut self) -> ModelResult<()> {
        self.inner.save().await
    }

    /// Resolve with `self` if `password` matches the stored digest.
    ///
    /// Models without secure password fall back to the wrapped model's
    /// `authenticate`.
    async fn authenticate(&self, password: Option<&str>) -> AuthResult<&Self> {
        if !self.config.is_enabled() {
            return self.inner.authenticate(password).await.map(|_| self);
        }

        let digest = self.inner.get(self.digest_field());
        auth::verify_digest(self.hasher.as_ref(), digest, password).await?;

        debug!(model = %self.inner.name(), "Password authenticated");
        Ok(self)
    }
}

impl<M: Model> Serialize for SecureModel<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.attributes().serialize(serializer)
    }
}

impl<M: Model + std::fmt::Debug> std::fmt::Debug for SecureModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureModel")
            .field("inner", &self.inner)
            .field("config", &self.config)
            .field("password_pending", &lock(&self.pending).is_some())
            .finish_non_exhaustive()
    }
}

/// A model type: a name, its fixed configuration and the hasher it uses
#[derive(Clone)]
pub struct ModelType {
    name: String,
    config: Arc<ModelConfig>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ModelType {
    pub(crate) fn new(name: impl Into<String>, config: ModelConfig, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            hasher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Decorate an existing model instance
    pub fn wrap<M: Model>(&self, inner: M) -> SecureModel<M> {
        SecureModel::new(inner, self.config.clone(), self.hasher.clone())
    }

    /// New unsaved instance with initial attributes
    pub fn create(&self, store: Arc<dyn RecordStore>, attributes: Attributes) -> ModelResult<SecureModel> {
        let mut model = self.wrap(Record::new(self.name.clone(), store));
        model.set_all(attributes)?;
        Ok(model)
    }

    /// Load a persisted instance
    pub async fn find(&self, store: Arc<dyn RecordStore>, id: Uuid) -> ModelResult<Option<SecureModel>> {
        let record = Record::fetch(store, self.name.clone(), id).await?;
        Ok(record.map(|record| self.wrap(record)))
    }
}

impl std::fmt::Debug for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{embedded_cost, BcryptHasher};
    use crate::config::DEFAULT_PASSWORD_DIGEST_FIELD;
    use crate::error::{hook_error, AuthError, HashError};
    use crate::models::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use rstest::rstest;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    const COST: u32 = 4;

    fn model_type(config: ModelConfig) -> ModelType {
        ModelType::new("users", config, Arc::new(BcryptHasher::new()))
    }

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    }

    fn digest_of<M: Model>(model: &SecureModel<M>) -> Option<Value> {
        model.get(model.digest_field()).cloned()
    }

    /// Hasher whose hashing always fails
    struct BrokenHasher;

    #[async_trait]
    impl PasswordHasher for BrokenHasher {
        fn hash_blocking(&self, _plaintext: &str, _cost: u32) -> Result<String, HashError> {
            Err(HashError::Salt("entropy exhausted".to_string()))
        }

        async fn hash(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
            self.hash_blocking(plaintext, cost)
        }

        async fn compare(&self, _plaintext: &str, _digest: &str) -> Result<bool, HashError> {
            Err(HashError::Primitive("unavailable".to_string()))
        }
    }

    /// Bcrypt hasher whose hashing can be switched to fail
    #[derive(Default)]
    struct FlakyHasher {
        fail: AtomicBool,
    }

    #[async_trait]
    impl PasswordHasher for FlakyHasher {
        fn hash_blocking(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(HashError::Salt("entropy exhausted".to_string()));
            }
            BcryptHasher::new().hash_blocking(plaintext, cost)
        }

        async fn hash(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
            self.hash_blocking(plaintext, cost)
        }

        async fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
            BcryptHasher::new().compare(plaintext, digest).await
        }
    }

    /// Hasher counting every call into the primitive
    #[derive(Default)]
    struct CountingHasher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PasswordHasher for CountingHasher {
        fn hash_blocking(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BcryptHasher::new().hash_blocking(plaintext, cost)
        }

        async fn hash(&self, plaintext: &str, cost: u32) -> Result<String, HashError> {
            self.hash_blocking(plaintext, cost)
        }

        async fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BcryptHasher::new().compare(plaintext, digest).await
        }
    }

    // Async mode

    #[tokio::test]
    async fn test_async_does_not_hash_before_save() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();

        assert_eq!(model.get("password"), None);
        assert_eq!(model.attributes().get("password"), None);
        assert_eq!(digest_of(&model), None);
        assert!(model.has_changed("password"));
    }

    #[tokio::test]
    async fn test_async_hashes_on_save() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();

        assert_ok!(model.save().await);

        let digest = digest_of(&model).unwrap();
        assert!(digest.as_str().is_some_and(|d| !d.is_empty()));
        assert_eq!(model.get("password"), None);
        assert!(!model.has_changed("password"));
    }

    #[tokio::test]
    async fn test_async_null_clears_digest() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();
        assert!(digest_of(&model).unwrap().is_string());

        model.set("password", Value::Null).unwrap();
        model.save().await.unwrap();
        assert_eq!(digest_of(&model), Some(Value::Null));
    }

    #[tokio::test]
    async fn test_async_empty_and_unset_keep_digest() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();
        let original = digest_of(&model);

        model.unset("password");
        model.save().await.unwrap();
        assert_eq!(digest_of(&model), original);

        model.set("password", json!("")).unwrap();
        model.save().await.unwrap();
        assert_eq!(digest_of(&model), original);
    }

    #[tokio::test]
    async fn test_async_whitespace_changes_digest() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();
        let original = digest_of(&model);

        model.set("password", json!("  ")).unwrap();
        model.save().await.unwrap();

        let updated = digest_of(&model);
        assert!(updated.as_ref().is_some_and(Value::is_string));
        assert_ne!(updated, original);
        assert_ok!(model.authenticate(Some("  ")).await);
    }

    #[tokio::test]
    async fn test_async_hashing_failure_keeps_existing_digest() {
        let store = Arc::new(MemoryStore::new());
        let hasher = Arc::new(FlakyHasher::default());
        let users = ModelType::new("users", ModelConfig::enabled().cost(COST), hasher.clone());
        let mut model = users
            .create(store.clone(), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();
        let original = digest_of(&model);
        assert!(original.as_ref().is_some_and(Value::is_string));

        hasher.fail.store(true, Ordering::SeqCst);
        model.set("password", json!("changed")).unwrap();

        let err = model.save().await.unwrap_err();
        assert!(matches!(err, ModelError::Hashing(HashError::Salt(_))));
        assert_eq!(digest_of(&model), original);
        assert!(model.has_changed("password"));

        let row = store.fetch("users", model.inner().id()).await.unwrap().unwrap();
        assert_eq!(row.attributes.get(DEFAULT_PASSWORD_DIGEST_FIELD).cloned(), original);
        assert_ok!(model.authenticate(Some("testing")).await);

        // the pending change is retried once hashing works again
        hasher.fail.store(false, Ordering::SeqCst);
        model.save().await.unwrap();
        assert_ne!(digest_of(&model), original);
        assert_ok!(model.authenticate(Some("changed")).await);
    }

    #[tokio::test]
    async fn test_async_later_hook_failure_keeps_persisted_digest() {
        let store = Arc::new(MemoryStore::new());
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(store.clone(), attrs(json!({"password": "first"})))
            .unwrap();
        model.save().await.unwrap();
        let id = model.inner().id();
        let persisted = store.fetch("users", id).await.unwrap().unwrap();
        let persisted_digest = persisted.attributes.get(DEFAULT_PASSWORD_DIGEST_FIELD).cloned();

        model.set("password", json!("second")).unwrap();
        model.on_saving(Arc::new(|_: &mut Attributes| -> ModelResult<()> {
            Err(hook_error("validation failed"))
        }));

        assert_err!(model.save().await);
        assert_eq!(model.get("password"), None);
        let in_memory = digest_of(&model);
        assert!(in_memory.as_ref().is_some_and(Value::is_string));

        // retry does not re-hash
        assert_err!(model.save().await);
        assert_eq!(digest_of(&model), in_memory);

        let row = store.fetch("users", id).await.unwrap().unwrap();
        assert_eq!(row.attributes.get(DEFAULT_PASSWORD_DIGEST_FIELD).cloned(), persisted_digest);
        assert!(!serde_json::to_string(&row.attributes).unwrap().contains("second"));
    }

    // Sync mode

    #[test]
    fn test_sync_hashes_on_set() {
        let users = model_type(ModelConfig::enabled().cost(COST).mode(HashingMode::SyncOnSet));
        let mut model = users.create(Arc::new(MemoryStore::new()), Attributes::new()).unwrap();

        model.set("password", json!("testing")).unwrap();

        assert_eq!(model.get("password"), None);
        assert!(digest_of(&model).unwrap().is_string());
        assert!(!model.has_changed("password"));
    }

    #[test]
    fn test_sync_policy_table() {
        let users = model_type(ModelConfig::enabled().cost(COST).mode(HashingMode::SyncOnSet));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        let original = digest_of(&model);

        model.set("password", json!("")).unwrap();
        assert_eq!(digest_of(&model), original);

        model.unset("password");
        assert_eq!(digest_of(&model), original);

        model.set("password", json!("   ")).unwrap();
        assert_ne!(digest_of(&model), original);

        model.set("password", Value::Null).unwrap();
        assert_eq!(digest_of(&model), Some(Value::Null));
    }

    #[test]
    fn test_sync_hashing_failure_leaves_digest() {
        let hasher = Arc::new(FlakyHasher::default());
        let config = ModelConfig::enabled().cost(COST).mode(HashingMode::SyncOnSet);
        let users = ModelType::new("users", config, hasher.clone());
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        let original = digest_of(&model);
        assert!(original.as_ref().is_some_and(Value::is_string));

        hasher.fail.store(true, Ordering::SeqCst);
        let err = model.set("password", json!("changed")).unwrap_err();
        assert!(matches!(err, ModelError::Hashing(_)));
        assert_eq!(digest_of(&model), original);

        // empty is policy, not an error
        assert_ok!(model.set("password", json!("")));
        assert_eq!(digest_of(&model), original);
    }

    #[test]
    fn test_sync_hashing_failure_without_digest() {
        let config = Arc::new(ModelConfig::enabled().mode(HashingMode::SyncOnSet));
        let record = Record::new("users", Arc::new(MemoryStore::new()));
        let mut model = SecureModel::new(record, config, Arc::new(BrokenHasher));

        assert!(model.set("password", json!("testing")).is_err());
        assert_eq!(digest_of(&model), None);
        assert_ok!(model.set("password", Value::Null));
    }

    #[rstest]
    #[case(HashingMode::SyncOnSet)]
    #[case(HashingMode::AsyncOnPersist)]
    #[tokio::test]
    async fn test_wrapping_drops_stored_plaintext(#[case] mode: HashingMode) {
        let store = Arc::new(MemoryStore::new());
        let mut legacy = Record::new("users", store.clone());
        legacy.set("password", json!("hunter2")).unwrap();
        legacy.save().await.unwrap();
        let id = legacy.id();

        let users = model_type(ModelConfig::enabled().cost(COST).mode(mode));
        let mut model = users.find(store.clone(), id).await.unwrap().unwrap();

        assert_eq!(model.attributes().get("password"), None);
        assert!(!serde_json::to_string(&model).unwrap().contains("hunter2"));

        model.save().await.unwrap();
        let row = store.fetch("users", id).await.unwrap().unwrap();
        assert_eq!(row.attributes.get("password"), None);
        assert!(!serde_json::to_string(&row.attributes).unwrap().contains("hunter2"));
    }

    // Configuration

    #[tokio::test]
    async fn test_custom_column() {
        let users = model_type(ModelConfig::with_column("custom_column").cost(COST));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();

        assert_eq!(model.get("password"), None);
        assert_eq!(model.get(DEFAULT_PASSWORD_DIGEST_FIELD), None);
        assert!(model.get("custom_column").unwrap().is_string());
        assert_ok!(model.authenticate(Some("testing")).await);
    }

    #[tokio::test]
    async fn test_custom_cost() {
        let users = model_type(ModelConfig::enabled().cost(5));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();

        let digest = digest_of(&model).unwrap();
        assert_eq!(embedded_cost(digest.as_str().unwrap()), Some(5));
    }

    #[test]
    fn test_digest_column_is_protected() {
        let users = model_type(ModelConfig::enabled());
        let mut model = users.create(Arc::new(MemoryStore::new()), Attributes::new()).unwrap();

        let err = model.set(DEFAULT_PASSWORD_DIGEST_FIELD, json!("$2b$04$forged")).unwrap_err();
        assert!(matches!(err, ModelError::ProtectedAttribute(_)));
    }

    #[test]
    fn test_non_string_password_rejected() {
        let users = model_type(ModelConfig::enabled());
        let mut model = users.create(Arc::new(MemoryStore::new()), Attributes::new()).unwrap();

        let err = model.set("password", json!(12345)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPassword(_)));
        assert!(!model.has_changed("password"));
    }

    // Authentication

    #[tokio::test]
    async fn test_authenticate() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();

        let authed = model.authenticate(Some("testing")).await.unwrap();
        assert_eq!(authed.inner().id(), model.inner().id());

        assert!(model.authenticate(Some("nope")).await.unwrap_err().is_mismatch());
        assert!(model.authenticate(None).await.unwrap_err().is_mismatch());
        assert!(model.authenticate(Some("")).await.unwrap_err().is_mismatch());
    }

    #[tokio::test]
    async fn test_authenticate_without_digest_skips_compare() {
        let hasher = Arc::new(CountingHasher::default());
        let users = ModelType::new("users", ModelConfig::enabled(), hasher.clone());
        let model = users.create(Arc::new(MemoryStore::new()), Attributes::new()).unwrap();

        assert!(model.authenticate(Some("testing")).await.unwrap_err().is_mismatch());
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authenticate_disabled_falls_back() {
        let hasher = Arc::new(CountingHasher::default());
        let users = ModelType::new("users", ModelConfig::disabled(), hasher.clone());
        let mut model = users
            .create(Arc::new(MemoryStore::new()), attrs(json!({"password": "testing"})))
            .unwrap();
        model.save().await.unwrap();

        let err = model.authenticate(Some("testing")).await.unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured { .. }));
        assert_eq!(hasher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authenticate_broken_primitive_is_mismatch() {
        let users = ModelType::new("users", ModelConfig::enabled(), Arc::new(BrokenHasher));
        let record = Record::from_persisted(
            "users",
            Arc::new(MemoryStore::new()),
            crate::models::StoredRecord {
                id: Uuid::new_v4(),
                attributes: attrs(json!({"password_digest": "$2b$04$garbage"})),
                saved_at: chrono::Utc::now(),
            },
        );
        let model = users.wrap(record);

        assert!(model.authenticate(Some("testing")).await.unwrap_err().is_mismatch());
    }

    #[tokio::test]
    async fn test_serialization_never_contains_plaintext() {
        let users = model_type(ModelConfig::enabled().cost(COST));
        let mut model = users
            .create(
                Arc::new(MemoryStore::new()),
                attrs(json!({"email": "a@example.com", "password": "hunter2"})),
            )
            .unwrap();

        let before = serde_json::to_string(&model).unwrap();
        assert!(!before.contains("hunter2"));

        model.save().await.unwrap();
        let after = serde_json::to_value(&model).unwrap();
        assert!(!after.to_string().contains("hunter2"));
        assert!(after.get("password").is_none());
        assert!(after.get("password_digest").is_some());
    }
}
