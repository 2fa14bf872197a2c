//! Base record model and persistence
//!
//! In-memory store with the same interface a database-backed store would have.

use super::{Attributes, Model, SavingHook};
use crate::error::{store_error, ModelResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// A persisted row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: Uuid,
    pub attributes: Attributes,
    pub saved_at: DateTime<Utc>,
}

/// Persistence backend for records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace a row
    async fn persist(&self, table: &str, id: Uuid, attributes: &Attributes) -> ModelResult<StoredRecord>;

    async fn fetch(&self, table: &str, id: Uuid) -> ModelResult<Option<StoredRecord>>;
}

/// Thread-safe in-memory record store
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<HashMap<(String, Uuid), StoredRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all tables
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn persist(&self, table: &str, id: Uuid, attributes: &Attributes) -> ModelResult<StoredRecord> {
        if table.is_empty() {
            return Err(store_error("table name is required"));
        }

        let row = StoredRecord {
            id,
            attributes: attributes.clone(),
            saved_at: Utc::now(),
        };

        let mut rows = self.rows.write().await;
        rows.insert((table.to_string(), id), row.clone());

        Ok(row)
    }

    async fn fetch(&self, table: &str, id: Uuid) -> ModelResult<Option<StoredRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(table.to_string(), id)).cloned())
    }
}

/// Plain attribute-bag model
pub struct Record {
    id: Uuid,
    table: String,
    attributes: Attributes,
    /// Attributes as of the last successful save
    previous: Attributes,
    saved_at: Option<DateTime<Utc>>,
    hooks: Vec<Arc<dyn SavingHook>>,
    store: Arc<dyn RecordStore>,
}

impl Record {
    pub fn new(table: impl Into<String>, store: Arc<dyn RecordStore>) -> Self {
        Self::with_attributes(table, store, Attributes::new())
    }

    /// New, unsaved record with initial attributes
    pub fn with_attributes(
        table: impl Into<String>,
        store: Arc<dyn RecordStore>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            table: table.into(),
            attributes,
            previous: Attributes::new(),
            saved_at: None,
            hooks: Vec::new(),
            store,
        }
    }

    /// Record rebuilt from a stored row; nothing is dirty
    pub fn from_persisted(table: impl Into<String>, store: Arc<dyn RecordStore>, row: StoredRecord) -> Self {
        Self {
            id: row.id,
            table: table.into(),
            previous: row.attributes.clone(),
            attributes: row.attributes,
            saved_at: Some(row.saved_at),
            hooks: Vec::new(),
            store,
        }
    }

    /// Load a record by id
    pub async fn fetch(
        store: Arc<dyn RecordStore>,
        table: impl Into<String>,
        id: Uuid,
    ) -> ModelResult<Option<Self>> {
        let table = table.into();
        let row = store.fetch(&table, id).await?;
        Ok(row.map(|row| Self::from_persisted(table, store, row)))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    pub fn is_new(&self) -> bool {
        self.saved_at.is_none()
    }
}

#[async_trait]
impl Model for Record {
    fn name(&self) -> &str {
        &self.table
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> ModelResult<()> {
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    fn unset(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    fn has_changed(&self, key: &str) -> bool {
        self.attributes.get(key) != self.previous.get(key)
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn on_saving(&mut self, hook: Arc<dyn SavingHook>) {
        self.hooks.push(hook);
    }

    async fn save(&mut self) -> ModelResult<()> {
        let hooks = self.hooks.clone();
        for hook in &hooks {
            hook.on_saving(&mut self.attributes).await?;
        }

        let row = self.store.persist(&self.table, self.id, &self.attributes).await?;
        self.previous = row.attributes;
        self.saved_at = Some(row.saved_at);

        debug!(model = %self.table, id = %self.id, "Record saved");
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("table", &self.table)
            .field("attributes", &self.attributes)
            .field("saved_at", &self.saved_at)
            .finish_non_exhaustive()
    }
}
