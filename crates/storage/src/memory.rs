//! `MemoryStore` — the in-memory reference [`PersistenceAdapter`] backend
//! (spec §4.G "Reference backend"), the direct analogue of the teacher's
//! `credential-in-memory` feature: a backend-abstracted trait with one
//! concrete implementation guarded by a cargo feature, so the
//! field-translation logic at this boundary is exercised even without a
//! real database underneath.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::adapter::PersistenceAdapter;
use crate::error::StorageError;
use crate::record::{ExecutionRecord, SortOrder, WorkflowRecord};

/// An in-memory [`PersistenceAdapter`], safe for concurrent calls from
/// multiple executions (spec §5 "Shared resources").
#[derive(Default)]
pub struct MemoryStore {
    workflows: Mutex<HashMap<String, WorkflowRecord>>,
    executions: Mutex<HashMap<String, ExecutionRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field-wise merge `fields` onto `value`'s JSON object representation,
    /// forcing `version` to `current_version + 1` no matter what `fields`
    /// names (spec §4.G).
    fn apply_patch<T: serde::Serialize + serde::de::DeserializeOwned>(
        value: &T,
        fields: serde_json::Map<String, Value>,
        current_version: Option<u64>,
    ) -> Result<T, StorageError> {
        let mut map = match serde_json::to_value(value) {
            Ok(Value::Object(m)) => m,
            _ => {
                return Err(StorageError::MalformedRecord {
                    field: "<record>",
                    reason: "record did not serialize to an object".to_string(),
                })
            }
        };
        for (k, v) in fields {
            map.insert(k, v);
        }
        if let Some(version) = current_version {
            map.insert("version".into(), Value::from(version + 1));
        }
        serde_json::from_value(Value::Object(map)).map_err(|e| StorageError::MalformedRecord {
            field: "<record>",
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn list(
        &self,
        sort_by: &str,
        sort_order: SortOrder,
        bot_id: Option<&str>,
    ) -> Result<Vec<WorkflowRecord>, StorageError> {
        let store = self.workflows.lock();
        let mut records: Vec<WorkflowRecord> = store
            .values()
            .filter(|r| bot_id.is_none_or(|b| r.bot_id.as_deref() == Some(b)))
            .cloned()
            .collect();

        records.sort_by(|a, b| match sort_by {
            "name" => a.name.cmp(&b.name),
            "created_at" => a.created_at.cmp(&b.created_at),
            _ => a.updated_at.cmp(&b.updated_at),
        });
        if sort_order == SortOrder::Desc {
            records.reverse();
        }
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<WorkflowRecord>, StorageError> {
        Ok(self.workflows.lock().get(id).cloned())
    }

    async fn insert(&self, record: WorkflowRecord) -> Result<String, StorageError> {
        let id = record.uuid.clone();
        self.workflows.lock().insert(id.clone(), record);
        Ok(id)
    }

    async fn update(
        &self,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<WorkflowRecord, StorageError> {
        let mut store = self.workflows.lock();
        let existing = store
            .get(id)
            .ok_or_else(|| StorageError::WorkflowNotFound(id.to_string()))?;
        let updated = Self::apply_patch(existing, fields, Some(existing.version))?;
        store.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.delete_executions_for_workflow(id).await?;
        self.workflows.lock().remove(id);
        Ok(())
    }

    async fn list_executions(&self, workflow_id: &str) -> Result<Vec<ExecutionRecord>, StorageError> {
        Ok(self
            .executions
            .lock()
            .values()
            .filter(|r| r.workflow_uuid == workflow_id)
            .cloned()
            .collect())
    }

    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRecord>, StorageError> {
        Ok(self.executions.lock().get(id).cloned())
    }

    async fn insert_execution(&self, record: ExecutionRecord) -> Result<String, StorageError> {
        let id = record.uuid.clone();
        self.executions.lock().insert(id.clone(), record);
        Ok(id)
    }

    async fn update_execution(
        &self,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<ExecutionRecord, StorageError> {
        let mut store = self.executions.lock();
        let existing = store
            .get(id)
            .ok_or_else(|| StorageError::ExecutionNotFound(id.to_string()))?;
        let updated = Self::apply_patch(existing, fields, None)?;
        store.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_executions_for_workflow(&self, workflow_id: &str) -> Result<(), StorageError> {
        self.executions
            .lock()
            .retain(|_, record| record.workflow_uuid != workflow_id);
        Ok(())
    }
}
