//! The narrow [`PersistenceAdapter`] contract the Manager depends on
//! (spec §4.G, §6).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::record::{ExecutionRecord, SortOrder, WorkflowRecord};

/// The CRUD surface onto an external relational store, at the
/// field-translated record shape (spec §4.G).
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn list(
        &self,
        sort_by: &str,
        sort_order: SortOrder,
        bot_id: Option<&str>,
    ) -> Result<Vec<WorkflowRecord>, StorageError>;

    async fn get(&self, id: &str) -> Result<Option<WorkflowRecord>, StorageError>;

    /// Insert a new record, returning its assigned id (the record's own
    /// `uuid` field is honored, not regenerated).
    async fn insert(&self, record: WorkflowRecord) -> Result<String, StorageError>;

    /// Field-wise merge `fields` into the stored record, bumping `version`
    /// by exactly one regardless of whether `fields` names a `version` key
    /// (spec §4.G: "the adapter increments `version` atomically").
    async fn update(
        &self,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<WorkflowRecord, StorageError>;

    /// Delete a workflow record. Deletes its execution records first
    /// (spec §4.G, §8 property 7 "Cascade delete").
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    async fn list_executions(&self, workflow_id: &str) -> Result<Vec<ExecutionRecord>, StorageError>;

    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRecord>, StorageError>;

    async fn insert_execution(&self, record: ExecutionRecord) -> Result<String, StorageError>;

    async fn update_execution(
        &self,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<ExecutionRecord, StorageError>;

    async fn delete_executions_for_workflow(&self, workflow_id: &str) -> Result<(), StorageError>;
}
