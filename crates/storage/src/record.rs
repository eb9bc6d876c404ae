//! The logical record shapes at the persistence boundary (spec §6
//! "Persistence record").

use chrono::{DateTime, Utc};
use nebula_workflow::{TriggerType, WorkflowStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A workflow row, field-named the way the external CRUD store expects it
/// (spec §6, §4.G): `metadata ↔ workflow_metadata`, `id ↔ uuid`, and a
/// single `trigger_type` rather than the entity's `trigger_types` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub trigger_config: serde_json::Map<String, Value>,
    /// Nodes keyed by their id (as a string), each value the node's full
    /// serialized form.
    #[serde(default)]
    pub nodes: serde_json::Map<String, Value>,
    /// Edges keyed by their id (as a string).
    #[serde(default)]
    pub edges: serde_json::Map<String, Value>,
    pub status: WorkflowStatus,
    pub version: u64,
    /// Everything the narrow record shape doesn't give its own column:
    /// the entity's `extra` bucket, `tags`, `category`, and `variables`,
    /// each under its own key. A real external store is free to drop
    /// sub-keys it doesn't understand; this in-memory backend round-trips
    /// all of them.
    #[serde(default)]
    pub workflow_metadata: serde_json::Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An execution row (spec §6 "Persistence record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub uuid: String,
    pub workflow_uuid: String,
    #[serde(default)]
    pub trigger_data: serde_json::Map<String, Value>,
    pub status: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub execution_path: Vec<String>,
    #[serde(default)]
    pub node_outputs: serde_json::Map<String, Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Sort direction for [`crate::PersistenceAdapter::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}
