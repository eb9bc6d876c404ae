//! Enumerations shared across the entity model.
//!
//! All variants round-trip as their lowercase snake_case string form, per
//! spec §4.A.

use serde::{Deserialize, Serialize};

/// What caused a workflow run to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    PersonMessage,
    GroupMessage,
    Scheduled,
    Manual,
    Api,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PersonMessage => "person_message",
            Self::GroupMessage => "group_message",
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
            Self::Api => "api",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle status of a [`crate::Workflow`] definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
    Active,
    Inactive,
    Archived,
}

impl Default for WorkflowStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Per-node error policy (spec §3 "Node" common knobs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandler {
    /// Abort the traversal; the whole execution fails.
    Stop,
    /// Mark the node skipped but enqueue its successors anyway.
    Skip,
    /// Treat the failed node as if it had succeeded.
    Continue,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::Stop
    }
}

/// Outcome of a single node handler invocation (spec §4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Success,
    Failed,
}

/// Outcome of an entire workflow execution (spec §3 "Result").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Cancelled,
}
