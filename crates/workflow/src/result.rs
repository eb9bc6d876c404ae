//! [`ExecutionResult`] — the snapshot emitted at executor termination
//! (spec §3 "Result").

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nebula_core::{ExecutionId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{Context, ExecutionErrorEntry, SentMessage};
use crate::enums::ExecutionStatus;

/// Terminal snapshot of one workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub outputs: BTreeMap<NodeId, serde_json::Map<String, Value>>,
    pub final_variables: BTreeMap<String, Value>,
    pub executed_nodes: Vec<NodeId>,
    pub skipped_nodes: Vec<NodeId>,
    pub errors: Vec<ExecutionErrorEntry>,
    pub messages_sent: Vec<SentMessage>,
}

impl ExecutionResult {
    /// Build a result from a terminated context.
    #[must_use]
    pub fn from_context(
        context: &Context,
        status: ExecutionStatus,
        skipped_nodes: Vec<NodeId>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        let duration_ms = (ended_at - context.started_at).num_milliseconds();
        Self {
            execution_id: context.execution_id,
            workflow_id: context.workflow_id,
            status,
            started_at: context.started_at,
            ended_at,
            duration_ms,
            outputs: context.node_outputs.clone(),
            final_variables: context.variable_values(),
            executed_nodes: context.executed_nodes.clone(),
            skipped_nodes,
            errors: context.errors.clone(),
            messages_sent: context.messages_sent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::TriggerType;

    #[test]
    fn duration_is_nonnegative() {
        let ctx = Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            Utc::now(),
        );
        let ended = Utc::now();
        let result = ExecutionResult::from_context(&ctx, ExecutionStatus::Success, vec![], ended);
        assert!(result.duration_ms >= 0);
        assert_eq!(result.status, ExecutionStatus::Success);
    }
}
