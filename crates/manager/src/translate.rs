//! [`ExecutionResult`] → [`ExecutionRecord`] translation (spec §6
//! "Persistence record"), the execution-side counterpart of
//! `nebula_storage::translate`'s workflow/record conversion.

use nebula_storage::ExecutionRecord;
use nebula_workflow::{ExecutionResult, ExecutionStatus};

/// Render an [`ExecutionResult`] to its persistence-boundary record.
///
/// `node_outputs` and `execution_path` are both keyed/ordered off
/// `executed_nodes`, matching spec §3 "Result" field semantics.
pub fn execution_result_to_record(result: &ExecutionResult) -> ExecutionRecord {
    let execution_path = result.executed_nodes.iter().map(ToString::to_string).collect();

    let node_outputs = result
        .executed_nodes
        .iter()
        .filter_map(|id| result.outputs.get(id).map(|out| (id.to_string(), serde_json::Value::Object(out.clone()))))
        .collect();

    let error = result.errors.last().map(|entry| entry.message.clone());

    let status = match result.status {
        ExecutionStatus::Success => "success",
        ExecutionStatus::Failed => "failed",
        ExecutionStatus::Cancelled => "cancelled",
    };

    ExecutionRecord {
        uuid: result.execution_id.to_string(),
        workflow_uuid: result.workflow_id.to_string(),
        trigger_data: serde_json::Map::new(),
        status: status.to_string(),
        started_at: result.started_at,
        finished_at: Some(result.ended_at),
        execution_path,
        node_outputs,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::{ExecutionId, NodeId, WorkflowId};
    use std::collections::BTreeMap;

    #[test]
    fn status_translates_to_snake_case_string() {
        let now = chrono::Utc::now();
        let node_id = NodeId::v4();
        let result = ExecutionResult {
            execution_id: ExecutionId::v4(),
            workflow_id: WorkflowId::v4(),
            status: ExecutionStatus::Failed,
            started_at: now,
            ended_at: now,
            duration_ms: 0,
            outputs: BTreeMap::new(),
            final_variables: BTreeMap::new(),
            executed_nodes: vec![node_id],
            skipped_nodes: vec![],
            errors: vec![],
            messages_sent: vec![],
        };
        let record = execution_result_to_record(&result);
        assert_eq!(record.status, "failed");
        assert_eq!(record.execution_path, vec![node_id.to_string()]);
    }
}
