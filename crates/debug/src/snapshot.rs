//! A point-in-time read of a suspended [`Context`] (spec §4.E `snapshot()`).

use std::collections::BTreeMap;

use nebula_core::{ExecutionId, NodeId};
use nebula_workflow::{Context, ExecutionErrorEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// "execution_id, current_node, executed_nodes, variables-as-values,
/// node_outputs, errors" (spec §4.E).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub execution_id: ExecutionId,
    pub current_node: Option<NodeId>,
    pub executed_nodes: Vec<NodeId>,
    pub variables: BTreeMap<String, Value>,
    pub node_outputs: BTreeMap<NodeId, serde_json::Map<String, Value>>,
    pub errors: Vec<ExecutionErrorEntry>,
}

impl Snapshot {
    #[must_use]
    pub fn from_context(context: &Context) -> Self {
        Self {
            execution_id: context.execution_id,
            current_node: context.current_node,
            executed_nodes: context.executed_nodes.clone(),
            variables: context.variable_values(),
            node_outputs: context.node_outputs.clone(),
            errors: context.errors.clone(),
        }
    }
}
