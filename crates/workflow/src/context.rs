//! Per-execution mutable state (spec §3 "Context").

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nebula_core::{ExecutionId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::TriggerType;

/// A declared or runtime workflow variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub value: Value,
    /// Informational runtime type name (spec §3 "Node" `set_variable`
    /// note: "variable recorded with its runtime type name").
    pub declared_type: String,
    pub scope: String,
}

impl Variable {
    /// Construct a variable, inferring `declared_type` from the runtime
    /// shape of `value` the way the original dynamically-typed runtime
    /// records `type(value).__name__`.
    #[must_use]
    pub fn new(value: Value, scope: impl Into<String>) -> Self {
        let declared_type = runtime_type_name(&value);
        Self {
            value,
            declared_type,
            scope: scope.into(),
        }
    }
}

fn runtime_type_name(value: &Value) -> String {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
    .to_string()
}

/// One recorded error during an execution (spec §3 "Context.errors").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionErrorEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A message recorded by a `reply_message` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    pub content: String,
}

/// Per-execution mutable state, exclusively owned by one [`Executor`]
/// instance (spec §3 "Context").
///
/// [`Executor`]: https://docs.rs/nebula-execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub workflow_id: WorkflowId,
    pub execution_id: ExecutionId,
    pub trigger: TriggerType,
    pub trigger_data: serde_json::Map<String, Value>,
    pub variables: BTreeMap<String, Variable>,
    pub node_outputs: BTreeMap<NodeId, serde_json::Map<String, Value>>,
    pub current_node: Option<NodeId>,
    pub executed_nodes: Vec<NodeId>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub errors: Vec<ExecutionErrorEntry>,
    pub messages_sent: Vec<SentMessage>,
}

impl Context {
    /// Create a fresh context for a new execution.
    #[must_use]
    pub fn new(
        workflow_id: WorkflowId,
        execution_id: ExecutionId,
        trigger: TriggerType,
        trigger_data: serde_json::Map<String, Value>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            workflow_id,
            execution_id,
            trigger,
            trigger_data,
            variables: BTreeMap::new(),
            node_outputs: BTreeMap::new(),
            current_node: None,
            executed_nodes: Vec::new(),
            started_at,
            completed_at: None,
            errors: Vec::new(),
            messages_sent: Vec::new(),
        }
    }

    /// The output_map of the most recently executed node, or the empty
    /// map (spec §4.B "Data Input Rule").
    #[must_use]
    pub fn last_output(&self) -> serde_json::Map<String, Value> {
        self.executed_nodes
            .last()
            .and_then(|id| self.node_outputs.get(id))
            .cloned()
            .unwrap_or_default()
    }

    /// Variables flattened to `name -> value`, for template interpolation
    /// and final-result snapshots.
    #[must_use]
    pub fn variable_values(&self) -> BTreeMap<String, Value> {
        self.variables
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub fn record_error(&mut self, node_id: Option<NodeId>, message: impl Into<String>, now: DateTime<Utc>) {
        self.errors.push(ExecutionErrorEntry {
            node_id,
            message: message.into(),
            timestamp: now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_output_is_empty_before_any_node_runs() {
        let ctx = Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            Utc::now(),
        );
        assert!(ctx.last_output().is_empty());
    }

    #[test]
    fn last_output_reflects_most_recent_node() {
        let mut ctx = Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            Utc::now(),
        );
        let n1 = NodeId::v4();
        let n2 = NodeId::v4();
        let mut out1 = serde_json::Map::new();
        out1.insert("a".into(), json!(1));
        ctx.node_outputs.insert(n1, out1);
        ctx.executed_nodes.push(n1);

        let mut out2 = serde_json::Map::new();
        out2.insert("b".into(), json!(2));
        ctx.node_outputs.insert(n2, out2.clone());
        ctx.executed_nodes.push(n2);

        assert_eq!(ctx.last_output(), out2);
    }

    #[test]
    fn variable_type_inference() {
        assert_eq!(Variable::new(json!(5), "workflow").declared_type, "int");
        assert_eq!(Variable::new(json!(5.5), "workflow").declared_type, "float");
        assert_eq!(Variable::new(json!("x"), "workflow").declared_type, "str");
        assert_eq!(Variable::new(Value::Null, "workflow").declared_type, "None");
    }
}
