//! [`Edge`] — a directed connection between two nodes (spec §3 "Edge").

use nebula_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operator::Operator;

/// An edge-level condition gating traversal (spec §4.D successor
/// selection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCondition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<EdgeCondition>,
}

impl Edge {
    /// Evaluate this edge's condition (if any) against a source node's
    /// output, per §4.A operator semantics. An edge with no condition
    /// always passes.
    #[must_use]
    pub fn condition_passes(&self, source_output: &serde_json::Map<String, Value>) -> bool {
        let Some(cond) = &self.condition else {
            return true;
        };
        let Some(operator) = cond.operator else {
            return true;
        };
        let field_value = cond
            .field
            .as_deref()
            .and_then(|f| source_output.get(f))
            .cloned()
            .unwrap_or(Value::Null);
        operator.evaluate(&field_value, &cond.value)
    }
}
