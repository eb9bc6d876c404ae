//! `condition` — evaluates a clause list against this node's own prior
//! output slot and emits a boolean `result` (spec §4.B).
//!
//! The clause input is deliberately `context.node_outputs.get(&self.id)`
//! rather than the Data Input Rule's "most recently executed node" — this
//! node has not executed yet when its own clauses run, so in a single BFS
//! pass the slot is empty unless an earlier retry of the same node left
//! one behind. This mirrors the original runtime's behavior exactly.
//!
//! Successor selection needs a `branch` label, not a bare bool, so this
//! handler also emits `branch: "true"`/`"false"` derived from `result`.

use async_trait::async_trait;
use nebula_workflow::{BoolLogic, Clause, Context, NodeStatus};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct ConditionHandler {
    pub node_id: nebula_core::NodeId,
    pub conditions: Vec<Clause>,
    pub logic: BoolLogic,
    pub default_branch: Option<String>,
}

#[async_trait]
impl NodeHandler for ConditionHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let input = context
            .node_outputs
            .get(&self.node_id)
            .cloned()
            .unwrap_or_default();

        let result = if self.conditions.is_empty() {
            false
        } else {
            let mut results = self.conditions.iter().map(|clause| {
                let field_value = input.get(&clause.field).cloned().unwrap_or(Value::Null);
                clause.operator.evaluate(&field_value, &clause.value)
            });
            match self.logic {
                BoolLogic::And => results.all(|r| r),
                BoolLogic::Or => results.any(|r| r),
            }
        };

        succeeded(serde_json::json!({
            "result": result,
            "branch": if result { "true" } else { "false" },
            "default_branch": self.default_branch,
        }))
    }
}
