//! `get_variable` — reads a workflow variable, falling back to a static
//! default when unset (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct GetVariableHandler {
    pub variable_name: String,
    pub default: Option<Value>,
}

#[async_trait]
impl NodeHandler for GetVariableHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let value = context
            .variables
            .get(&self.variable_name)
            .map(|v| v.value.clone())
            .unwrap_or_else(|| self.default.clone().unwrap_or(Value::Null));
        succeeded(serde_json::json!({
            "variable_name": self.variable_name,
            "value": value,
        }))
    }
}
