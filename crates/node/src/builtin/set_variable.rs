//! `set_variable` — writes a workflow variable from an explicit value or,
//! when none is given, from the Data Input Rule input (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus, Variable};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct SetVariableHandler {
    pub variable_name: String,
    pub value: Option<Value>,
}

#[async_trait]
impl NodeHandler for SetVariableHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let value = self
            .value
            .clone()
            .unwrap_or_else(|| Value::Object(context.last_output()));
        let variable = Variable::new(value.clone(), "workflow");
        let declared_type = variable.declared_type.clone();
        context
            .variables
            .insert(self.variable_name.clone(), variable);
        succeeded(serde_json::json!({
            "variable_name": self.variable_name,
            "value": value,
            "declared_type": declared_type,
        }))
    }
}
