//! `tool_action` — delegates to the injected [`ToolHost`] (spec §4.B, §6).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::handler::{failed, succeeded, HandlerEnv, NodeHandler};

pub struct ToolActionHandler {
    pub tool_id: String,
    pub parameters: Option<BTreeMap<String, Value>>,
}

#[async_trait]
impl NodeHandler for ToolActionHandler {
    async fn execute(
        &self,
        _context: &mut Context,
        env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let parameters: serde_json::Map<String, Value> = self
            .parameters
            .clone()
            .unwrap_or_default()
            .into_iter()
            .collect();

        match env.tool_host.invoke(&self.tool_id, &parameters).await {
            Ok(result) => succeeded(serde_json::json!({ "result": result })),
            Err(message) => failed(message),
        }
    }
}
