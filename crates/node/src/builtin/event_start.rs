//! `event_start` — always succeeds, passing through the trigger payload
//! (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;

use crate::handler::{HandlerEnv, NodeHandler};

pub struct EventStartHandler;

#[async_trait]
impl NodeHandler for EventStartHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        (NodeStatus::Success, context.trigger_data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_host::NullToolHost;
    use nebula_core::{ExecutionId, WorkflowId};
    use nebula_workflow::TriggerType;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn passes_through_trigger_data() {
        let mut trigger_data = serde_json::Map::new();
        trigger_data.insert("content".into(), json!("hi"));
        let mut ctx = Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::PersonMessage,
            trigger_data.clone(),
            chrono::Utc::now(),
        );
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = EventStartHandler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out, trigger_data);
    }
}
