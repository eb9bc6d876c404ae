//! `end` — a no-op terminal node (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct EndHandler;

#[async_trait]
impl NodeHandler for EndHandler {
    async fn execute(
        &self,
        _context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        succeeded(serde_json::json!({
            "completed": true,
            "completed_at": chrono::Utc::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_host::NullToolHost;
    use nebula_core::{ExecutionId, WorkflowId};
    use nebula_workflow::TriggerType;
    use std::sync::Arc;

    #[tokio::test]
    async fn always_succeeds() {
        let mut ctx = Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            chrono::Utc::now(),
        );
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = EndHandler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["completed"], true);
    }
}
