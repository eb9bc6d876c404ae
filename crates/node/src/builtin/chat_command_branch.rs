//! `chat_command_branch` — inspects the trigger payload's `content` for a
//! leading command prefix and routes on the parsed command (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct ChatCommandBranchHandler {
    pub command_prefix: String,
}

#[async_trait]
impl NodeHandler for ChatCommandBranchHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let content = context
            .trigger_data
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("");

        if content.starts_with(&self.command_prefix) {
            let command = content.split_whitespace().next().unwrap_or("").to_string();
            succeeded(serde_json::json!({
                "type": "command",
                "command": command,
                "branch": "command",
            }))
        } else {
            succeeded(serde_json::json!({
                "type": "chat",
                "content": content,
                "branch": "chat",
            }))
        }
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

    fn ctx_with_content(content: &str) -> Context {
        let mut trigger_data = serde_json::Map::new();
        trigger_data.insert("content".into(), json!(content));
        Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::PersonMessage,
            trigger_data,
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn parses_command_after_prefix() {
        let mut ctx = ctx_with_content("/help me");
        let handler = ChatCommandBranchHandler {
            command_prefix: "/".into(),
        };
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = handler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["type"], "command");
        assert_eq!(out["command"], "/help");
        assert_eq!(out["branch"], "command");
    }

    #[tokio::test]
    async fn non_command_content_branches_chat() {
        let mut ctx = ctx_with_content("hello there");
        let handler = ChatCommandBranchHandler {
            command_prefix: "/".into(),
        };
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (_, out) = handler.execute(&mut ctx, &env).await;
        assert_eq!(out["type"], "chat");
        assert_eq!(out["content"], "hello there");
        assert_eq!(out["branch"], "chat");
    }
}
