//! `reply_message` — interpolates its content against current variables and
//! records a sent message (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{template, Context, NodeStatus, SentMessage};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct ReplyMessageHandler {
    pub content: String,
    pub reply_to: Option<String>,
    pub components: Option<Vec<Value>>,
}

#[async_trait]
impl NodeHandler for ReplyMessageHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let content = template::interpolate(&self.content, &context.variable_values());
        context.messages_sent.push(SentMessage {
            content: content.clone(),
        });
        succeeded(serde_json::json!({
            "message_sent": true,
            "content": content,
            "reply_to": self.reply_to,
            "components": self.components,
        }))
    }
}
