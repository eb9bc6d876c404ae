//! `schedule_start` — always succeeds, reporting the schedule that fired
//! (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;

use crate::handler::{succeeded, HandlerEnv, NodeHandler};

pub struct ScheduleStartHandler {
    pub cron_expression: String,
    pub timezone: String,
}

#[async_trait]
impl NodeHandler for ScheduleStartHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        succeeded(serde_json::json!({
            "triggered_at": context.started_at,
            "cron_expression": self.cron_expression,
            "timezone": self.timezone,
        }))
    }
}
