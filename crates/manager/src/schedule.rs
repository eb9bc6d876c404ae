//! Schedule task lifecycle (spec §4.F, §9 REDESIGN FLAGS): real cron
//! parsing via the `cron` crate replaces the placeholder 60-second poll
//! loop. One cooperative `tokio` task runs per `schedule_start` node.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use nebula_core::{NodeId, WorkflowId};
use nebula_workflow::{NodeConfig, TriggerType, Workflow};
use tokio::task::JoinHandle;

use crate::error::ManagerError;
use crate::manager::WorkflowManager;

/// Parse every `schedule_start` node's cron expression. Fails on the
/// first invalid expression, naming the offending node (spec §4.F
/// "Invalid cron expressions fail workflow activation").
pub(crate) fn parse_schedule_nodes(workflow: &Workflow) -> Result<Vec<(NodeId, Schedule)>, ManagerError> {
    workflow
        .nodes
        .iter()
        .filter_map(|node| match &node.config {
            NodeConfig::ScheduleStart { cron_expression, .. } => Some((node.id, cron_expression.clone())),
            _ => None,
        })
        .map(|(node_id, expr)| {
            Schedule::from_str(&expr)
                .map(|schedule| (node_id, schedule))
                .map_err(|err| ManagerError::InvalidCron {
                    node_id: node_id.to_string(),
                    reason: err.to_string(),
                })
        })
        .collect()
}

/// Spawn one background task per parsed schedule, each of which sleeps
/// until its next fire time and calls `execute_workflow` with
/// `Trigger::Scheduled`, looping until deactivation aborts it.
pub(crate) fn spawn_schedule_tasks(
    manager: WorkflowManager,
    workflow_id: WorkflowId,
    schedules: Vec<(NodeId, Schedule)>,
) -> Vec<JoinHandle<()>> {
    schedules
        .into_iter()
        .map(|(node_id, schedule)| {
            let manager = manager.clone();
            tokio::spawn(run_schedule_loop(manager, workflow_id, node_id, schedule))
        })
        .collect()
}

async fn run_schedule_loop(manager: WorkflowManager, workflow_id: WorkflowId, node_id: NodeId, schedule: Schedule) {
    loop {
        let Some(next_fire) = schedule.upcoming(Utc).next() else {
            tracing::warn!(%workflow_id, %node_id, "cron schedule has no further fire times, stopping task");
            return;
        };

        let now = Utc::now();
        if next_fire > now {
            let dur = (next_fire - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(dur).await;
        }

        if let Err(err) = manager
            .execute_workflow(workflow_id, TriggerType::Scheduled, serde_json::Map::new())
            .await
        {
            tracing::warn!(%workflow_id, %node_id, %err, "scheduled execution failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_workflow::{ErrorHandler, Node, WorkflowStatus};

    fn workflow_with_schedule(cron_expression: &str) -> Workflow {
        let now = Utc::now();
        let node_id = NodeId::v4();
        Workflow {
            id: WorkflowId::v4(),
            name: "t".into(),
            description: None,
            version: 1,
            status: WorkflowStatus::Draft,
            trigger_types: vec![TriggerType::Scheduled],
            nodes: vec![Node {
                id: node_id,
                name: "tick".into(),
                position: None,
                config: NodeConfig::ScheduleStart {
                    cron_expression: cron_expression.to_string(),
                    timezone: "UTC".into(),
                },
                timeout_secs: None,
                retry: None,
                error_handler: ErrorHandler::default(),
            }],
            edges: vec![],
            variables: Default::default(),
            bot_id: None,
            created_at: now,
            updated_at: now,
            tags: vec![],
            category: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn valid_cron_parses() {
        // cron crate format includes a leading seconds field.
        let wf = workflow_with_schedule("0 * * * * *");
        let parsed = parse_schedule_nodes(&wf).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn invalid_cron_names_the_node() {
        let wf = workflow_with_schedule("not a cron expression");
        let err = parse_schedule_nodes(&wf).unwrap_err();
        assert!(matches!(err, ManagerError::InvalidCron { .. }));
    }

    #[test]
    fn non_schedule_nodes_are_ignored() {
        let mut wf = workflow_with_schedule("0 * * * * *");
        wf.nodes.push(Node {
            id: NodeId::v4(),
            name: "end".into(),
            position: None,
            config: NodeConfig::End,
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::default(),
        });
        assert_eq!(parse_schedule_nodes(&wf).unwrap().len(), 1);
    }
}
