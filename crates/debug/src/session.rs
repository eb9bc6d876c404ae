//! Running a [`Workflow`] under a [`DebugController`] (spec §4.E: "Wraps
//! an Executor and intercepts transitions").

use std::sync::Arc;

use nebula_core::ExecutionId;
use nebula_execution::{ExecutionError, ExecutionHook, Executor};
use nebula_node::{HandlerEnv, NodeRegistry};
use nebula_workflow::{TriggerType, Workflow};
use tokio_util::sync::CancellationToken;

use crate::controller::DebugController;

/// Run `workflow` to completion under `controller`'s breakpoint/step
/// policy. Callers that want to interact with the session while it runs
/// (`step`, `continue_`, `snapshot`) must call those on `controller` from a
/// different task - `tokio::spawn` this function and keep the returned
/// `Arc<DebugController>` on the caller's side, the way `nebula-manager`'s
/// `debug_sessions` index does.
///
/// Takes owned/`Arc`-shared handles rather than borrows so the whole call
/// is `'static` and can be moved into a spawned task wholesale.
pub async fn run(
    workflow: Workflow,
    registry: Arc<NodeRegistry>,
    env: Arc<HandlerEnv>,
    controller: Arc<DebugController>,
    execution_id: ExecutionId,
    trigger: TriggerType,
    trigger_data: serde_json::Map<String, serde_json::Value>,
    cancel: CancellationToken,
) -> Result<nebula_workflow::ExecutionResult, ExecutionError> {
    let mut executor = Executor::new(&workflow, &registry, &env);
    let hook: Arc<dyn ExecutionHook> = controller;
    executor
        .execute_with_hook(execution_id, trigger, trigger_data, cancel, Some(hook))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::{EdgeId, NodeId, WorkflowId};
    use nebula_node::NullToolHost;
    use nebula_workflow::{Edge, ErrorHandler, ExecutionStatus, Node, NodeConfig, WorkflowStatus};

    fn wf_linear() -> (Workflow, NodeId, NodeId) {
        let start_id = NodeId::v4();
        let reply_id = NodeId::v4();
        let now = chrono::Utc::now();
        let wf = Workflow {
            id: WorkflowId::v4(),
            name: "t".into(),
            description: None,
            version: 1,
            status: WorkflowStatus::Active,
            trigger_types: vec![TriggerType::Manual],
            nodes: vec![
                Node {
                    id: start_id,
                    name: "start".into(),
                    position: None,
                    config: NodeConfig::EventStart {
                        trigger_type: TriggerType::Manual,
                        filters: None,
                    },
                    timeout_secs: None,
                    retry: None,
                    error_handler: ErrorHandler::default(),
                },
                Node {
                    id: reply_id,
                    name: "reply".into(),
                    position: None,
                    config: NodeConfig::ReplyMessage {
                        content: "hi".into(),
                        reply_to: None,
                        components: None,
                    },
                    timeout_secs: None,
                    retry: None,
                    error_handler: ErrorHandler::default(),
                },
            ],
            edges: vec![Edge {
                id: EdgeId::v4(),
                source: start_id,
                target: reply_id,
                label: None,
                condition: None,
            }],
            variables: Default::default(),
            bot_id: None,
            created_at: now,
            updated_at: now,
            tags: vec![],
            category: None,
            extra: Default::default(),
        };
        (wf, start_id, reply_id)
    }

    #[tokio::test]
    async fn breakpoint_suspends_then_continue_completes() {
        let (wf, _start, reply_id) = wf_linear();
        let registry = Arc::new(NodeRegistry::with_builtins());
        let env = Arc::new(HandlerEnv::new(Arc::new(NullToolHost)));
        let controller = DebugController::new([reply_id], false);

        let run_controller = controller.clone();
        let handle = tokio::spawn(run(
            wf,
            registry,
            env,
            run_controller,
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            CancellationToken::new(),
        ));

        controller.wait_until_paused().await;
        let snap = controller.snapshot().expect("snapshot after pause");
        assert_eq!(snap.current_node, Some(reply_id));
        assert!(controller.is_paused());

        controller.continue_();
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.status, ExecutionStatus::Success);
        assert!(result.executed_nodes.contains(&reply_id));
    }

    #[tokio::test]
    async fn step_mode_pauses_before_every_node() {
        let (wf, start_id, reply_id) = wf_linear();
        let registry = Arc::new(NodeRegistry::with_builtins());
        let env = Arc::new(HandlerEnv::new(Arc::new(NullToolHost)));
        let controller = DebugController::new([], true);

        let run_controller = controller.clone();
        let handle = tokio::spawn(run(
            wf,
            registry,
            env,
            run_controller,
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            CancellationToken::new(),
        ));

        controller.wait_until_paused().await;
        assert_eq!(controller.snapshot().unwrap().current_node, Some(start_id));
        controller.step();

        controller.wait_until_paused().await;
        assert_eq!(controller.snapshot().unwrap().current_node, Some(reply_id));
        controller.step();

        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.status, ExecutionStatus::Success);
    }

    #[tokio::test]
    async fn cancel_while_paused_unblocks_the_hook() {
        let (wf, start_id, _reply_id) = wf_linear();
        let registry = Arc::new(NodeRegistry::with_builtins());
        let env = Arc::new(HandlerEnv::new(Arc::new(NullToolHost)));
        let controller = DebugController::new([start_id], false);
        let cancel = CancellationToken::new();

        let run_controller = controller.clone();
        let run_cancel = cancel.clone();
        let handle = tokio::spawn(run(
            wf,
            registry,
            env,
            run_controller,
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            run_cancel,
        ));

        controller.wait_until_paused().await;
        cancel.cancel();
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.status, ExecutionStatus::Cancelled);
    }
}
