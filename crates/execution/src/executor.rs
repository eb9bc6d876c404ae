//! BFS graph executor (spec §4.D), grounded on the original runtime's
//! `WorkflowExecutor._execute_from_nodes` traversal, translated into the
//! teacher's cooperative-yield / cancellation-token idiom.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use nebula_core::{ExecutionId, NodeId};
use nebula_node::{HandlerEnv, NodeRegistry};
use nebula_workflow::{
    Context, Edge, ErrorHandler, ExecutionResult, ExecutionStatus as ResultStatus, Node,
    NodeStatus, TriggerType, Workflow, WorkflowStatus,
};
use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;
use crate::hook::ExecutionHook;
use crate::status::ExecutionStatus;
use crate::transition::validate_execution_transition;

/// Executes a single [`Workflow`] instance.
///
/// One `Executor` is constructed per execution; it owns its [`Context`]
/// exclusively for that execution's lifetime (spec §5: "each owns its
/// Context exclusively").
pub struct Executor<'a> {
    workflow: &'a Workflow,
    registry: &'a NodeRegistry,
    env: &'a HandlerEnv,
    node_map: HashMap<NodeId, &'a Node>,
    edge_map: HashMap<NodeId, Vec<&'a Edge>>,
    reverse_edge_map: HashMap<NodeId, Vec<&'a Edge>>,
    status: ExecutionStatus,
}

impl<'a> Executor<'a> {
    /// Build an executor over `workflow`, indexing its nodes and edges for
    /// traversal (spec §9 "Cyclic references": indices are derived per
    /// Executor at construction, not stored on the Workflow).
    #[must_use]
    pub fn new(workflow: &'a Workflow, registry: &'a NodeRegistry, env: &'a HandlerEnv) -> Self {
        let node_map = workflow.nodes.iter().map(|n| (n.id, n)).collect();

        let mut edge_map: HashMap<NodeId, Vec<&Edge>> = HashMap::new();
        let mut reverse_edge_map: HashMap<NodeId, Vec<&Edge>> = HashMap::new();
        for edge in &workflow.edges {
            edge_map.entry(edge.source).or_default().push(edge);
            reverse_edge_map.entry(edge.target).or_default().push(edge);
        }

        Self {
            workflow,
            registry,
            env,
            node_map,
            edge_map,
            reverse_edge_map,
            status: ExecutionStatus::Idle,
        }
    }

    /// Run the workflow to completion (spec §4.D "Contract").
    ///
    /// Fails only for: workflow not Active, no matching start node, or a
    /// node handler panic escaping `execute` (a bug, not a user error - we
    /// do not attempt to catch panics here, matching the teacher's stance
    /// that a panicking handler is a defect to fix, not a runtime outcome
    /// to model).
    pub async fn execute(
        &mut self,
        execution_id: ExecutionId,
        trigger: TriggerType,
        trigger_data: serde_json::Map<String, serde_json::Value>,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult, ExecutionError> {
        self.execute_with_hook(execution_id, trigger, trigger_data, cancel, None)
            .await
    }

    /// As [`Self::execute`], but interposing `hook` before every node visit
    /// (spec §4.E). The debugger is the sole production caller of this
    /// form; `execute` is the contract-level entry point for everyone else.
    pub async fn execute_with_hook(
        &mut self,
        execution_id: ExecutionId,
        trigger: TriggerType,
        trigger_data: serde_json::Map<String, serde_json::Value>,
        cancel: CancellationToken,
        hook: Option<Arc<dyn ExecutionHook>>,
    ) -> Result<ExecutionResult, ExecutionError> {
        if self.workflow.status != WorkflowStatus::Active {
            return Err(ExecutionError::NotActive);
        }

        validate_execution_transition(self.status, ExecutionStatus::Running)?;
        self.status = ExecutionStatus::Running;

        let started_at = Utc::now();
        let mut context = Context::new(
            self.workflow.id,
            execution_id,
            trigger,
            trigger_data,
            started_at,
        );
        self.seed_variables(&mut context);

        let start_nodes = self.find_start_nodes(trigger);
        if start_nodes.is_empty() {
            self.status = ExecutionStatus::Failed;
            return Err(ExecutionError::NoStart);
        }

        let outcome = self
            .run_traversal(&mut context, &start_nodes, &cancel, hook.as_deref())
            .await;

        let (result_status, terminal) = match &outcome {
            Ok(_) => (ResultStatus::Success, ExecutionStatus::Succeeded),
            Err(TraversalOutcome::Cancelled) => {
                context.record_error(None, "cancelled", Utc::now());
                (ResultStatus::Cancelled, ExecutionStatus::Cancelled)
            }
            Err(TraversalOutcome::Failed) => (ResultStatus::Failed, ExecutionStatus::Failed),
        };

        validate_execution_transition(self.status, terminal)?;
        self.status = terminal;

        let skipped_nodes = match outcome {
            Ok(skipped) => skipped,
            Err(_) => Vec::new(),
        };

        Ok(ExecutionResult::from_context(
            &context,
            result_status,
            skipped_nodes,
            Utc::now(),
        ))
    }

    fn seed_variables(&self, context: &mut Context) {
        for (name, decl) in &self.workflow.variables {
            let value = decl.default.clone().unwrap_or(serde_json::Value::Null);
            context
                .variables
                .insert(name.clone(), nebula_workflow::Variable::new(value, decl.scope.clone()));
        }
    }

    fn find_start_nodes(&self, trigger: TriggerType) -> Vec<&'a Node> {
        self.workflow
            .nodes
            .iter()
            .filter(|node| match &node.config {
                nebula_workflow::NodeConfig::ScheduleStart { .. } => {
                    trigger == TriggerType::Scheduled
                }
                nebula_workflow::NodeConfig::EventStart { trigger_type, .. } => {
                    *trigger_type == trigger
                }
                _ => false,
            })
            .collect()
    }

    async fn run_traversal(
        &self,
        context: &mut Context,
        start_nodes: &[&'a Node],
        cancel: &CancellationToken,
        hook: Option<&dyn ExecutionHook>,
    ) -> Result<Vec<NodeId>, TraversalOutcome> {
        let mut queue: VecDeque<&'a Node> = start_nodes.iter().copied().collect();
        let mut executed: HashSet<NodeId> = HashSet::new();
        let mut skipped: HashSet<NodeId> = HashSet::new();
        let mut unproductive_pops = 0usize;

        while let Some(node) = queue.pop_front() {
            if cancel.is_cancelled() {
                return Err(TraversalOutcome::Cancelled);
            }

            if executed.contains(&node.id) || skipped.contains(&node.id) {
                continue;
            }

            if !self.dependencies_satisfied(node.id, &executed) {
                queue.push_back(node);
                unproductive_pops += 1;
                if unproductive_pops >= queue.len().max(1) {
                    tracing::error!(node_id = %node.id, "BFS starved: unsatisfiable dependencies");
                    return Err(TraversalOutcome::Failed);
                }
                continue;
            }
            unproductive_pops = 0;

            context.current_node = Some(node.id);
            if let Some(hook) = hook {
                hook.before_node(node.id, context, cancel).await;
                if cancel.is_cancelled() {
                    return Err(TraversalOutcome::Cancelled);
                }
            }
            let outcome = self.execute_one(node, context, cancel).await;

            match outcome {
                NodeOutcome::Success(output) | NodeOutcome::Continued(output) => {
                    executed.insert(node.id);
                    context.executed_nodes.push(node.id);
                    context.node_outputs.insert(node.id, output.clone());
                    for next in self.successors(node, &output, &executed, &skipped) {
                        queue.push_back(next);
                    }
                }
                NodeOutcome::Skipped(message) => {
                    context.record_error(Some(node.id), message, Utc::now());
                    skipped.insert(node.id);
                    for edge in self.edge_map.get(&node.id).into_iter().flatten() {
                        if let Some(target) = self.node_map.get(&edge.target) {
                            if !executed.contains(&edge.target) && !skipped.contains(&edge.target) {
                                queue.push_back(target);
                            }
                        }
                    }
                }
                NodeOutcome::Stopped(message) => {
                    context.record_error(Some(node.id), message, Utc::now());
                    return Err(TraversalOutcome::Failed);
                }
                NodeOutcome::Cancelled => {
                    return Err(TraversalOutcome::Cancelled);
                }
            }
        }

        Ok(skipped.into_iter().collect())
    }

    fn dependencies_satisfied(&self, node_id: NodeId, executed: &HashSet<NodeId>) -> bool {
        match self.reverse_edge_map.get(&node_id) {
            None => true,
            Some(incoming) => incoming.iter().all(|edge| executed.contains(&edge.source)),
        }
    }

    async fn execute_one(
        &self,
        node: &'a Node,
        context: &mut Context,
        cancel: &CancellationToken,
    ) -> NodeOutcome {
        let handler = match self.registry.build(node) {
            Ok(h) => h,
            Err(err) => return NodeOutcome::Stopped(err.to_string()),
        };

        let attempts = 1 + node.retry.unwrap_or(0);
        let mut last_output = serde_json::Map::new();

        for attempt in 0..attempts {
            if cancel.is_cancelled() {
                return NodeOutcome::Cancelled;
            }

            let invocation = handler.execute(context, self.env);
            let invoked = match node.timeout_secs {
                Some(secs) => {
                    match tokio::time::timeout(Duration::from_secs(secs), invocation).await {
                        Ok(result) => result,
                        Err(_) => (
                            NodeStatus::Failed,
                            error_map(format!(
                                "node '{}' timed out after {secs}s",
                                node.name
                            )),
                        ),
                    }
                }
                None => invocation.await,
            };

            let (status, output) = invoked;
            if status == NodeStatus::Success {
                return NodeOutcome::Success(output);
            }
            last_output = output;

            if attempt + 1 < attempts {
                tracing::warn!(node_id = %node.id, attempt, "node failed, retrying");
            }
        }

        let message = last_output
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("handler reported failure")
            .to_string();

        match node.error_handler {
            ErrorHandler::Stop => NodeOutcome::Stopped(message),
            ErrorHandler::Skip => NodeOutcome::Skipped(message),
            ErrorHandler::Continue => NodeOutcome::Continued(last_output),
        }
    }

    fn successors(
        &self,
        node: &'a Node,
        output: &serde_json::Map<String, serde_json::Value>,
        executed: &HashSet<NodeId>,
        skipped: &HashSet<NodeId>,
    ) -> Vec<&'a Node> {
        let candidates: Vec<&&Edge> = match self.edge_map.get(&node.id) {
            None => return Vec::new(),
            Some(edges) => {
                if node.config.is_branching() {
                    let branch = output
                        .get("branch")
                        .and_then(|v| v.as_str())
                        .unwrap_or("default");
                    edges
                        .iter()
                        .filter(|e| {
                            e.label.as_deref() == Some(branch)
                                || (e.label.is_none() && branch == "default")
                        })
                        .collect()
                } else {
                    edges.iter().collect()
                }
            }
        };

        candidates
            .into_iter()
            .filter(|edge| edge.condition_passes(output))
            .filter_map(|edge| self.node_map.get(&edge.target))
            .filter(|n| !executed.contains(&n.id) && !skipped.contains(&n.id))
            .copied()
            .collect()
    }
}

enum TraversalOutcome {
    Failed,
    Cancelled,
}

enum NodeOutcome {
    Success(serde_json::Map<String, serde_json::Value>),
    /// `error_handler = continue`: treated as success for traversal, but
    /// the output may still carry the `error` key the handler reported.
    Continued(serde_json::Map<String, serde_json::Value>),
    Skipped(String),
    Stopped(String),
    Cancelled,
}

fn error_map(message: String) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    map.insert("error".into(), serde_json::Value::String(message));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::{EdgeId, WorkflowId};
    use nebula_node::NullToolHost;
    use nebula_workflow::NodeConfig;
    use std::sync::Arc;

    fn wf_with(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
        let now = Utc::now();
        Workflow {
            id: WorkflowId::v4(),
            name: "t".into(),
            description: None,
            version: 1,
            status: WorkflowStatus::Active,
            trigger_types: vec![TriggerType::Manual],
            nodes,
            edges,
            variables: Default::default(),
            bot_id: None,
            created_at: now,
            updated_at: now,
            tags: vec![],
            category: None,
            extra: Default::default(),
        }
    }

    fn event_start(id: NodeId) -> Node {
        Node {
            id,
            name: "start".into(),
            position: None,
            config: NodeConfig::EventStart {
                trigger_type: TriggerType::Manual,
                filters: None,
            },
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::default(),
        }
    }

    fn reply(id: NodeId, content: &str) -> Node {
        Node {
            id,
            name: "reply".into(),
            position: None,
            config: NodeConfig::ReplyMessage {
                content: content.into(),
                reply_to: None,
                components: None,
            },
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::default(),
        }
    }

    fn end(id: NodeId) -> Node {
        Node {
            id,
            name: "end".into(),
            position: None,
            config: NodeConfig::End,
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::default(),
        }
    }

    fn plain_edge(source: NodeId, target: NodeId) -> Edge {
        Edge {
            id: EdgeId::v4(),
            source,
            target,
            label: None,
            condition: None,
        }
    }

    fn env() -> HandlerEnv {
        HandlerEnv::new(Arc::new(NullToolHost))
    }

    #[tokio::test]
    async fn s1_trivial_reply() {
        let start_id = NodeId::v4();
        let reply_id = NodeId::v4();
        let wf = wf_with(
            vec![event_start(start_id), reply(reply_id, "hi {{name}}")],
            vec![plain_edge(start_id, reply_id)],
        );
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        let result = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                serde_json::Map::new(),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.executed_nodes, vec![start_id, reply_id]);
        assert_eq!(result.messages_sent.len(), 1);
        assert_eq!(result.messages_sent[0].content, "hi {{name}}");
    }

    #[tokio::test]
    async fn s2_chat_command_branch_routes_to_labelled_edge() {
        let start_id = NodeId::v4();
        let branch_id = NodeId::v4();
        let command_reply_id = NodeId::v4();
        let chat_reply_id = NodeId::v4();
        let branch_node = Node {
            id: branch_id,
            name: "branch".into(),
            position: None,
            config: NodeConfig::ChatCommandBranch {
                command_prefix: "/".into(),
            },
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::default(),
        };
        let wf = wf_with(
            vec![
                event_start(start_id),
                branch_node,
                reply(command_reply_id, "cmd:{{cmd}}"),
                reply(chat_reply_id, "echo"),
            ],
            vec![
                plain_edge(start_id, branch_id),
                Edge {
                    id: EdgeId::v4(),
                    source: branch_id,
                    target: command_reply_id,
                    label: Some("command".into()),
                    condition: None,
                },
                Edge {
                    id: EdgeId::v4(),
                    source: branch_id,
                    target: chat_reply_id,
                    label: Some("chat".into()),
                    condition: None,
                },
            ],
        );
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        let mut trigger_data = serde_json::Map::new();
        trigger_data.insert("content".into(), serde_json::Value::String("/run x".into()));
        let result = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                trigger_data,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert!(result.executed_nodes.contains(&command_reply_id));
        assert!(!result.executed_nodes.contains(&chat_reply_id));
        assert_eq!(result.messages_sent.len(), 1);
        assert_eq!(result.messages_sent[0].content, "cmd:{{cmd}}");
    }

    #[tokio::test]
    async fn s3_stop_on_failure_halts_traversal() {
        let start_id = NodeId::v4();
        let bad_http_id = NodeId::v4();
        let reply_id = NodeId::v4();
        let http_node = Node {
            id: bad_http_id,
            name: "http".into(),
            position: None,
            config: NodeConfig::HttpRequest {
                method: "NOT-A-METHOD !!".into(),
                url: "http://example.invalid".into(),
                headers: None,
                body: None,
                auth: None,
            },
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::Stop,
        };
        let wf = wf_with(
            vec![event_start(start_id), http_node, reply(reply_id, "hi")],
            vec![
                plain_edge(start_id, bad_http_id),
                plain_edge(bad_http_id, reply_id),
            ],
        );
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        // Per the executor's contract, a stop-policy node failure is not an
        // `Err` - it is a completed execution whose result status is
        // `Failed` (spec §4.D contract / §7 "graph-level failures").
        let result = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                serde_json::Map::new(),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, ResultStatus::Failed);
        assert!(!result.executed_nodes.contains(&reply_id));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].node_id, Some(bad_http_id));
    }

    #[tokio::test]
    async fn s4_skip_policy_still_executes_downstream() {
        let start_id = NodeId::v4();
        let bad_http_id = NodeId::v4();
        let reply_id = NodeId::v4();
        let http_node = Node {
            id: bad_http_id,
            name: "http".into(),
            position: None,
            config: NodeConfig::HttpRequest {
                method: "NOT-A-METHOD !!".into(),
                url: "http://example.invalid".into(),
                headers: None,
                body: None,
                auth: None,
            },
            timeout_secs: None,
            retry: None,
            error_handler: ErrorHandler::Skip,
        };
        let wf = wf_with(
            vec![event_start(start_id), http_node, reply(reply_id, "hi")],
            vec![
                plain_edge(start_id, bad_http_id),
                plain_edge(bad_http_id, reply_id),
            ],
        );
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        let result = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                serde_json::Map::new(),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert!(result.executed_nodes.contains(&reply_id));
        assert!(result.skipped_nodes.contains(&bad_http_id));
    }

    #[tokio::test]
    async fn s5_unsatisfiable_dependencies_fails() {
        let a = NodeId::v4();
        let b = NodeId::v4();
        let phantom_c = NodeId::v4();
        // `b` is itself a start node so it seeds the BFS queue alongside
        // `a`, but its only incoming edge names a source that doesn't
        // exist in the workflow - it can never become ready.
        let wf = wf_with(
            vec![event_start(a), event_start(b)],
            vec![Edge {
                id: EdgeId::v4(),
                source: phantom_c,
                target: b,
                label: None,
                condition: None,
            }],
        );
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        let result = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                serde_json::Map::new(),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        // `a` alone has no incoming edges so it executes; `b`'s only
        // predecessor is `phantom_c`, which never runs - `b` starves and
        // the whole execution fails (not an `Err`, per the contract).
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(!result.executed_nodes.contains(&b));
    }

    #[tokio::test]
    async fn not_active_workflow_is_rejected() {
        let start_id = NodeId::v4();
        let mut wf = wf_with(vec![event_start(start_id)], vec![]);
        wf.status = WorkflowStatus::Draft;
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        let err = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                serde_json::Map::new(),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::NotActive));
    }

    #[tokio::test]
    async fn no_matching_start_node_fails() {
        let start_id = NodeId::v4();
        let wf = wf_with(vec![event_start(start_id)], vec![]);
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);

        let err = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Scheduled,
                serde_json::Map::new(),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::NoStart));
    }

    #[tokio::test]
    async fn already_cancelled_token_yields_cancelled_result() {
        let start_id = NodeId::v4();
        let wf = wf_with(vec![event_start(start_id)], vec![]);
        let registry = NodeRegistry::with_builtins();
        let env = env();
        let mut executor = Executor::new(&wf, &registry, &env);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = executor
            .execute(
                ExecutionId::v4(),
                TriggerType::Manual,
                serde_json::Map::new(),
                cancel,
            )
            .await
            .unwrap();
        assert_eq!(result.status, ResultStatus::Cancelled);
    }
}
