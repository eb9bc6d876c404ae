//! [`WorkflowManager`] — Component F (spec §4.F): the workflow CRUD cache,
//! bot→workflow index, event dispatch, and schedule/debug session
//! orchestration, grounded on the teacher's `WorkflowEngine`
//! (`crates/engine/src/engine.rs`): a struct holding its collaborators
//! behind `Arc`, exposing async `execute_*` entry points.
//!
//! The whole struct is wrapped in one `Arc` (`WorkflowManager` is a cheap
//! `Clone` newtype over `Arc<Inner>`) rather than each field individually,
//! because schedule tasks (spec §4.F "Schedule task lifecycle") must call
//! back into Manager operations from a `tokio::spawn`ed, `'static` task.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use nebula_core::{ExecutionId, NodeId, WorkflowId};
use nebula_debug::DebugController;
use nebula_execution::Executor;
use nebula_node::{HandlerEnv, NodeRegistry};
use nebula_storage::{record_to_workflow, workflow_to_record, ExecutionRecord, PersistenceAdapter, SortOrder};
use nebula_workflow::{ExecutionResult, TriggerType, Workflow, WorkflowStatus};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ManagerConfig;
use crate::error::ManagerError;
use crate::schedule;
use crate::translate::execution_result_to_record;

struct Inner {
    store: Arc<dyn PersistenceAdapter>,
    registry: Arc<NodeRegistry>,
    env: Arc<HandlerEnv>,
    config: ManagerConfig,
    workflows: DashMap<WorkflowId, Workflow>,
    bot_workflows: DashMap<String, Vec<WorkflowId>>,
    scheduled_tasks: DashMap<WorkflowId, Vec<JoinHandle<()>>>,
    debug_sessions: DashMap<ExecutionId, Arc<DebugController>>,
}

/// Cheaply cloneable handle onto the shared manager state.
#[derive(Clone)]
pub struct WorkflowManager(Arc<Inner>);

impl WorkflowManager {
    #[must_use]
    pub fn new(
        store: Arc<dyn PersistenceAdapter>,
        registry: Arc<NodeRegistry>,
        env: Arc<HandlerEnv>,
        config: ManagerConfig,
    ) -> Self {
        Self(Arc::new(Inner {
            store,
            registry,
            env,
            config,
            workflows: DashMap::new(),
            bot_workflows: DashMap::new(),
            scheduled_tasks: DashMap::new(),
            debug_sessions: DashMap::new(),
        }))
    }

    /// Load every workflow from the store, rebuild the in-memory indices,
    /// and start schedule tasks for any Active workflow whose trigger set
    /// includes Scheduled (spec §4.F "Initialization").
    pub async fn init(&self) -> Result<(), ManagerError> {
        let records = self.0.store.list("updated_at", SortOrder::Asc, None).await?;
        for record in records {
            let workflow = record_to_workflow(record)?;
            self.index_workflow(workflow.clone());

            if workflow.status == WorkflowStatus::Active && workflow.trigger_types.contains(&TriggerType::Scheduled) {
                self.start_schedules(&workflow)?;
            }
        }
        Ok(())
    }

    fn index_workflow(&self, workflow: Workflow) {
        if let Some(bot_id) = &workflow.bot_id {
            self.0
                .bot_workflows
                .entry(bot_id.clone())
                .or_default()
                .push(workflow.id);
        }
        self.0.workflows.insert(workflow.id, workflow);
    }

    fn reindex_bot(&self, id: WorkflowId, old_bot: Option<String>, new_bot: Option<String>) {
        if old_bot == new_bot {
            return;
        }
        if let Some(bot_id) = old_bot {
            if let Some(mut ids) = self.0.bot_workflows.get_mut(&bot_id) {
                ids.retain(|w| *w != id);
            }
        }
        if let Some(bot_id) = new_bot {
            self.0.bot_workflows.entry(bot_id).or_default().push(id);
        }
    }

    fn start_schedules(&self, workflow: &Workflow) -> Result<(), ManagerError> {
        let schedules = schedule::parse_schedule_nodes(workflow)?;
        if schedules.is_empty() {
            return Ok(());
        }
        let handles = schedule::spawn_schedule_tasks(self.clone(), workflow.id, schedules);
        self.0.scheduled_tasks.insert(workflow.id, handles);
        Ok(())
    }

    /// Fill in `timeout_secs` for nodes that declare none, and cap
    /// `retry` at the configured ceiling (spec §9 "ManagerConfig (schedule
    /// poll interval, default node timeout, max retries ceiling, ...)").
    fn apply_config_defaults(&self, workflow: &mut Workflow) {
        for node in &mut workflow.nodes {
            if node.timeout_secs.is_none() {
                node.timeout_secs = Some(self.0.config.default_node_timeout_secs);
            }
            if node.retry.is_some_and(|r| r > self.0.config.max_retries) {
                node.retry = Some(self.0.config.max_retries);
            }
        }
    }

    fn stop_schedules(&self, id: WorkflowId) {
        if let Some((_, handles)) = self.0.scheduled_tasks.remove(&id) {
            for handle in handles {
                handle.abort();
            }
        }
    }

    /// Create a new workflow definition (spec §4.F `create`).
    pub async fn create(&self, workflow: Workflow) -> Result<Workflow, ManagerError> {
        workflow.validate()?;
        self.0.store.insert(workflow_to_record(&workflow)).await?;
        self.index_workflow(workflow.clone());
        Ok(workflow)
    }

    /// Cached lookup by id (spec §4.F `get`).
    #[must_use]
    pub fn get(&self, id: WorkflowId) -> Option<Workflow> {
        self.0.workflows.get(&id).map(|entry| entry.value().clone())
    }

    /// Cached listing, optionally filtered by bot and/or status
    /// (spec §4.F `list`).
    #[must_use]
    pub fn list(&self, bot_id: Option<&str>, status: Option<WorkflowStatus>) -> Vec<Workflow> {
        self.0
            .workflows
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|w| bot_id.is_none_or(|b| w.bot_id.as_deref() == Some(b)))
            .filter(|w| status.is_none_or(|s| w.status == s))
            .collect()
    }

    /// Field-wise merge `fields` onto the cached workflow, persisting the
    /// result (spec §4.F `update`: "field-wise merge, bump updated_at and
    /// version"). `updated_at` is bumped here; `version` is bumped
    /// atomically by the storage adapter (spec §4.G).
    pub async fn update(&self, id: WorkflowId, fields: serde_json::Map<String, Value>) -> Result<Workflow, ManagerError> {
        let current = self
            .get(id)
            .ok_or_else(|| ManagerError::WorkflowNotFound(id.to_string()))?;
        let old_bot = current.bot_id.clone();

        let mut value = serde_json::to_value(&current)?;
        if let Value::Object(map) = &mut value {
            for (k, v) in fields {
                map.insert(k, v);
            }
        }
        let mut patched: Workflow = serde_json::from_value(value)?;
        patched.updated_at = Utc::now();
        patched.validate()?;

        let record = workflow_to_record(&patched);
        let record_fields = match serde_json::to_value(&record)? {
            Value::Object(map) => map,
            _ => unreachable!("WorkflowRecord always serializes to an object"),
        };
        let persisted = self.0.store.update(&id.to_string(), record_fields).await?;
        let reloaded = record_to_workflow(persisted)?;

        self.0.workflows.insert(id, reloaded.clone());
        self.reindex_bot(id, old_bot, reloaded.bot_id.clone());
        Ok(reloaded)
    }

    /// Delete a workflow: cascade-cancel its schedule tasks, drop it from
    /// the indices, and delete it (and its executions) from the store
    /// (spec §4.F `delete`, §8 property 7).
    pub async fn delete(&self, id: WorkflowId) -> Result<(), ManagerError> {
        self.stop_schedules(id);
        self.0.store.delete(&id.to_string()).await?;
        if let Some((_, workflow)) = self.0.workflows.remove(&id) {
            if let Some(bot_id) = workflow.bot_id {
                if let Some(mut ids) = self.0.bot_workflows.get_mut(&bot_id) {
                    ids.retain(|w| *w != id);
                }
            }
        }
        Ok(())
    }

    /// Transition a workflow to Active: validates any `schedule_start`
    /// cron expressions up front (failing activation on the first bad one,
    /// per spec §4.F "Invalid cron expressions fail workflow activation"),
    /// then, if its trigger set includes Scheduled, starts one background
    /// task per `schedule_start` node.
    pub async fn activate(&self, id: WorkflowId) -> Result<Workflow, ManagerError> {
        let current = self
            .get(id)
            .ok_or_else(|| ManagerError::WorkflowNotFound(id.to_string()))?;
        let schedules = schedule::parse_schedule_nodes(&current)?;

        let mut fields = serde_json::Map::new();
        fields.insert("status".into(), serde_json::to_value(WorkflowStatus::Active)?);
        let activated = self.update(id, fields).await?;

        if activated.trigger_types.contains(&TriggerType::Scheduled) && !schedules.is_empty() {
            let handles = schedule::spawn_schedule_tasks(self.clone(), id, schedules);
            self.0.scheduled_tasks.insert(id, handles);
        }
        Ok(activated)
    }

    /// Transition a workflow to Inactive, aborting its schedule tasks
    /// (spec §4.F `deactivate`).
    pub async fn deactivate(&self, id: WorkflowId) -> Result<Workflow, ManagerError> {
        self.stop_schedules(id);
        let mut fields = serde_json::Map::new();
        fields.insert("status".into(), serde_json::to_value(WorkflowStatus::Inactive)?);
        self.update(id, fields).await
    }

    /// Bind a workflow to a bot (spec §4.F `bind/unbind bot`).
    pub async fn bind_bot(&self, id: WorkflowId, bot_id: impl Into<String>) -> Result<Workflow, ManagerError> {
        let mut fields = serde_json::Map::new();
        fields.insert("bot_id".into(), Value::String(bot_id.into()));
        self.update(id, fields).await
    }

    /// Unbind a workflow from its bot.
    pub async fn unbind_bot(&self, id: WorkflowId) -> Result<Workflow, ManagerError> {
        let mut fields = serde_json::Map::new();
        fields.insert("bot_id".into(), Value::Null);
        self.update(id, fields).await
    }

    /// Parse a YAML document and create the resulting workflow
    /// (spec §4.F `import`).
    pub async fn import_workflow(&self, text: &str) -> Result<Workflow, ManagerError> {
        let workflow = nebula_serializer::from_yaml(text)?;
        self.create(workflow).await
    }

    /// Render a cached workflow to YAML (spec §4.F `export`).
    pub fn export_workflow(&self, id: WorkflowId) -> Result<String, ManagerError> {
        let workflow = self
            .get(id)
            .ok_or_else(|| ManagerError::WorkflowNotFound(id.to_string()))?;
        Ok(nebula_serializer::to_yaml(&workflow)?)
    }

    /// Run one execution of `id` to completion and persist its result
    /// (spec §4.F `execute_workflow`).
    pub async fn execute_workflow(
        &self,
        id: WorkflowId,
        trigger: TriggerType,
        trigger_data: serde_json::Map<String, Value>,
    ) -> Result<ExecutionResult, ManagerError> {
        let mut workflow = self
            .get(id)
            .ok_or_else(|| ManagerError::WorkflowNotFound(id.to_string()))?;
        if workflow.status != WorkflowStatus::Active {
            return Err(ManagerError::NotActive(id.to_string()));
        }
        self.apply_config_defaults(&mut workflow);

        let execution_id = ExecutionId::v4();
        let span = tracing::info_span!("execute_workflow", workflow_id = %id, %execution_id, %trigger);

        async {
            let mut executor = Executor::new(&workflow, &self.0.registry, &self.0.env);
            let result = executor
                .execute(execution_id, trigger, trigger_data, CancellationToken::new())
                .await?;
            self.persist_execution(&result).await;
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Run one execution of `id` under a fresh [`DebugController`],
    /// returning immediately with the execution id and controller so the
    /// caller can `step`/`continue_`/`snapshot` while it runs in the
    /// background (spec §4.F `debug_workflow`).
    pub async fn debug_workflow(
        &self,
        id: WorkflowId,
        trigger: TriggerType,
        trigger_data: serde_json::Map<String, Value>,
        breakpoints: impl IntoIterator<Item = NodeId>,
        step_mode: bool,
    ) -> Result<(ExecutionId, Arc<DebugController>), ManagerError> {
        let mut workflow = self
            .get(id)
            .ok_or_else(|| ManagerError::WorkflowNotFound(id.to_string()))?;
        if workflow.status != WorkflowStatus::Active {
            return Err(ManagerError::NotActive(id.to_string()));
        }
        self.apply_config_defaults(&mut workflow);

        let execution_id = ExecutionId::v4();
        let controller = DebugController::new(breakpoints, step_mode);
        self.0.debug_sessions.insert(execution_id, controller.clone());

        let manager = self.clone();
        let registry = self.0.registry.clone();
        let env = self.0.env.clone();
        let run_controller = controller.clone();

        tokio::spawn(async move {
            let outcome = nebula_debug::run(
                workflow,
                registry,
                env,
                run_controller,
                execution_id,
                trigger,
                trigger_data,
                CancellationToken::new(),
            )
            .await;
            manager.0.debug_sessions.remove(&execution_id);
            match outcome {
                Ok(result) => manager.persist_execution(&result).await,
                Err(err) => tracing::warn!(%execution_id, %err, "debug session failed"),
            }
        });

        Ok((execution_id, controller))
    }

    /// The controller for a still-running debug session, if any.
    #[must_use]
    pub fn debug_session(&self, execution_id: ExecutionId) -> Option<Arc<DebugController>> {
        self.0.debug_sessions.get(&execution_id).map(|e| e.value().clone())
    }

    /// Dispatch an inbound chat event across `bot_id`'s matching Active
    /// workflows, fanning out concurrently (spec §4.F `handle_message_event`,
    /// §9 REDESIGN FLAGS "Event dispatch"). `event_type` is mapped per
    /// spec §6: `person_message -> PersonMessage`, `group_message ->
    /// GroupMessage`.
    pub async fn handle_message_event(
        &self,
        bot_id: &str,
        event_type: &str,
        event_data: serde_json::Map<String, Value>,
    ) -> Result<Vec<Result<ExecutionResult, ManagerError>>, ManagerError> {
        let trigger = match event_type {
            "person_message" => TriggerType::PersonMessage,
            "group_message" => TriggerType::GroupMessage,
            other => return Err(ManagerError::UnknownEventType(other.to_string())),
        };

        let candidates = self
            .0
            .bot_workflows
            .get(bot_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();

        let matching: Vec<WorkflowId> = candidates
            .into_iter()
            .filter(|id| {
                self.get(*id)
                    .is_some_and(|wf| wf.status == WorkflowStatus::Active && wf.trigger_types.contains(&trigger))
            })
            .collect();

        let dispatches = matching.into_iter().map(|id| {
            let manager = self.clone();
            let data = event_data.clone();
            async move { manager.execute_workflow(id, trigger, data).await }
        });

        Ok(futures::future::join_all(dispatches).await)
    }

    async fn persist_execution(&self, result: &ExecutionResult) {
        let record: ExecutionRecord = execution_result_to_record(result);
        if let Err(err) = self.0.store.insert_execution(record).await {
            tracing::warn!(%err, "failed to persist execution record");
        }
    }
}
