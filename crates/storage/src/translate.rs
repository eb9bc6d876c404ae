//! Field-name translation between [`Workflow`] and [`WorkflowRecord`]
//! (spec §4.G, §6): the one place this boundary's lossy/renaming rules
//! live. The serializer (spec §4.C) is deliberately kept out of this.

use nebula_core::WorkflowId;
use nebula_workflow::{Node, NodeConfig, TriggerType, VariableDeclaration, Workflow};
use serde_json::Value;

use crate::error::StorageError;
use crate::record::WorkflowRecord;

/// Flatten `workflow.trigger_types` to the store's single `trigger_type`
/// column by taking the first element, defaulting to `Manual` (spec §4.G).
fn flatten_trigger_type(workflow: &Workflow) -> TriggerType {
    workflow.trigger_types.first().copied().unwrap_or(TriggerType::Manual)
}

/// Best-effort `trigger_config`: the first `schedule_start` node's cron
/// expression/timezone, if the workflow has one. The narrow record shape
/// doesn't specify this field's contents beyond "a map" (spec §6); this is
/// the one piece of trigger-specific config worth indexing at the store
/// boundary without re-deriving the full node.
fn derive_trigger_config(workflow: &Workflow) -> serde_json::Map<String, Value> {
    for node in &workflow.nodes {
        if let NodeConfig::ScheduleStart { cron_expression, timezone } = &node.config {
            let mut map = serde_json::Map::new();
            map.insert("cron_expression".into(), Value::String(cron_expression.clone()));
            map.insert("timezone".into(), Value::String(timezone.clone()));
            return map;
        }
    }
    serde_json::Map::new()
}

/// Convert a [`Workflow`] to its persistence-boundary record.
pub fn workflow_to_record(workflow: &Workflow) -> WorkflowRecord {
    let nodes = workflow
        .nodes
        .iter()
        .map(|n| (n.id.to_string(), serde_json::to_value(n).unwrap_or(Value::Null)))
        .collect();
    let edges = workflow
        .edges
        .iter()
        .map(|e| (e.id.to_string(), serde_json::to_value(e).unwrap_or(Value::Null)))
        .collect();

    let mut workflow_metadata = serde_json::Map::new();
    workflow_metadata.insert("extra".into(), serde_json::to_value(&workflow.extra).unwrap_or(Value::Null));
    workflow_metadata.insert("tags".into(), serde_json::to_value(&workflow.tags).unwrap_or(Value::Null));
    workflow_metadata.insert("category".into(), serde_json::to_value(&workflow.category).unwrap_or(Value::Null));
    workflow_metadata.insert(
        "variables".into(),
        serde_json::to_value(&workflow.variables).unwrap_or(Value::Null),
    );
    workflow_metadata.insert(
        "trigger_types".into(),
        serde_json::to_value(&workflow.trigger_types).unwrap_or(Value::Null),
    );

    WorkflowRecord {
        uuid: workflow.id.to_string(),
        name: workflow.name.clone(),
        description: workflow.description.clone(),
        bot_id: workflow.bot_id.clone(),
        trigger_type: flatten_trigger_type(workflow),
        trigger_config: derive_trigger_config(workflow),
        nodes,
        edges,
        status: workflow.status,
        version: workflow.version,
        workflow_metadata,
        created_at: workflow.created_at,
        updated_at: workflow.updated_at,
    }
}

/// Reconstruct a [`Workflow`] from its persistence-boundary record.
///
/// `trigger_types` is restored from the `workflow_metadata.trigger_types`
/// sub-key this backend packs on insert, falling back to the single
/// `trigger_type` column - a real external store that doesn't preserve
/// that sub-key would only give back the one flattened trigger, which is
/// the lossy behavior spec §4.G explicitly sanctions.
pub fn record_to_workflow(record: WorkflowRecord) -> Result<Workflow, StorageError> {
    let id = WorkflowId::parse(&record.uuid).map_err(|e| StorageError::MalformedRecord {
        field: "uuid",
        reason: e.to_string(),
    })?;

    let nodes: Vec<Node> = record
        .nodes
        .into_values()
        .map(|v| serde_json::from_value(v).map_err(|e| StorageError::MalformedRecord {
            field: "nodes",
            reason: e.to_string(),
        }))
        .collect::<Result<_, _>>()?;

    let edges = record
        .edges
        .into_values()
        .map(|v| serde_json::from_value(v).map_err(|e| StorageError::MalformedRecord {
            field: "edges",
            reason: e.to_string(),
        }))
        .collect::<Result<_, _>>()?;

    let trigger_types = record
        .workflow_metadata
        .get("trigger_types")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<TriggerType>>(v).ok())
        .unwrap_or_else(|| vec![record.trigger_type]);

    let tags = record
        .workflow_metadata
        .get("tags")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let category = record
        .workflow_metadata
        .get("category")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok());

    let variables = record
        .workflow_metadata
        .get("variables")
        .cloned()
        .and_then(|v| serde_json::from_value::<std::collections::BTreeMap<String, VariableDeclaration>>(v).ok())
        .unwrap_or_default();

    let extra = record
        .workflow_metadata
        .get("extra")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    Ok(Workflow {
        id,
        name: record.name,
        description: record.description,
        version: record.version,
        status: record.status,
        trigger_types,
        nodes,
        edges,
        variables,
        bot_id: record.bot_id,
        created_at: record.created_at,
        updated_at: record.updated_at,
        tags,
        category,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::NodeId;
    use nebula_workflow::{ErrorHandler, WorkflowStatus};

    fn sample() -> Workflow {
        let now = chrono::Utc::now();
        Workflow {
            id: WorkflowId::v4(),
            name: "t".into(),
            description: Some("desc".into()),
            version: 3,
            status: WorkflowStatus::Active,
            trigger_types: vec![TriggerType::PersonMessage, TriggerType::Api],
            nodes: vec![Node {
                id: NodeId::v4(),
                name: "start".into(),
                position: None,
                config: NodeConfig::EventStart {
                    trigger_type: TriggerType::PersonMessage,
                    filters: None,
                },
                timeout_secs: None,
                retry: None,
                error_handler: ErrorHandler::default(),
            }],
            edges: vec![],
            variables: Default::default(),
            bot_id: Some("bot-1".into()),
            created_at: now,
            updated_at: now,
            tags: vec!["a".into()],
            category: Some("cat".into()),
            extra: Default::default(),
        }
    }

    #[test]
    fn trigger_type_flattens_to_first() {
        let wf = sample();
        let record = workflow_to_record(&wf);
        assert_eq!(record.trigger_type, TriggerType::PersonMessage);
    }

    #[test]
    fn id_uuid_round_trips() {
        let wf = sample();
        let record = workflow_to_record(&wf);
        assert_eq!(record.uuid, wf.id.to_string());
        let back = record_to_workflow(record).unwrap();
        assert_eq!(back.id, wf.id);
    }

    #[test]
    fn tags_and_category_survive_the_metadata_bucket() {
        let wf = sample();
        let record = workflow_to_record(&wf);
        let back = record_to_workflow(record).unwrap();
        assert_eq!(back.tags, wf.tags);
        assert_eq!(back.category, wf.category);
        assert_eq!(back.trigger_types, wf.trigger_types);
    }

    #[test]
    fn missing_trigger_types_metadata_falls_back_to_single_column() {
        let wf = sample();
        let mut record = workflow_to_record(&wf);
        record.workflow_metadata.remove("trigger_types");
        let back = record_to_workflow(record).unwrap();
        assert_eq!(back.trigger_types, vec![TriggerType::PersonMessage]);
    }
}
