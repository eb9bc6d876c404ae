//! [`Workflow`] — a user-authored definition (spec §3 "Workflow").

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use nebula_core::WorkflowId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::edge::Edge;
use crate::enums::{TriggerType, WorkflowStatus};
use crate::error::WorkflowError;
use crate::node::Node;

/// A declared variable's default, type, and scope (spec §3 "Workflow"
/// variable declarations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    "workflow".to_string()
}

/// A complete workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: u64,
    pub status: WorkflowStatus,
    pub trigger_types: Vec<TriggerType>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Top-level document keys this core doesn't model, preserved across a
    /// serializer round-trip instead of being silently dropped (spec §4.C).
    #[serde(flatten, default)]
    pub extra: IndexMap<String, Value>,
}

impl Workflow {
    /// Validate structural invariants (spec §3 "Workflow" Invariants).
    ///
    /// The "at least one start node" invariant is scoped to the Executor's
    /// `execute` contract (a workflow the Executor is asked to run), not to
    /// every valid workflow (a Draft being edited may have no nodes yet) -
    /// callers that need that guarantee call [`Self::validate_has_start`]
    /// explicitly.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let mut seen_nodes = HashSet::new();
        for node in &self.nodes {
            if !seen_nodes.insert(node.id) {
                return Err(WorkflowError::DuplicateNodeId(node.id.to_string()));
            }
        }

        let mut seen_edges = HashSet::new();
        for edge in &self.edges {
            if !seen_edges.insert(edge.id) {
                return Err(WorkflowError::DuplicateEdgeId(edge.id.to_string()));
            }
            if !seen_nodes.contains(&edge.source) {
                return Err(WorkflowError::DanglingEdge {
                    edge_id: edge.id.to_string(),
                    node_id: edge.source.to_string(),
                });
            }
            if !seen_nodes.contains(&edge.target) {
                return Err(WorkflowError::DanglingEdge {
                    edge_id: edge.id.to_string(),
                    node_id: edge.target.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Require at least one start-type node, per the Executor's `execute`
    /// contract (spec §3, §4.D).
    pub fn validate_has_start(&self) -> Result<(), WorkflowError> {
        if self.nodes.iter().any(|n| n.config.is_start()) {
            Ok(())
        } else {
            Err(WorkflowError::NoStartNode)
        }
    }

    /// Apply an update, bumping `version` and `updated_at`. Fails if the
    /// caller-supplied version doesn't strictly increase (spec §8 property
    /// 2, "Version monotonicity").
    pub fn bump_version(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeConfig, Position};
    use nebula_core::{EdgeId, NodeId};

    fn minimal_workflow() -> Workflow {
        let now = Utc::now();
        Workflow {
            id: WorkflowId::v4(),
            name: "test".into(),
            description: None,
            version: 1,
            status: WorkflowStatus::Draft,
            trigger_types: vec![TriggerType::Manual],
            nodes: vec![],
            edges: vec![],
            variables: BTreeMap::new(),
            bot_id: None,
            created_at: now,
            updated_at: now,
            tags: vec![],
            category: None,
            extra: IndexMap::new(),
        }
    }

    fn start_node() -> Node {
        Node {
            id: NodeId::v4(),
            name: "start".into(),
            position: None,
            config: NodeConfig::EventStart {
                trigger_type: TriggerType::Manual,
                filters: None,
            },
            timeout_secs: None,
            retry: None,
            error_handler: crate::enums::ErrorHandler::default(),
        }
    }

    #[test]
    fn empty_workflow_validates_structurally() {
        assert!(minimal_workflow().validate().is_ok());
    }

    #[test]
    fn duplicate_node_id_fails_validation() {
        let mut wf = minimal_workflow();
        let node = start_node();
        wf.nodes.push(node.clone());
        wf.nodes.push(node);
        assert!(matches!(
            wf.validate(),
            Err(WorkflowError::DuplicateNodeId(_))
        ));
    }

    #[test]
    fn dangling_edge_fails_validation() {
        let mut wf = minimal_workflow();
        let node = start_node();
        wf.nodes.push(node.clone());
        wf.edges.push(Edge {
            id: EdgeId::v4(),
            source: node.id,
            target: NodeId::v4(), // doesn't exist
            label: None,
            condition: None,
        });
        assert!(matches!(
            wf.validate(),
            Err(WorkflowError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn no_start_node_fails_start_validation() {
        let wf = minimal_workflow();
        assert!(matches!(
            wf.validate_has_start(),
            Err(WorkflowError::NoStartNode)
        ));
    }

    #[test]
    fn start_node_satisfies_start_validation() {
        let mut wf = minimal_workflow();
        wf.nodes.push(start_node());
        assert!(wf.validate_has_start().is_ok());
    }

    #[test]
    fn bump_version_increments_and_touches_updated_at() {
        let mut wf = minimal_workflow();
        let before = wf.updated_at;
        let later = before + chrono::Duration::seconds(1);
        wf.bump_version(later);
        assert_eq!(wf.version, 2);
        assert_eq!(wf.updated_at, later);
    }
}
