//! [`Node`] and its per-type [`NodeConfig`] payloads (spec §3 "Node").

use std::collections::BTreeMap;

use nebula_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::ErrorHandler;
use crate::operator::Operator;

/// A single boolean clause in a `condition` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// Boolean combinator for a `condition` node's clause list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolLogic {
    And,
    Or,
}

impl Default for BoolLogic {
    fn default() -> Self {
        Self::And
    }
}

/// Type-specific node configuration (spec §3 node variants).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum NodeConfig {
    EventStart {
        trigger_type: crate::enums::TriggerType,
        #[serde(skip_serializing_if = "Option::is_none")]
        filters: Option<BTreeMap<String, Value>>,
    },
    ScheduleStart {
        cron_expression: String,
        #[serde(default = "default_timezone")]
        timezone: String,
    },
    HttpRequest {
        method: String,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<BTreeMap<String, String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        auth: Option<BTreeMap<String, String>>,
    },
    JsonProcessor {
        operation: JsonOperation,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    ReplyMessage {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply_to: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        components: Option<Vec<Value>>,
    },
    SetVariable {
        variable_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    GetVariable {
        variable_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Condition {
        conditions: Vec<Clause>,
        #[serde(default)]
        logic: BoolLogic,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_branch: Option<String>,
    },
    ChatCommandBranch {
        #[serde(default = "default_command_prefix")]
        command_prefix: String,
    },
    ToolAction {
        tool_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        parameters: Option<BTreeMap<String, Value>>,
    },
    End,
}

/// `json_processor` operations (spec §4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonOperation {
    Extract,
    Set,
    Serialize,
    Deserialize,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_command_prefix() -> String {
    "/".to_string()
}

impl NodeConfig {
    /// The `node_type` tag this config serializes under.
    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::EventStart { .. } => "event_start",
            Self::ScheduleStart { .. } => "schedule_start",
            Self::HttpRequest { .. } => "http_request",
            Self::JsonProcessor { .. } => "json_processor",
            Self::ReplyMessage { .. } => "reply_message",
            Self::SetVariable { .. } => "set_variable",
            Self::GetVariable { .. } => "get_variable",
            Self::Condition { .. } => "condition",
            Self::ChatCommandBranch { .. } => "chat_command_branch",
            Self::ToolAction { .. } => "tool_action",
            Self::End => "end",
        }
    }

    /// Whether this node type is a "start" type (spec §3 Workflow
    /// invariant: at least one of these must exist).
    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(self, Self::EventStart { .. } | Self::ScheduleStart { .. })
    }

    /// Whether this node type performs explicit branch selection on its
    /// `branch` output key (spec §4.D successor selection).
    #[must_use]
    pub fn is_branching(&self) -> bool {
        matches!(self, Self::Condition { .. } | Self::ChatCommandBranch { .. })
    }
}

/// Optional 2-D editor layout position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node in the workflow graph (spec §3 "Node").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub config: NodeConfig,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry: Option<u32>,
    #[serde(default)]
    pub error_handler: ErrorHandler,
}

impl Node {
    /// The node_type tag, used for registry lookup.
    #[must_use]
    pub fn node_type(&self) -> &'static str {
        self.config.type_tag()
    }
}
