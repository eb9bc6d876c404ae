//! # Nebula Serializer
//!
//! Bi-directional conversion between [`Workflow`] and a YAML document
//! (spec §4.C). The document's top level may be either `{workflow: {...}}`
//! or the workflow object directly; both parse. Emission always uses the
//! wrapped form, with the field order `id, name, description, version,
//! status, trigger_types, bot_id, tags, category, variables, nodes, edges,
//! metadata`. This module builds the document by hand (`serde_yaml::Mapping`)
//! rather than deriving `Serialize`/`Deserialize` on [`Workflow`] itself,
//! because the wire shape and the in-memory entity shape are not the same:
//! config fields that are separate struct fields on [`Node`] are nested
//! under a single `config:` mapping on the document, and unknown enum
//! strings are skipped with a warning instead of failing the whole parse.

pub mod error;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use nebula_core::{EdgeId, NodeId, WorkflowId};
use nebula_workflow::{
    BoolLogic, Clause, Edge, EdgeCondition, ErrorHandler, JsonOperation, Node, NodeConfig,
    Operator, Position, TriggerType, VariableDeclaration, Workflow, WorkflowStatus,
};
use serde_yaml::{Mapping, Value as Yaml};

pub use error::SerializerError;

type Result<T> = std::result::Result<T, SerializerError>;

fn y(value: impl serde::Serialize) -> Yaml {
    serde_yaml::to_value(value).unwrap_or(Yaml::Null)
}

fn get_str(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(Yaml::as_str).map(str::to_string)
}

fn get_seq<'a>(map: &'a Mapping, key: &str) -> Option<&'a Vec<Yaml>> {
    map.get(key).and_then(Yaml::as_sequence)
}

fn get_map<'a>(map: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    map.get(key).and_then(Yaml::as_mapping)
}

fn yaml_to_json(value: &Yaml) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Render `workflow` to a YAML string in the wrapped `workflow:` form.
pub fn to_yaml(workflow: &Workflow) -> Result<String> {
    let mut root = Mapping::new();
    root.insert(y("workflow"), workflow_to_yaml(workflow));
    Ok(serde_yaml::to_string(&Yaml::Mapping(root))?)
}

/// Parse a YAML document (wrapped or bare) into a [`Workflow`].
pub fn from_yaml(text: &str) -> Result<Workflow> {
    let doc: Yaml = serde_yaml::from_str(text)?;
    let mapping = match doc {
        Yaml::Mapping(mut map) => match map.remove("workflow") {
            Some(Yaml::Mapping(inner)) => inner,
            _ => map,
        },
        other => {
            return Err(SerializerError::InvalidField {
                field: "<root>",
                value: format!("{other:?}"),
            })
        }
    };
    workflow_from_yaml(mapping)
}

fn workflow_to_yaml(workflow: &Workflow) -> Yaml {
    let mut map = Mapping::new();
    map.insert(y("id"), y(workflow.id.to_string()));
    map.insert(y("name"), y(&workflow.name));
    if let Some(description) = &workflow.description {
        map.insert(y("description"), y(description));
    }
    map.insert(y("version"), y(workflow.version));
    map.insert(y("status"), y(status_tag(workflow.status)));
    map.insert(
        y("trigger_types"),
        Yaml::Sequence(
            workflow
                .trigger_types
                .iter()
                .map(|t| y(trigger_tag(*t)))
                .collect(),
        ),
    );
    if let Some(bot_id) = &workflow.bot_id {
        map.insert(y("bot_id"), y(bot_id));
    }
    map.insert(
        y("tags"),
        Yaml::Sequence(workflow.tags.iter().map(y).collect()),
    );
    if let Some(category) = &workflow.category {
        map.insert(y("category"), y(category));
    }
    map.insert(y("variables"), variables_to_yaml(&workflow.variables));
    map.insert(
        y("nodes"),
        Yaml::Sequence(workflow.nodes.iter().map(node_to_yaml).collect()),
    );
    map.insert(
        y("edges"),
        Yaml::Sequence(workflow.edges.iter().map(edge_to_yaml).collect()),
    );
    let mut metadata = Mapping::new();
    metadata.insert(y("created_at"), y(workflow.created_at.to_rfc3339()));
    metadata.insert(y("updated_at"), y(workflow.updated_at.to_rfc3339()));
    map.insert(y("metadata"), Yaml::Mapping(metadata));

    for (key, value) in &workflow.extra {
        map.insert(y(key), y(value));
    }

    Yaml::Mapping(map)
}

fn variables_to_yaml(
    variables: &std::collections::BTreeMap<String, VariableDeclaration>,
) -> Yaml {
    let mut map = Mapping::new();
    for (name, decl) in variables {
        let mut entry = Mapping::new();
        if let Some(default) = &decl.default {
            entry.insert(y("default"), y(default));
        }
        if let Some(declared_type) = &decl.declared_type {
            entry.insert(y("declared_type"), y(declared_type));
        }
        entry.insert(y("scope"), y(&decl.scope));
        map.insert(y(name), Yaml::Mapping(entry));
    }
    Yaml::Mapping(map)
}

fn node_to_yaml(node: &Node) -> Yaml {
    let mut map = Mapping::new();
    map.insert(y("id"), y(node.id.to_string()));
    map.insert(y("type"), y(node.node_type()));
    map.insert(y("name"), y(&node.name));
    if let Some(position) = node.position {
        let mut pos = Mapping::new();
        pos.insert(y("x"), y(position.x));
        pos.insert(y("y"), y(position.y));
        map.insert(y("position"), Yaml::Mapping(pos));
    }

    let mut config = Mapping::new();
    config_fields_to_yaml(&node.config, &mut config);
    if let Some(timeout) = node.timeout_secs {
        config.insert(y("timeout"), y(timeout));
    }
    if let Some(retry) = node.retry {
        config.insert(y("retry"), y(retry));
    }
    if node.error_handler != ErrorHandler::default() {
        config.insert(y("error_handler"), y(error_handler_tag(node.error_handler)));
    }
    map.insert(y("config"), Yaml::Mapping(config));

    Yaml::Mapping(map)
}

fn config_fields_to_yaml(config: &NodeConfig, out: &mut Mapping) {
    match config {
        NodeConfig::EventStart { trigger_type, filters } => {
            out.insert(y("trigger_type"), y(trigger_tag(*trigger_type)));
            if let Some(filters) = filters {
                out.insert(y("filters"), y(filters));
            }
        }
        NodeConfig::ScheduleStart { cron_expression, timezone } => {
            out.insert(y("cron_expression"), y(cron_expression));
            out.insert(y("timezone"), y(timezone));
        }
        NodeConfig::HttpRequest { method, url, headers, body, auth } => {
            out.insert(y("method"), y(method));
            out.insert(y("url"), y(url));
            if let Some(headers) = headers {
                out.insert(y("headers"), y(headers));
            }
            if let Some(body) = body {
                out.insert(y("body"), y(body));
            }
            if let Some(auth) = auth {
                out.insert(y("auth"), y(auth));
            }
        }
        NodeConfig::JsonProcessor { operation, path, value } => {
            out.insert(y("operation"), y(json_operation_tag(*operation)));
            if let Some(path) = path {
                out.insert(y("path"), y(path));
            }
            if let Some(value) = value {
                out.insert(y("value"), y(value));
            }
        }
        NodeConfig::ReplyMessage { content, reply_to, components } => {
            out.insert(y("content"), y(content));
            if let Some(reply_to) = reply_to {
                out.insert(y("reply_to"), y(reply_to));
            }
            if let Some(components) = components {
                out.insert(y("components"), y(components));
            }
        }
        NodeConfig::SetVariable { variable_name, value } => {
            out.insert(y("variable_name"), y(variable_name));
            if let Some(value) = value {
                out.insert(y("value"), y(value));
            }
        }
        NodeConfig::GetVariable { variable_name, default } => {
            out.insert(y("variable_name"), y(variable_name));
            if let Some(default) = default {
                out.insert(y("default"), y(default));
            }
        }
        NodeConfig::Condition { conditions, logic, default_branch } => {
            out.insert(
                y("conditions"),
                Yaml::Sequence(conditions.iter().map(clause_to_yaml).collect()),
            );
            out.insert(y("logic"), y(bool_logic_tag(*logic)));
            if let Some(default_branch) = default_branch {
                out.insert(y("default_branch"), y(default_branch));
            }
        }
        NodeConfig::ChatCommandBranch { command_prefix } => {
            out.insert(y("command_prefix"), y(command_prefix));
        }
        NodeConfig::ToolAction { tool_id, parameters } => {
            out.insert(y("tool_id"), y(tool_id));
            if let Some(parameters) = parameters {
                out.insert(y("parameters"), y(parameters));
            }
        }
        NodeConfig::End => {}
    }
}

fn clause_to_yaml(clause: &Clause) -> Yaml {
    let mut map = Mapping::new();
    map.insert(y("field"), y(&clause.field));
    map.insert(y("operator"), y(operator_tag(clause.operator)));
    map.insert(y("value"), y(&clause.value));
    Yaml::Mapping(map)
}

fn edge_to_yaml(edge: &Edge) -> Yaml {
    let mut map = Mapping::new();
    map.insert(y("id"), y(edge.id.to_string()));
    map.insert(y("source"), y(edge.source.to_string()));
    map.insert(y("target"), y(edge.target.to_string()));
    if let Some(label) = &edge.label {
        map.insert(y("label"), y(label));
    }
    if let Some(condition) = &edge.condition {
        let mut cond = Mapping::new();
        cond.insert(y("type"), y(&condition.kind));
        if let Some(field) = &condition.field {
            cond.insert(y("field"), y(field));
        }
        cond.insert(y("value"), y(&condition.value));
        if let Some(operator) = condition.operator {
            cond.insert(y("operator"), y(operator_tag(operator)));
        }
        map.insert(y("condition"), Yaml::Mapping(cond));
    }
    Yaml::Mapping(map)
}

fn workflow_from_yaml(map: Mapping) -> Result<Workflow> {
    let id = get_str(&map, "id")
        .and_then(|s| WorkflowId::from_str(&s).ok())
        .unwrap_or_else(WorkflowId::v4);
    let name = get_str(&map, "name").ok_or(SerializerError::MissingField("name"))?;
    let description = get_str(&map, "description");
    let version = map.get("version").and_then(Yaml::as_u64).unwrap_or(1);
    let status = get_str(&map, "status")
        .and_then(|s| parse_status(&s))
        .unwrap_or_default();

    let trigger_types = get_seq(&map, "trigger_types")
        .map(|seq| {
            seq.iter()
                .filter_map(Yaml::as_str)
                .filter_map(|s| match parse_trigger(s) {
                    Some(t) => Some(t),
                    None => {
                        tracing::warn!(trigger = %s, "unknown trigger type, skipping");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let bot_id = get_str(&map, "bot_id");
    let tags = get_seq(&map, "tags")
        .map(|seq| seq.iter().filter_map(Yaml::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    let category = get_str(&map, "category");

    let variables = get_map(&map, "variables")
        .map(variables_from_yaml)
        .unwrap_or_default();

    let nodes = get_seq(&map, "nodes")
        .map(|seq| {
            seq.iter()
                .filter_map(|v| v.as_mapping().cloned())
                .map(node_from_yaml)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let edges = get_seq(&map, "edges")
        .map(|seq| {
            seq.iter()
                .filter_map(|v| v.as_mapping().cloned())
                .map(edge_from_yaml)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let (created_at, updated_at) = get_map(&map, "metadata")
        .map(|metadata| {
            let created = get_str(metadata, "created_at")
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);
            let updated = get_str(metadata, "updated_at")
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);
            (created, updated)
        })
        .unwrap_or_else(|| {
            let now = Utc::now();
            (now, now)
        });

    const KNOWN_KEYS: [&str; 13] = [
        "id", "name", "description", "version", "status", "trigger_types", "bot_id", "tags",
        "category", "variables", "nodes", "edges", "metadata",
    ];
    let extra = map
        .iter()
        .filter_map(|(k, v)| {
            let key = k.as_str()?.to_string();
            if KNOWN_KEYS.contains(&key.as_str()) {
                None
            } else {
                Some((key, yaml_to_json(v)))
            }
        })
        .collect::<IndexMap<_, _>>();

    Ok(Workflow {
        id,
        name,
        description,
        version,
        status,
        trigger_types,
        nodes,
        edges,
        variables,
        bot_id,
        created_at,
        updated_at,
        tags,
        category,
        extra,
    })
}

fn variables_from_yaml(map: &Mapping) -> std::collections::BTreeMap<String, VariableDeclaration> {
    map.iter()
        .filter_map(|(k, v)| {
            let name = k.as_str()?.to_string();
            let entry = v.as_mapping()?;
            let default = entry.get("default").map(yaml_to_json);
            let declared_type = get_str(entry, "declared_type");
            let scope = get_str(entry, "scope").unwrap_or_else(|| "workflow".to_string());
            Some((
                name,
                VariableDeclaration {
                    default,
                    declared_type,
                    scope,
                },
            ))
        })
        .collect()
}

fn node_from_yaml(map: Mapping) -> Result<Node> {
    let id = get_str(&map, "id")
        .and_then(|s| NodeId::from_str(&s).ok())
        .unwrap_or_else(NodeId::v4);
    let name = get_str(&map, "name").ok_or(SerializerError::MissingField("name"))?;
    let node_type = get_str(&map, "type").ok_or(SerializerError::MissingField("type"))?;
    let position = get_map(&map, "position").map(|pos| Position {
        x: pos.get("x").and_then(Yaml::as_f64).unwrap_or(0.0),
        y: pos.get("y").and_then(Yaml::as_f64).unwrap_or(0.0),
    });

    let empty = Mapping::new();
    let config_map = get_map(&map, "config").unwrap_or(&empty);

    let config = config_from_yaml(&node_type, config_map)?;
    let timeout_secs = config_map.get("timeout").and_then(Yaml::as_u64);
    let retry = config_map.get("retry").and_then(Yaml::as_u64).map(|n| n as u32);
    let error_handler = get_str(config_map, "error_handler")
        .as_deref()
        .and_then(parse_error_handler)
        .unwrap_or_default();

    Ok(Node {
        id,
        name,
        position,
        config,
        timeout_secs,
        retry,
        error_handler,
    })
}

fn config_from_yaml(node_type: &str, config: &Mapping) -> Result<NodeConfig> {
    let s = |key: &str| get_str(config, key);
    let val = |key: &str| config.get(key).map(yaml_to_json);

    Ok(match node_type {
        "event_start" => NodeConfig::EventStart {
            trigger_type: s("trigger_type")
                .as_deref()
                .and_then(parse_trigger)
                .ok_or(SerializerError::MissingField("trigger_type"))?,
            filters: val("filters").and_then(|v| serde_json::from_value(v).ok()),
        },
        "schedule_start" => NodeConfig::ScheduleStart {
            cron_expression: s("cron_expression").ok_or(SerializerError::MissingField("cron_expression"))?,
            timezone: s("timezone").unwrap_or_else(|| "UTC".to_string()),
        },
        "http_request" => NodeConfig::HttpRequest {
            method: s("method").ok_or(SerializerError::MissingField("method"))?,
            url: s("url").ok_or(SerializerError::MissingField("url"))?,
            headers: val("headers").and_then(|v| serde_json::from_value(v).ok()),
            body: val("body"),
            auth: val("auth").and_then(|v| serde_json::from_value(v).ok()),
        },
        "json_processor" => NodeConfig::JsonProcessor {
            operation: s("operation")
                .as_deref()
                .and_then(parse_json_operation)
                .ok_or(SerializerError::MissingField("operation"))?,
            path: s("path"),
            value: val("value"),
        },
        "reply_message" => NodeConfig::ReplyMessage {
            content: s("content").ok_or(SerializerError::MissingField("content"))?,
            reply_to: s("reply_to"),
            components: val("components").and_then(|v| serde_json::from_value(v).ok()),
        },
        "set_variable" => NodeConfig::SetVariable {
            variable_name: s("variable_name").ok_or(SerializerError::MissingField("variable_name"))?,
            value: val("value"),
        },
        "get_variable" => NodeConfig::GetVariable {
            variable_name: s("variable_name").ok_or(SerializerError::MissingField("variable_name"))?,
            default: val("default"),
        },
        "condition" => NodeConfig::Condition {
            conditions: get_seq(config, "conditions")
                .map(|seq| seq.iter().filter_map(clause_from_yaml).collect())
                .unwrap_or_default(),
            logic: s("logic").as_deref().and_then(parse_bool_logic).unwrap_or_default(),
            default_branch: s("default_branch"),
        },
        "chat_command_branch" => NodeConfig::ChatCommandBranch {
            command_prefix: s("command_prefix").unwrap_or_else(|| "/".to_string()),
        },
        "tool_action" => NodeConfig::ToolAction {
            tool_id: s("tool_id").ok_or(SerializerError::MissingField("tool_id"))?,
            parameters: val("parameters").and_then(|v| serde_json::from_value(v).ok()),
        },
        "end" => NodeConfig::End,
        other => {
            return Err(SerializerError::InvalidField {
                field: "type",
                value: other.to_string(),
            })
        }
    })
}

fn clause_from_yaml(value: &Yaml) -> Option<Clause> {
    let map = value.as_mapping()?;
    let field = get_str(map, "field")?;
    let operator = get_str(map, "operator").as_deref().and_then(parse_operator)?;
    let value = map.get("value").map(yaml_to_json).unwrap_or(serde_json::Value::Null);
    Some(Clause { field, operator, value })
}

fn edge_from_yaml(map: Mapping) -> Result<Edge> {
    let id = get_str(&map, "id")
        .and_then(|s| EdgeId::from_str(&s).ok())
        .unwrap_or_else(EdgeId::v4);
    let source = get_str(&map, "source")
        .and_then(|s| NodeId::from_str(&s).ok())
        .ok_or(SerializerError::MissingField("source"))?;
    let target = get_str(&map, "target")
        .and_then(|s| NodeId::from_str(&s).ok())
        .ok_or(SerializerError::MissingField("target"))?;
    let label = get_str(&map, "label");
    let condition = get_map(&map, "condition").map(|cond| EdgeCondition {
        kind: get_str(cond, "type").unwrap_or_default(),
        field: get_str(cond, "field"),
        value: cond.get("value").map(yaml_to_json).unwrap_or(serde_json::Value::Null),
        operator: get_str(cond, "operator").as_deref().and_then(parse_operator),
    });
    Ok(Edge { id, source, target, label, condition })
}

fn status_tag(status: WorkflowStatus) -> &'static str {
    match status {
        WorkflowStatus::Draft => "draft",
        WorkflowStatus::Active => "active",
        WorkflowStatus::Inactive => "inactive",
        WorkflowStatus::Archived => "archived",
    }
}

fn parse_status(s: &str) -> Option<WorkflowStatus> {
    Some(match s {
        "draft" => WorkflowStatus::Draft,
        "active" => WorkflowStatus::Active,
        "inactive" => WorkflowStatus::Inactive,
        "archived" => WorkflowStatus::Archived,
        other => {
            tracing::warn!(status = %other, "unknown workflow status, defaulting to draft");
            return None;
        }
    })
}

fn trigger_tag(trigger: TriggerType) -> &'static str {
    match trigger {
        TriggerType::PersonMessage => "person_message",
        TriggerType::GroupMessage => "group_message",
        TriggerType::Scheduled => "scheduled",
        TriggerType::Manual => "manual",
        TriggerType::Api => "api",
    }
}

fn parse_trigger(s: &str) -> Option<TriggerType> {
    Some(match s {
        "person_message" => TriggerType::PersonMessage,
        "group_message" => TriggerType::GroupMessage,
        "scheduled" => TriggerType::Scheduled,
        "manual" => TriggerType::Manual,
        "api" => TriggerType::Api,
        _ => return None,
    })
}

fn error_handler_tag(handler: ErrorHandler) -> &'static str {
    match handler {
        ErrorHandler::Stop => "stop",
        ErrorHandler::Skip => "skip",
        ErrorHandler::Continue => "continue",
    }
}

fn parse_error_handler(s: &str) -> Option<ErrorHandler> {
    Some(match s {
        "stop" => ErrorHandler::Stop,
        "skip" => ErrorHandler::Skip,
        "continue" => ErrorHandler::Continue,
        _ => return None,
    })
}

fn json_operation_tag(op: JsonOperation) -> &'static str {
    match op {
        JsonOperation::Extract => "extract",
        JsonOperation::Set => "set",
        JsonOperation::Serialize => "serialize",
        JsonOperation::Deserialize => "deserialize",
    }
}

fn parse_json_operation(s: &str) -> Option<JsonOperation> {
    Some(match s {
        "extract" => JsonOperation::Extract,
        "set" => JsonOperation::Set,
        "serialize" => JsonOperation::Serialize,
        "deserialize" => JsonOperation::Deserialize,
        _ => return None,
    })
}

fn bool_logic_tag(logic: BoolLogic) -> &'static str {
    match logic {
        BoolLogic::And => "and",
        BoolLogic::Or => "or",
    }
}

fn parse_bool_logic(s: &str) -> Option<BoolLogic> {
    Some(match s {
        "and" => BoolLogic::And,
        "or" => BoolLogic::Or,
        _ => return None,
    })
}

fn operator_tag(op: Operator) -> &'static str {
    match op {
        Operator::Equals => "equals",
        Operator::NotEquals => "not_equals",
        Operator::Contains => "contains",
        Operator::GreaterThan => "greater_than",
        Operator::LessThan => "less_than",
    }
}

fn parse_operator(s: &str) -> Option<Operator> {
    Some(match s {
        "equals" => Operator::Equals,
        "not_equals" => Operator::NotEquals,
        "contains" => Operator::Contains,
        "greater_than" => Operator::GreaterThan,
        "less_than" => Operator::LessThan,
        _ => return None,
    })
}
