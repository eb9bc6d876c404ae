//! `json_processor` — extract/set/serialize/deserialize over the Data
//! Input Rule input (spec §4.B).

use async_trait::async_trait;
use nebula_workflow::{Context, JsonOperation, NodeStatus};
use serde_json::Value;

use crate::handler::{failed, succeeded, HandlerEnv, NodeHandler};

pub struct JsonProcessorHandler {
    pub operation: JsonOperation,
    pub path: Option<String>,
    pub value: Option<Value>,
}

/// Walk a dotted path (`a.b.c`) through nested objects/arrays. Array
/// segments must parse as an index; any miss yields `None`.
fn extract_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a dotted path, creating intermediate objects as needed.
fn set_path(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        current = current
            .as_object_mut()
            .unwrap()
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(serde_json::Map::new());
    }
    current
        .as_object_mut()
        .unwrap()
        .insert(last.to_string(), value);
}

#[async_trait]
impl NodeHandler for JsonProcessorHandler {
    async fn execute(
        &self,
        context: &mut Context,
        _env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>) {
        let input = Value::Object(context.last_output());
        match self.operation {
            JsonOperation::Extract => {
                let path = self.path.as_deref().unwrap_or("");
                match extract_path(&input, path) {
                    Some(value) => succeeded(serde_json::json!({ "result": value })),
                    None => succeeded(serde_json::json!({ "result": Value::Null })),
                }
            }
            JsonOperation::Set => {
                let path = self.path.as_deref().unwrap_or("");
                let mut result = input;
                set_path(&mut result, path, self.value.clone().unwrap_or(Value::Null));
                succeeded(serde_json::json!({ "result": result }))
            }
            JsonOperation::Serialize => match serde_json::to_string(&input) {
                Ok(text) => succeeded(serde_json::json!({ "result": text })),
                Err(err) => failed(err.to_string()),
            },
            JsonOperation::Deserialize => {
                let text = match &input {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match serde_json::from_str::<Value>(&text) {
                    Ok(value) => succeeded(serde_json::json!({ "result": value })),
                    Err(err) => failed(format!("invalid JSON: {err}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_host::NullToolHost;
    use nebula_core::{ExecutionId, NodeId, WorkflowId};
    use nebula_workflow::TriggerType;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx_with_last_output(output: serde_json::Map<String, Value>) -> Context {
        let mut ctx = Context::new(
            WorkflowId::v4(),
            ExecutionId::v4(),
            TriggerType::Manual,
            serde_json::Map::new(),
            chrono::Utc::now(),
        );
        let id = NodeId::v4();
        ctx.node_outputs.insert(id, output);
        ctx.executed_nodes.push(id);
        ctx
    }

    #[tokio::test]
    async fn extract_finds_nested_path() {
        let mut ctx = ctx_with_last_output(json!({"user": {"name": "Ada"}}).as_object().unwrap().clone());
        let handler = JsonProcessorHandler {
            operation: JsonOperation::Extract,
            path: Some("user.name".into()),
            value: None,
        };
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = handler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["result"], "Ada");
    }

    #[tokio::test]
    async fn extract_missing_path_yields_null_not_failure() {
        let mut ctx = ctx_with_last_output(serde_json::Map::new());
        let handler = JsonProcessorHandler {
            operation: JsonOperation::Extract,
            path: Some("missing".into()),
            value: None,
        };
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = handler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["result"], Value::Null);
    }

    #[tokio::test]
    async fn set_creates_intermediate_objects() {
        let mut ctx = ctx_with_last_output(serde_json::Map::new());
        let handler = JsonProcessorHandler {
            operation: JsonOperation::Set,
            path: Some("a.b".into()),
            value: Some(json!(42)),
        };
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = handler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["result"]["a"]["b"], 42);
    }

    #[tokio::test]
    async fn deserialize_round_trips_the_input_object() {
        let mut ctx = ctx_with_last_output(json!({"value": "[1,2,3]"}).as_object().unwrap().clone());
        let handler = JsonProcessorHandler {
            operation: JsonOperation::Deserialize,
            path: None,
            value: None,
        };
        let env = HandlerEnv::new(Arc::new(NullToolHost));
        let (status, out) = handler.execute(&mut ctx, &env).await;
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["result"]["value"], "[1,2,3]");
    }
}
