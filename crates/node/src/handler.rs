//! The base [`NodeHandler`] trait every built-in node implements
//! (spec §4.B: "exposes exactly one operation: execute(context) ->
//! (NodeStatus, output_map). It must not throw").

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nebula_workflow::{Context, NodeStatus};
use serde_json::Value;

use crate::tool_host::ToolHost;

/// Shared, handler-agnostic environment threaded through every
/// `execute` call: an HTTP client and the injected tool host.
///
/// This is the Rust expression of spec §6's external collaborators
/// without coupling the handler trait itself to `reqwest` or a specific
/// tool-host wiring.
#[derive(Clone)]
pub struct HandlerEnv {
    pub http_client: reqwest::Client,
    pub tool_host: Arc<dyn ToolHost>,
    pub default_http_timeout: Duration,
}

impl HandlerEnv {
    #[must_use]
    pub fn new(tool_host: Arc<dyn ToolHost>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            tool_host,
            default_http_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-node-type execution logic.
///
/// A handler is constructed once per node instance (it closes over that
/// node's validated config) and invoked once per visit during traversal.
/// It must never panic; failures are reported as `(NodeStatus::Failed,
/// {"error": message})`.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    async fn execute(
        &self,
        context: &mut Context,
        env: &HandlerEnv,
    ) -> (NodeStatus, serde_json::Map<String, Value>);
}

/// Construct a `(Failed, {"error": message})` output pair, the one
/// sanctioned way a handler reports failure (spec §4.B).
#[must_use]
pub fn failed(message: impl Into<String>) -> (NodeStatus, serde_json::Map<String, Value>) {
    let mut map = serde_json::Map::new();
    map.insert("error".into(), Value::String(message.into()));
    (NodeStatus::Failed, map)
}

/// Construct a `(Success, output)` pair from a `serde_json::json!({...})`
/// object literal.
#[must_use]
pub fn succeeded(output: Value) -> (NodeStatus, serde_json::Map<String, Value>) {
    match output {
        Value::Object(map) => (NodeStatus::Success, map),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".into(), other);
            (NodeStatus::Success, map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_carries_error_key() {
        let (status, out) = failed("boom");
        assert_eq!(status, NodeStatus::Failed);
        assert_eq!(out["error"], "boom");
    }

    #[test]
    fn succeeded_unwraps_object() {
        let (status, out) = succeeded(serde_json::json!({"a": 1}));
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(out["a"], 1);
    }
}
