//! The `tool_action` node's external collaborator (spec §6 "Tool host").

use async_trait::async_trait;
use serde_json::Value;

/// The opaque plugin/tool host `tool_action` delegates to.
///
/// The real implementation lives outside this core (spec §1, "Out of
/// scope: ... the plugin/tool host"); this trait is the Rust expression of
/// that boundary.
#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Invoke a tool by id with the given parameters.
    async fn invoke(
        &self,
        tool_id: &str,
        parameters: &serde_json::Map<String, Value>,
    ) -> Result<Value, String>;
}

/// Reference implementation: always succeeds with a placeholder result,
/// matching the original runtime's `"Tool execution placeholder"` stand-in.
#[derive(Debug, Default)]
pub struct NullToolHost;

#[async_trait]
impl ToolHost for NullToolHost {
    async fn invoke(
        &self,
        tool_id: &str,
        parameters: &serde_json::Map<String, Value>,
    ) -> Result<Value, String> {
        Ok(serde_json::json!({
            "tool_id": tool_id,
            "parameters": parameters,
            "result": "Tool execution placeholder",
        }))
    }
}
