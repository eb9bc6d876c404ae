//! The node registry: maps a `node_type` tag to a constructor producing a
//! [`NodeHandler`] (spec §4.B).

use std::collections::HashMap;
use std::sync::Arc;

use nebula_core::NodeKey;
use nebula_workflow::Node;

use crate::builtin;
use crate::error::NodeError;
use crate::handler::NodeHandler;

/// A constructor turning a validated [`Node`] into its handler.
pub type Constructor = Arc<dyn Fn(&Node) -> Box<dyn NodeHandler> + Send + Sync>;

/// In-memory registry mapping [`NodeKey`] to handler constructors.
pub struct NodeRegistry {
    constructors: HashMap<NodeKey, Constructor>,
}

impl NodeRegistry {
    /// An empty registry with no constructors registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry pre-populated with the 11 built-in node handlers
    /// (spec §4.B).
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        builtin::register_all(&mut registry);
        registry
    }

    /// Register a constructor under `key`. Fails if `key` is already
    /// registered.
    pub fn register(
        &mut self,
        key: &str,
        constructor: Constructor,
    ) -> Result<(), NodeError> {
        let key: NodeKey = key.parse()?;
        if self.constructors.contains_key(&key) {
            return Err(NodeError::AlreadyExists(key));
        }
        self.constructors.insert(key, constructor);
        Ok(())
    }

    /// Build a handler for `node` by looking up its `node_type` tag.
    pub fn build(&self, node: &Node) -> Result<Box<dyn NodeHandler>, NodeError> {
        let key: NodeKey = node.node_type().parse()?;
        let constructor = self
            .constructors
            .get(&key)
            .ok_or_else(|| NodeError::NotFound(key.clone()))?;
        Ok(constructor(node))
    }

    /// Whether a constructor is registered for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        key.parse::<NodeKey>()
            .map(|k| self.constructors.contains_key(&k))
            .unwrap_or(false)
    }

    /// Number of registered constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether the registry has no constructors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_builtins_registers_all_eleven() {
        let registry = NodeRegistry::with_builtins();
        for key in [
            "event_start",
            "schedule_start",
            "http_request",
            "json_processor",
            "reply_message",
            "set_variable",
            "get_variable",
            "condition",
            "chat_command_branch",
            "tool_action",
            "end",
        ] {
            assert!(registry.contains(key), "missing builtin: {key}");
        }
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn empty_registry_has_no_builtins() {
        assert!(NodeRegistry::empty().is_empty());
    }

    #[test]
    fn duplicate_register_fails() {
        let mut registry = NodeRegistry::empty();
        registry
            .register("x", Arc::new(|_n| unimplemented!()))
            .unwrap();
        let err = registry.register("x", Arc::new(|_n| unimplemented!()));
        assert!(matches!(err, Err(NodeError::AlreadyExists(_))));
    }
}
