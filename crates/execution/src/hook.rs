//! The seam the debugger (spec §4.E) interposes on: called once per node,
//! before its handler is constructed and invoked.

use async_trait::async_trait;
use nebula_core::NodeId;
use nebula_workflow::Context;
use tokio_util::sync::CancellationToken;

/// Observes and optionally suspends traversal before each node visit.
///
/// `context` is read-only here, matching spec §4.E: "While suspended the
/// Context is read-only." A no-op implementation (never suspends) is the
/// default behavior when `Executor::execute` is called without a hook.
#[async_trait]
pub trait ExecutionHook: Send + Sync {
    /// Called with `context.current_node` already set to `node_id`. May
    /// suspend for an arbitrary duration; must still respect `cancel`.
    async fn before_node(&self, node_id: NodeId, context: &Context, cancel: &CancellationToken);
}
