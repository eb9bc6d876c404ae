//! [`DebugController`] — the shared, cancel-aware pause/resume point a
//! [`nebula_execution::Executor`] suspends on (spec §4.E).
//!
//! Grounded on `nebula-execution`'s own cooperative-yield idiom
//! (`tokio_util::sync::CancellationToken`), applied here to a
//! pause/resume handshake instead of a cancel signal: a
//! [`tokio::sync::Notify`] wakes a suspended traversal, and a one-slot
//! command mailbox tells it whether to advance one node or run free.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use nebula_core::NodeId;
use nebula_execution::ExecutionHook;
use nebula_workflow::Context;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::snapshot::Snapshot;

/// A command sent to a suspended traversal (spec §4.E operations `step()`
/// / `continue()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebugCommand {
    Step,
    Continue,
}

/// Breakpoints, step mode, and the pause/resume handshake for one debug
/// session. Implements [`ExecutionHook`] so an [`nebula_execution::Executor`]
/// can be run under it via `execute_with_hook`.
pub struct DebugController {
    breakpoints: Mutex<HashSet<NodeId>>,
    step_mode: AtomicBool,
    /// Set by `continue_()` when step mode is on, to skip exactly the next
    /// would-be step pause; a breakpoint on that same node still fires.
    suppress_step: AtomicBool,
    paused: AtomicBool,
    command: Mutex<Option<DebugCommand>>,
    resume: Notify,
    paused_notify: Notify,
    snapshot: Mutex<Option<Snapshot>>,
}

impl DebugController {
    /// Construct a controller with an initial breakpoint set and step mode
    /// flag (spec §4.F `debug_workflow(..., breakpoints, step_mode)`).
    #[must_use]
    pub fn new(breakpoints: impl IntoIterator<Item = NodeId>, step_mode: bool) -> Arc<Self> {
        Arc::new(Self {
            breakpoints: Mutex::new(breakpoints.into_iter().collect()),
            step_mode: AtomicBool::new(step_mode),
            suppress_step: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            command: Mutex::new(None),
            resume: Notify::new(),
            paused_notify: Notify::new(),
            snapshot: Mutex::new(None),
        })
    }

    pub fn set_breakpoint(&self, node_id: NodeId) {
        self.breakpoints.lock().insert(node_id);
    }

    pub fn clear_breakpoint(&self, node_id: NodeId) {
        self.breakpoints.lock().remove(&node_id);
    }

    #[must_use]
    pub fn has_breakpoint(&self, node_id: NodeId) -> bool {
        self.breakpoints.lock().contains(&node_id)
    }

    pub fn enable_step(&self) {
        self.step_mode.store(true, Ordering::SeqCst);
    }

    pub fn disable_step(&self) {
        self.step_mode.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stepping(&self) -> bool {
        self.step_mode.load(Ordering::SeqCst)
    }

    /// Whether traversal is currently suspended at a node.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Block until the traversal next suspends (or has already suspended).
    /// Intended for tests and synchronous callers driving a session
    /// step-by-step; production callers typically poll [`Self::snapshot`].
    pub async fn wait_until_paused(&self) {
        loop {
            if self.is_paused() {
                return;
            }
            self.paused_notify.notified().await;
        }
    }

    /// The most recent pause's context digest, if any node has suspended
    /// yet (spec §4.E `snapshot()`).
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.lock().clone()
    }

    /// Advance exactly one node (spec §4.E `step()`).
    pub fn step(&self) {
        *self.command.lock() = Some(DebugCommand::Step);
        self.resume.notify_one();
    }

    /// Run to the next breakpoint or termination (spec §4.E `continue()`).
    pub fn continue_(&self) {
        *self.command.lock() = Some(DebugCommand::Continue);
        self.resume.notify_one();
    }
}

#[async_trait]
impl ExecutionHook for DebugController {
    async fn before_node(&self, node_id: NodeId, context: &Context, cancel: &CancellationToken) {
        let hit_breakpoint = self.has_breakpoint(node_id);
        let step_triggered = self.step_mode.load(Ordering::SeqCst)
            && !self.suppress_step.swap(false, Ordering::SeqCst);

        if !hit_breakpoint && !step_triggered {
            return;
        }

        *self.snapshot.lock() = Some(Snapshot::from_context(context));
        self.paused.store(true, Ordering::SeqCst);
        self.paused_notify.notify_waiters();

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    self.paused.store(false, Ordering::SeqCst);
                    return;
                }
                () = self.resume.notified() => {
                    match self.command.lock().take() {
                        Some(DebugCommand::Step) => {
                            self.paused.store(false, Ordering::SeqCst);
                            return;
                        }
                        Some(DebugCommand::Continue) => {
                            if self.step_mode.load(Ordering::SeqCst) {
                                self.suppress_step.store(true, Ordering::SeqCst);
                            }
                            self.paused.store(false, Ordering::SeqCst);
                            return;
                        }
                        None => continue,
                    }
                }
            }
        }
    }
}
