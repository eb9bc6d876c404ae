//! # Nebula Debug
//!
//! Interactive debugging for the graph executor (spec §4.E): breakpoints,
//! step mode, pause/resume, and context snapshots over a running
//! [`nebula_execution::Executor`].
//!
//! [`DebugController`] is the shared handle: it implements
//! [`nebula_execution::ExecutionHook`] and is the object a session's
//! controller methods (`set_breakpoint`, `step`, `continue_`, `snapshot`)
//! are called on, typically from a different task than the one running
//! [`session::run`].

pub mod controller;
pub mod session;
pub mod snapshot;

pub use controller::DebugController;
pub use session::run;
pub use snapshot::Snapshot;
