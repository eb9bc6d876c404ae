//! # Nebula Core
//!
//! Identifiers and shared primitives used by every crate in the workflow
//! execution core: [`WorkflowId`], [`NodeId`], [`EdgeId`], [`ExecutionId`],
//! and the [`NodeKey`] node-type tag.

pub mod id;
pub mod key;

pub use id::{EdgeId, ExecutionId, NodeId, UuidParseError, WorkflowId};
pub use key::{NodeKey, NodeKeyError};

/// Common prelude for downstream crates.
pub mod prelude {
    pub use super::{EdgeId, ExecutionId, NodeId, NodeKey, NodeKeyError, UuidParseError, WorkflowId};
}
