//! # Nebula Workflow
//!
//! The entity model for the workflow execution core: [`Workflow`], [`Node`]
//! / [`NodeConfig`], [`Edge`], [`Context`], [`ExecutionResult`], operator
//! semantics, and `{{name}}` template substitution (spec §3-§4.A).

pub mod context;
pub mod edge;
pub mod enums;
pub mod error;
pub mod node;
pub mod operator;
pub mod result;
pub mod template;
pub mod workflow;

pub use context::{Context, ExecutionErrorEntry, SentMessage, Variable};
pub use edge::{Edge, EdgeCondition};
pub use enums::{ErrorHandler, ExecutionStatus, NodeStatus, TriggerType, WorkflowStatus};
pub use error::WorkflowError;
pub use node::{BoolLogic, Clause, JsonOperation, Node, NodeConfig, Position};
pub use operator::Operator;
pub use result::ExecutionResult;
pub use workflow::{VariableDeclaration, Workflow};
