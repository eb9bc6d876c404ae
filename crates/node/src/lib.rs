//! # Nebula Node
//!
//! The node registry and the 11 built-in node handlers (spec §4.B).

pub mod builtin;
pub mod error;
pub mod handler;
pub mod registry;
pub mod tool_host;

pub use builtin::{
    ChatCommandBranchHandler, ConditionHandler, EndHandler, EventStartHandler,
    GetVariableHandler, HttpRequestHandler, JsonProcessorHandler, ReplyMessageHandler,
    ScheduleStartHandler, SetVariableHandler, ToolActionHandler,
};
pub use error::NodeError;
pub use handler::{failed, succeeded, HandlerEnv, NodeHandler};
pub use registry::{Constructor, NodeRegistry};
pub use tool_host::{NullToolHost, ToolHost};
