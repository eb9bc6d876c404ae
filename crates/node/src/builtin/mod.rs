//! The 11 built-in node handlers (spec §4.B).

mod chat_command_branch;
mod condition;
mod end;
mod event_start;
mod get_variable;
mod http_request;
mod json_processor;
mod reply_message;
mod schedule_start;
mod set_variable;
mod tool_action;

pub use chat_command_branch::ChatCommandBranchHandler;
pub use condition::ConditionHandler;
pub use end::EndHandler;
pub use event_start::EventStartHandler;
pub use get_variable::GetVariableHandler;
pub use http_request::HttpRequestHandler;
pub use json_processor::JsonProcessorHandler;
pub use reply_message::ReplyMessageHandler;
pub use schedule_start::ScheduleStartHandler;
pub use set_variable::SetVariableHandler;
pub use tool_action::ToolActionHandler;

use std::sync::Arc;
use std::time::Duration;

use nebula_workflow::NodeConfig;

use crate::registry::NodeRegistry;

/// Register every built-in constructor under its `node_type` tag.
pub fn register_all(registry: &mut NodeRegistry) {
    macro_rules! register {
        ($key:literal, $ctor:expr) => {
            registry
                .register($key, Arc::new($ctor))
                .expect(concat!("builtin '", $key, "' registered twice"));
        };
    }

    register!("event_start", |_node| -> Box<dyn crate::handler::NodeHandler> {
        Box::new(EventStartHandler)
    });

    register!("schedule_start", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::ScheduleStart {
                cron_expression,
                timezone,
            } => Box::new(ScheduleStartHandler {
                cron_expression: cron_expression.clone(),
                timezone: timezone.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("http_request", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::HttpRequest {
                method,
                url,
                headers,
                body,
                auth,
            } => Box::new(HttpRequestHandler {
                method: method.clone(),
                url: url.clone(),
                headers: headers.clone(),
                body: body.clone(),
                auth: auth.clone(),
                timeout: node.timeout_secs.map(Duration::from_secs),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("json_processor", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::JsonProcessor {
                operation,
                path,
                value,
            } => Box::new(JsonProcessorHandler {
                operation: *operation,
                path: path.clone(),
                value: value.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("reply_message", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::ReplyMessage {
                content,
                reply_to,
                components,
            } => Box::new(ReplyMessageHandler {
                content: content.clone(),
                reply_to: reply_to.clone(),
                components: components.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("set_variable", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::SetVariable {
                variable_name,
                value,
            } => Box::new(SetVariableHandler {
                variable_name: variable_name.clone(),
                value: value.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("get_variable", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::GetVariable {
                variable_name,
                default,
            } => Box::new(GetVariableHandler {
                variable_name: variable_name.clone(),
                default: default.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("condition", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::Condition {
                conditions,
                logic,
                default_branch,
            } => Box::new(ConditionHandler {
                node_id: node.id,
                conditions: conditions.clone(),
                logic: *logic,
                default_branch: default_branch.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("chat_command_branch", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::ChatCommandBranch { command_prefix } => {
                Box::new(ChatCommandBranchHandler {
                    command_prefix: command_prefix.clone(),
                })
            }
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("tool_action", |node| -> Box<dyn crate::handler::NodeHandler> {
        match &node.config {
            NodeConfig::ToolAction {
                tool_id,
                parameters,
            } => Box::new(ToolActionHandler {
                tool_id: tool_id.clone(),
                parameters: parameters.clone(),
            }),
            _ => unreachable!("registry guarantees node_type matches config variant"),
        }
    });

    register!("end", |_node| -> Box<dyn crate::handler::NodeHandler> {
        Box::new(EndHandler)
    });
}
