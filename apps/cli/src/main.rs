//! Operator CLI for the Nebula workflow execution core.
//!
//! Each invocation wires a fresh [`WorkflowManager`] over an in-memory
//! [`MemoryStore`] and runs exactly one operation against a workflow file
//! on disk — there is no long-lived daemon here, so `activate`/`run`/
//! `debug` import the file first and operate on the result within the
//! same process (spec §6 "CLI ... exercising the same Manager operations").

mod output;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use nebula_core::NodeId;
use nebula_manager::{ManagerConfig, WorkflowManager};
use nebula_node::{HandlerEnv, NodeRegistry, NullToolHost};
use nebula_storage::MemoryStore;
use nebula_workflow::{TriggerType, Workflow};

#[derive(Parser)]
#[command(name = "nebula", about = "Nebula workflow execution core operator CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a workflow YAML file and print the normalized definition.
    Import { file: PathBuf },
    /// Parse a workflow YAML file and print it back out in canonical form.
    Export {
        file: PathBuf,
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import a workflow and activate it (validating any cron schedules).
    Activate { file: PathBuf },
    /// Import, activate, and run a workflow to completion.
    Run {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "manual")]
        trigger: CliTrigger,
        /// Trigger data as a JSON object.
        #[arg(long)]
        data: Option<String>,
    },
    /// Import, activate, and run a workflow under the step debugger.
    Debug {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "manual")]
        trigger: CliTrigger,
        #[arg(long)]
        data: Option<String>,
        /// Node id to break on; may be given more than once.
        #[arg(long = "breakpoint")]
        breakpoints: Vec<String>,
        /// Pause before every node instead of only at breakpoints.
        #[arg(long)]
        step: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliTrigger {
    PersonMessage,
    GroupMessage,
    Scheduled,
    Manual,
    Api,
}

impl From<CliTrigger> for TriggerType {
    fn from(value: CliTrigger) -> Self {
        match value {
            CliTrigger::PersonMessage => Self::PersonMessage,
            CliTrigger::GroupMessage => Self::GroupMessage,
            CliTrigger::Scheduled => Self::Scheduled,
            CliTrigger::Manual => Self::Manual,
            CliTrigger::Api => Self::Api,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(Cli::parse()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = new_manager();

    match cli.command {
        Command::Import { file } => {
            let workflow = import(&manager, &file).await?;
            output::print_json(&workflow)?;
        }
        Command::Export { file, output } => {
            let workflow = import(&manager, &file).await?;
            let yaml = manager.export_workflow(workflow.id)?;
            match output {
                Some(path) => std::fs::write(&path, yaml)?,
                None => print!("{yaml}"),
            }
        }
        Command::Activate { file } => {
            let workflow = import(&manager, &file).await?;
            let activated = manager.activate(workflow.id).await?;
            output::print_json(&activated)?;
        }
        Command::Run { file, trigger, data } => {
            let workflow = import(&manager, &file).await?;
            manager.activate(workflow.id).await?;
            let trigger_data = parse_trigger_data(data.as_deref())?;
            let result = manager.execute_workflow(workflow.id, trigger.into(), trigger_data).await?;
            output::print_json(&result)?;
        }
        Command::Debug { file, trigger, data, breakpoints, step } => {
            let workflow = import(&manager, &file).await?;
            manager.activate(workflow.id).await?;
            let trigger_data = parse_trigger_data(data.as_deref())?;
            let breakpoints = breakpoints
                .iter()
                .map(|s| NodeId::parse(s).map_err(|e| anyhow::anyhow!("invalid breakpoint node id {s:?}: {e}")))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let (execution_id, controller) = manager
                .debug_workflow(workflow.id, trigger.into(), trigger_data, breakpoints, step)
                .await?;
            eprintln!("debug session {execution_id} started");

            loop {
                if manager.debug_session(execution_id).is_none() {
                    eprintln!("execution {execution_id} finished");
                    break;
                }
                tokio::select! {
                    () = controller.wait_until_paused() => {
                        if let Some(snapshot) = controller.snapshot() {
                            output::print_json(&snapshot)?;
                        }
                        if step {
                            controller.step();
                        } else {
                            controller.continue_();
                        }
                    }
                    () = tokio::time::sleep(Duration::from_millis(25)) => {}
                }
            }
        }
    }

    Ok(())
}

fn new_manager() -> WorkflowManager {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(NodeRegistry::with_builtins());
    let env = Arc::new(HandlerEnv::new(Arc::new(NullToolHost)));
    WorkflowManager::new(store, registry, env, ManagerConfig::from_env())
}

async fn import(manager: &WorkflowManager, file: &PathBuf) -> anyhow::Result<Workflow> {
    let text = std::fs::read_to_string(file)?;
    Ok(manager.import_workflow(&text).await?)
}

fn parse_trigger_data(data: Option<&str>) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    match data {
        None => Ok(serde_json::Map::new()),
        Some(raw) => match serde_json::from_str(raw)? {
            serde_json::Value::Object(map) => Ok(map),
            other => anyhow::bail!("--data must be a JSON object, got {other}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WORKFLOW_YAML: &str = r#"
name: greeter
status: draft
trigger_types: [manual]
nodes:
  - id: "00000000-0000-0000-0000-0000000000a1"
    name: start
    type: event_start
    config:
      trigger_type: manual
  - id: "00000000-0000-0000-0000-0000000000a2"
    name: reply
    type: reply_message
    config:
      content: "hello"
edges:
  - id: "00000000-0000-0000-0000-0000000000e1"
    source: "00000000-0000-0000-0000-0000000000a1"
    target: "00000000-0000-0000-0000-0000000000a2"
"#;

    fn workflow_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(WORKFLOW_YAML.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_trigger_data_accepts_object() {
        let parsed = parse_trigger_data(Some(r#"{"k": 1}"#)).unwrap();
        assert_eq!(parsed.get("k").unwrap(), 1);
    }

    #[test]
    fn parse_trigger_data_rejects_non_object() {
        assert!(parse_trigger_data(Some("[1,2,3]")).is_err());
    }

    #[test]
    fn parse_trigger_data_defaults_to_empty() {
        assert!(parse_trigger_data(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_then_run_executes_the_workflow() {
        let manager = new_manager();
        let file = workflow_file();
        let workflow = import(&manager, &file.path().to_path_buf()).await.unwrap();
        assert_eq!(workflow.name, "greeter");

        manager.activate(workflow.id).await.unwrap();
        let result = manager
            .execute_workflow(workflow.id, TriggerType::Manual, serde_json::Map::new())
            .await
            .unwrap();
        assert_eq!(result.status, nebula_workflow::ExecutionStatus::Success);
    }
}
