//! TurboMCP forms demo
//!
//! Runs the project onboarding wizard against the terminal, or against a
//! scripted list of client replies, and shows argument completion backed by
//! the same form fields.
//!
//! ```text
//! turbomcp-demo wizard
//! turbomcp-demo wizard --script replies.json
//! turbomcp-demo complete kind ser
//! ```

mod console;
mod onboarding;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;
use turbomcp_completion::{
    CompletionContext, CompletionRegistry, ComponentKey, FieldCompletion, StaticCompletion,
};
use turbomcp_forms::{
    ElicitationConfig, ElicitationReply, ElicitationSession, ElicitationTransport,
    ScriptStep, ScriptedTransport, Wizard, WizardOutcome,
};

use crate::console::ConsoleTransport;
use crate::onboarding::ProjectPlan;

#[derive(Parser, Debug)]
#[command(name = "turbomcp-demo", version, about = "Elicitation forms and wizards in the terminal")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short = 'c', global = true, env = "TURBOMCP_FORMS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the onboarding wizard
    Wizard {
        /// JSON array of client replies to replay instead of prompting
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Complete an argument of the onboarding prompt
    Complete {
        /// Argument name (`kind` or `region`)
        argument: String,
        /// Partially typed value
        #[arg(default_value = "")]
        partial: String,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_script(path: &PathBuf) -> Result<ScriptedTransport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let replies: Vec<Value> = serde_json::from_str(&text).context("script must be a JSON array")?;

    replies
        .into_iter()
        .try_fold(ScriptedTransport::new(), |transport, reply| -> Result<ScriptedTransport> {
            let reply = ElicitationReply::from_json(reply)?;
            Ok(transport.then(ScriptStep::Reply(reply)))
        })
}

async fn run_wizard(config: ElicitationConfig, script: Option<PathBuf>) -> Result<()> {
    let transport: Arc<dyn ElicitationTransport> = match script {
        Some(path) => Arc::new(load_script(&path)?),
        None => Arc::new(ConsoleTransport::new()),
    };
    let session = ElicitationSession::new(transport).with_config(config);

    let signal = session.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let mut wizard = Wizard::new(onboarding::first_step()?);
    match wizard.run(&session).await? {
        WizardOutcome::Completed {
            data,
            steps,
            replies,
        } => {
            let plan: ProjectPlan = data.deserialize()?;
            info!(steps = steps.len(), "Wizard completed");
            println!("\nCreated {} ({})", plan.name, plan.kind);
            if let Some(port) = plan.port {
                println!("  port: {port}, tls: {}", plan.tls.unwrap_or(false));
            }
            if let Some(license) = &plan.license {
                println!("  license: {license}");
            }
            if let Some(contact) = &plan.contact {
                println!("  on-call: {contact}");
            }
            println!("  steps: {}", steps.join(" -> "));
            for reply in replies.into_iter().flatten() {
                println!("  hook: {reply}");
            }
        }
        WizardOutcome::Terminated {
            step,
            outcome,
            reply,
        } => {
            println!("\nStopped at step {step}: {}", outcome.to_json());
            if let Some(reply) = reply {
                println!("  hook: {reply}");
            }
        }
    }
    Ok(())
}

async fn run_complete(argument: &str, partial: &str) -> Result<()> {
    let registry = CompletionRegistry::new();
    let key = ComponentKey::prompt("new_project");

    let project = onboarding::project_form()?;
    if let Some(field) = project.field("kind") {
        registry.register(key.clone(), "kind", Arc::new(FieldCompletion::new(field)))?;
    }
    registry.register(
        key.clone(),
        "region",
        Arc::new(StaticCompletion::new([
            "us-east-1",
            "us-east-2",
            "us-west-2",
            "eu-west-1",
            "eu-central-1",
        ])),
    )?;

    let response = registry
        .complete(&key, argument, partial, &CompletionContext::default())
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ElicitationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ElicitationConfig::default(),
    };
    init_logging(&config.log_level);

    match cli.command {
        Command::Wizard { script } => run_wizard(config, script).await,
        Command::Complete { argument, partial } => run_complete(&argument, &partial).await,
    }
}
