//! Command-line interface for the hearth heating agent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use hearth_agent::{AgentConfig, HeatingAgent};
use hearth_client::{ClientConfig, EnvironmentApi, HttpEnvironmentClient};
use hearth_core::config::env_vars;
use hearth_oracle::{DecisionOracle, OllamaConfig, OllamaOracle, RuleOracle};

/// Hearth - an autonomous heating agent for a smart-office simulator.
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Simulator base URL.
    #[arg(long, global = true)]
    simulator_url: Option<String>,

    /// Agent id used for actuation and the mailbox.
    #[arg(long, global = true)]
    agent_id: Option<String>,

    /// Which decision oracle to use.
    #[arg(long, global = true, value_enum, default_value_t = OracleKind::Ollama)]
    oracle: OracleKind,

    /// Ollama endpoint (oracle = ollama).
    #[arg(long, global = true)]
    ollama_endpoint: Option<String>,

    /// Ollama model (oracle = ollama).
    #[arg(long, global = true)]
    ollama_model: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the agent until interrupted.
    Run {
        /// Seconds between decision cycles.
        #[arg(long)]
        decision_interval: Option<u64>,
        /// Seconds between mailbox polls.
        #[arg(long)]
        message_interval: Option<u64>,
    },
    /// Run a single decision cycle and exit.
    DecideOnce,
}

/// Oracle selection.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum OracleKind {
    /// Deterministic rule-based policy (no model required).
    Rule,
    /// Local model served by Ollama.
    Ollama,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let simulator_url = args
        .simulator_url
        .clone()
        .unwrap_or_else(env_vars::simulator_url);
    let agent_id = args.agent_id.clone().unwrap_or_else(env_vars::agent_id);

    let env: Arc<dyn EnvironmentApi> = Arc::new(
        HttpEnvironmentClient::new(ClientConfig::new(&simulator_url))
            .context("failed to build environment client")?,
    );
    let oracle = build_oracle(&args)?;

    match args.command {
        Command::Run {
            decision_interval,
            message_interval,
        } => {
            let config = AgentConfig {
                agent_id,
                decision_interval: Duration::from_secs(
                    decision_interval.unwrap_or_else(env_vars::decision_interval_secs),
                ),
                message_interval: Duration::from_secs(
                    message_interval.unwrap_or_else(env_vars::message_interval_secs),
                ),
                ..AgentConfig::default()
            };

            let agent = HeatingAgent::new(config, env, oracle);
            agent.start().await;
            tracing::info!(simulator_url = %simulator_url, "agent running, press ctrl-c to stop");

            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for ctrl-c")?;
            tracing::info!("shutting down");
            agent.shutdown().await;
        }
        Command::DecideOnce => {
            let config = AgentConfig {
                agent_id,
                ..AgentConfig::default()
            };
            let agent = HeatingAgent::new(config, env, oracle);
            let outcome = agent
                .run_cycle_once()
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            tracing::info!(outcome = ?outcome, "decision cycle finished");
        }
    }

    Ok(())
}

fn build_oracle(args: &Args) -> Result<Arc<dyn DecisionOracle>> {
    match args.oracle {
        OracleKind::Rule => Ok(Arc::new(RuleOracle::default())),
        OracleKind::Ollama => {
            let model = args
                .ollama_model
                .clone()
                .unwrap_or_else(env_vars::ollama_model);
            let endpoint = args
                .ollama_endpoint
                .clone()
                .unwrap_or_else(env_vars::ollama_endpoint);
            let oracle = OllamaOracle::new(OllamaConfig::new(model).with_endpoint(endpoint))
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            Ok(Arc::new(oracle))
        }
    }
}
