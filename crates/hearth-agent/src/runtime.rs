//! The dual-loop agent runtime.
//!
//! One agent instance owns two long-lived loops started and stopped
//! together: the decision loop (periodic decision cycles) and the message
//! loop (mailbox polling). They share only the cooperative `running` flag;
//! all other loop state is owned exclusively by its loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant};

use hearth_client::EnvironmentApi;
use hearth_core::config::agent as defaults;
use hearth_core::error::{Error, Result};
use hearth_core::model::{AgentMessage, EnvironmentSnapshot};
use hearth_oracle::{DecisionContext, DecisionOracle, OracleInput};

use crate::dedup::MessageTracker;
use crate::executor::{ActionExecutor, ExecutionReport};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Identity under which this agent acts and polls its mailbox.
    pub agent_id: String,
    /// Minimum spacing between decision cycles.
    pub decision_interval: Duration,
    /// Mailbox poll interval.
    pub message_interval: Duration,
    /// Decision-loop wake-up tick (the interval is checked this often).
    pub tick_interval: Duration,
    /// Sleep after an unexpected loop error before resuming the cadence.
    pub error_backoff: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: defaults::DEFAULT_AGENT_ID.to_string(),
            decision_interval: Duration::from_secs(defaults::DECISION_INTERVAL_SECS),
            message_interval: Duration::from_secs(defaults::MESSAGE_INTERVAL_SECS),
            tick_interval: Duration::from_secs(defaults::TICK_INTERVAL_SECS),
            error_backoff: Duration::from_secs(defaults::ERROR_BACKOFF_SECS),
        }
    }
}

/// What one decision cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The snapshot was unavailable; nothing happened.
    SkippedNoSnapshot,
    /// The environment reported a power outage; nothing happened.
    SkippedPowerOutage,
    /// The cycle ran to completion (possibly with zero actions).
    Completed(ExecutionReport),
}

/// The heating agent runtime: `Stopped -> Running -> Stopped`.
pub struct HeatingAgent {
    context: AgentContext,
    running: Arc<RwLock<bool>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl HeatingAgent {
    pub fn new(
        config: AgentConfig,
        env: Arc<dyn EnvironmentApi>,
        oracle: Arc<dyn DecisionOracle>,
    ) -> Self {
        let executor = Arc::new(ActionExecutor::new(env.clone(), config.agent_id.clone()));
        let running = Arc::new(RwLock::new(false));
        Self {
            context: AgentContext {
                config: Arc::new(config),
                env,
                oracle,
                executor,
                running: running.clone(),
            },
            running,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Start both loops. A second call while running is a no-op.
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        let decision = tokio::spawn(decision_loop(self.context.clone()));
        let messages = tokio::spawn(message_loop(self.context.clone()));
        self.handles.lock().await.extend([decision, messages]);

        tracing::info!(agent_id = %self.context.config.agent_id, "heating agent started");
    }

    /// Request a cooperative stop. Loops observe the flag at their next
    /// wake-up; an in-flight cycle or oracle call completes first.
    pub async fn stop(&self) {
        *self.running.write().await = false;
        tracing::info!(agent_id = %self.context.config.agent_id, "heating agent stop requested");
    }

    /// Stop and wait for both loops to finish.
    pub async fn shutdown(&self) {
        self.stop().await;
        let handles: Vec<_> = self.handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Run a single decision cycle outside the loops (used by the CLI's
    /// one-shot mode and by tests).
    pub async fn run_cycle_once(&self) -> Result<CycleOutcome> {
        self.context.run_decision_cycle().await
    }
}

/// Everything the loops need, cloned into each task.
#[derive(Clone)]
struct AgentContext {
    config: Arc<AgentConfig>,
    env: Arc<dyn EnvironmentApi>,
    oracle: Arc<dyn DecisionOracle>,
    executor: Arc<ActionExecutor>,
    running: Arc<RwLock<bool>>,
}

impl AgentContext {
    /// One decision cycle: fetch snapshot, gate on availability and power,
    /// fan out per-room heating reads, decide, execute.
    async fn run_decision_cycle(&self) -> Result<CycleOutcome> {
        let Some(snapshot) = self.env.fetch_snapshot().await else {
            tracing::warn!("environment snapshot unavailable, skipping cycle");
            return Ok(CycleOutcome::SkippedNoSnapshot);
        };

        if snapshot.power_outage {
            tracing::warn!("power outage reported, heating unavailable, skipping cycle");
            return Ok(CycleOutcome::SkippedPowerOutage);
        }

        tracing::debug!(
            simulation_time = %snapshot.simulation_time,
            external_temperature = snapshot.external_temperature,
            rooms = snapshot.rooms.len(),
            "decision cycle"
        );

        let heating = self.fetch_heating_map(&snapshot).await;
        let input = OracleInput {
            snapshot,
            heating: heating.clone(),
            context: DecisionContext::Cycle,
        };

        let actions = self
            .oracle
            .decide(&input)
            .await
            .map_err(|e| Error::oracle(e.to_string()))?;

        let report = self.executor.apply(&actions, &heating).await;
        tracing::info!(
            proposed = actions.len(),
            applied = report.applied,
            suppressed = report.suppressed,
            failed = report.failed,
            "decision cycle complete"
        );
        Ok(CycleOutcome::Completed(report))
    }

    /// Per-room heating lookups are independent reads; issue them
    /// concurrently and join. Failed lookups are simply absent from the map.
    async fn fetch_heating_map(&self, snapshot: &EnvironmentSnapshot) -> HashMap<String, bool> {
        let lookups = snapshot.rooms.iter().map(|room| {
            let env = self.env.clone();
            let room_id = room.id.clone();
            async move {
                let state = env.fetch_room_heating(&room_id).await;
                (room_id, state)
            }
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(room_id, state)| state.map(|s| (room_id, s)))
            .collect()
    }

    /// One mailbox poll: fetch (full history on cold start, incremental
    /// after), dedup, then process addressed messages sequentially.
    async fn poll_messages(&self, tracker: &mut MessageTracker) -> Result<()> {
        let agent_id = &self.config.agent_id;
        let batch = match tracker.cursor() {
            None => self.env.fetch_messages(agent_id).await,
            Some(cursor) => self.env.fetch_new_messages(agent_id, Some(cursor)).await,
        };

        for message in tracker.ingest(batch) {
            if !message.is_addressed_to(agent_id) {
                tracing::debug!(id = %message.id, to = %message.to, "message for another agent, ignoring");
                continue;
            }
            tracing::info!(from = %message.from, kind = %message.kind.as_str(), "received message");
            // The cursor has already moved past this batch, so a failed
            // reaction must not abort the remaining messages: they would be
            // lost for good.
            if let Err(e) = self.process_message(message).await {
                tracing::error!(error = %e, "message reaction failed");
            }
        }
        Ok(())
    }

    /// React to one inbound message: fresh snapshot and heating map, oracle
    /// in message context, execute.
    async fn process_message(&self, message: AgentMessage) -> Result<()> {
        let Some(snapshot) = self.env.fetch_snapshot().await else {
            tracing::warn!("environment unavailable, dropping message reaction");
            return Ok(());
        };

        let heating = self.fetch_heating_map(&snapshot).await;
        let input = OracleInput {
            snapshot,
            heating: heating.clone(),
            context: DecisionContext::Message(message),
        };

        let actions = self
            .oracle
            .decide(&input)
            .await
            .map_err(|e| Error::oracle(e.to_string()))?;
        let report = self.executor.apply(&actions, &heating).await;
        tracing::debug!(
            applied = report.applied,
            suppressed = report.suppressed,
            failed = report.failed,
            "message reaction complete"
        );
        Ok(())
    }
}

/// Periodic decision loop. Ticks fast, runs a cycle when the decision
/// interval has elapsed, and stamps the cycle time regardless of outcome so
/// a failing oracle cannot cause hot-looping.
async fn decision_loop(ctx: AgentContext) {
    let mut ticker = interval(ctx.config.tick_interval);
    ticker.tick().await; // first tick completes immediately
    let mut last_decision: Option<Instant> = None;

    loop {
        ticker.tick().await;
        if !*ctx.running.read().await {
            break;
        }

        let due = last_decision.is_none_or(|t| t.elapsed() >= ctx.config.decision_interval);
        if !due {
            continue;
        }

        let outcome = ctx.run_decision_cycle().await;
        last_decision = Some(Instant::now());

        if let Err(e) = outcome {
            tracing::error!(error = %e, "decision cycle failed");
            sleep(ctx.config.error_backoff).await;
        }
    }

    tracing::info!("decision loop stopped");
}

/// Mailbox polling loop. Owns the dedup tracker for its whole lifetime.
async fn message_loop(ctx: AgentContext) {
    let mut ticker = interval(ctx.config.message_interval);
    ticker.tick().await;
    let mut tracker = MessageTracker::new();

    loop {
        ticker.tick().await;
        if !*ctx.running.read().await {
            break;
        }

        if let Err(e) = ctx.poll_messages(&mut tracker).await {
            tracing::error!(error = %e, "message poll failed");
            sleep(ctx.config.error_backoff).await;
        }
    }

    tracing::info!("message loop stopped");
}
