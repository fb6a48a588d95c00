//! Decision oracle: the pluggable function mapping observed state to
//! proposed actions.
//!
//! The runtime is written against [`DecisionOracle`] and never against a
//! concrete implementation. Two are provided: a deterministic
//! [`RuleOracle`](rule::RuleOracle) (tests, fallback) and an
//! [`OllamaOracle`](ollama::OllamaOracle) backed by a local model with
//! native tool calling.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use hearth_core::action::AgentAction;
use hearth_core::model::{AgentMessage, EnvironmentSnapshot};

pub mod ollama;
pub mod parser;
pub mod prompt;
pub mod rule;

pub use ollama::{OllamaConfig, OllamaOracle};
pub use rule::{RuleConfig, RuleOracle};

/// Why a decision attempt produced no usable output.
///
/// An oracle failure terminates the current cycle with zero side effects;
/// the caller reports it and does not retry.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle call failed: {0}")]
    Call(String),

    #[error("malformed oracle output: {0}")]
    MalformedOutput(String),
}

/// What triggered this decision.
#[derive(Debug, Clone)]
pub enum DecisionContext {
    /// The periodic decision cycle.
    Cycle,
    /// An inbound message from a peer agent.
    Message(AgentMessage),
}

/// Everything an oracle may observe for one decision.
#[derive(Debug, Clone)]
pub struct OracleInput {
    pub snapshot: EnvironmentSnapshot,
    /// Last known heating state per room id, fetched this cycle.
    pub heating: HashMap<String, bool>,
    pub context: DecisionContext,
}

impl OracleInput {
    /// Heating state for a room, defaulting to off when the lookup failed.
    pub fn room_heating(&self, room_id: &str) -> bool {
        self.heating.get(room_id).copied().unwrap_or(false)
    }
}

/// Capability interface for decision making.
///
/// Returning an empty vec is a valid "do nothing" decision.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(&self, input: &OracleInput) -> Result<Vec<AgentAction>, OracleError>;
}
