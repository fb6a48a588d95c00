//! Agent runtime: the dual-loop scheduler that turns observed environment
//! state into heating actuation and peer messages.
//!
//! The runtime owns two independent concurrent loops, the decision loop
//! and the message loop, started and stopped together. It is written
//! against the [`hearth_client::EnvironmentApi`] and
//! [`hearth_oracle::DecisionOracle`] seams so the whole concurrency core is
//! testable without a live simulator or model.

pub mod dedup;
pub mod executor;
pub mod runtime;
pub mod testing;

pub use dedup::MessageTracker;
pub use executor::{ActionExecutor, ExecutionReport};
pub use runtime::{AgentConfig, HeatingAgent};
