//! The environment service contract the runtime depends on.

use async_trait::async_trait;

use hearth_core::model::{AgentMessage, AgentMessageRequest, EnvironmentSnapshot};

/// Typed facade over the remote building simulator.
///
/// All operations are fallible remote calls; failures never cross this
/// boundary as errors. Callers must treat `None` / empty / `false` as
/// "unavailable, skip this round", never as "the environment is empty".
#[async_trait]
pub trait EnvironmentApi: Send + Sync {
    /// Fetch the current environment snapshot. `None` on any transport or
    /// deserialization failure.
    async fn fetch_snapshot(&self) -> Option<EnvironmentSnapshot>;

    /// Fetch the heating state for one room. `None` on not-found or
    /// transport failure.
    async fn fetch_room_heating(&self, room_id: &str) -> Option<bool>;

    /// Set the heating state for one room. `false` means the change did not
    /// take effect (unknown room, transport failure); no retry is implied.
    async fn set_room_heating(&self, room_id: &str, desired: bool) -> bool;

    /// Fetch the full message history for an agent (cold start).
    async fn fetch_messages(&self, agent_id: &str) -> Vec<AgentMessage>;

    /// Fetch messages delivered strictly after `after`; with `None` this
    /// behaves as [`fetch_messages`](Self::fetch_messages). Server-side
    /// ordering is not assumed; the caller re-sorts.
    async fn fetch_new_messages(&self, agent_id: &str, after: Option<&str>) -> Vec<AgentMessage>;

    /// Send a message to a peer agent. `false` on any failure.
    async fn send_message(&self, request: &AgentMessageRequest) -> bool;
}
