//! In-memory test doubles for the runtime seams.
//!
//! Used by this crate's own tests and by downstream integration tests to
//! exercise the concurrency core without a live simulator or model.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use hearth_client::EnvironmentApi;
use hearth_core::action::AgentAction;
use hearth_core::model::{
    AgentMessage, AgentMessageRequest, EnvironmentSnapshot, MessageType, Room, TemperatureSensor,
};
use hearth_oracle::{DecisionOracle, OracleError, OracleInput};

/// Build a snapshot with the given rooms at the given simulation time.
pub fn snapshot(simulation_time: &str, rooms: Vec<Room>) -> EnvironmentSnapshot {
    EnvironmentSnapshot {
        simulation_time: simulation_time.parse().expect("valid simulation time"),
        rooms,
        external_temperature: 5.0,
        time_speed_multiplier: 1.0,
        power_outage: false,
        daylight_intensity: 1.0,
    }
}

/// Build a room with no meetings.
pub fn room(id: &str, temperature: f64, people_count: u32) -> Room {
    Room {
        id: id.to_string(),
        name: id.to_string(),
        temperature_sensor: TemperatureSensor {
            id: format!("temp_{}", id),
            room_id: id.to_string(),
            temperature,
        },
        people_count,
        scheduled_meetings: Vec::new(),
    }
}

/// Build an inbound message.
pub fn message(id: &str, from: &str, to: &str, timestamp: &str) -> AgentMessage {
    AgentMessage {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        kind: MessageType::Inform,
        content: format!("message {}", id),
        timestamp: timestamp.to_string(),
        context: None,
    }
}

/// Scriptable in-memory environment recording every call.
#[derive(Default)]
pub struct MockEnvironment {
    snapshot: Mutex<Option<EnvironmentSnapshot>>,
    heating: Mutex<HashMap<String, bool>>,
    failing_rooms: Mutex<HashSet<String>>,
    /// Batches handed out one per `fetch_messages`/`fetch_new_messages` call.
    message_batches: Mutex<VecDeque<Vec<AgentMessage>>>,

    heating_calls: Mutex<Vec<(String, bool)>>,
    sent_messages: Mutex<Vec<AgentMessageRequest>>,
    full_fetches: AtomicUsize,
    incremental_fetches: Mutex<Vec<Option<String>>>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&self, snapshot: EnvironmentSnapshot) {
        *self.snapshot.lock().unwrap() = Some(snapshot);
    }

    pub fn clear_snapshot(&self) {
        *self.snapshot.lock().unwrap() = None;
    }

    pub fn set_heating_state(&self, room_id: &str, heating: bool) {
        self.heating.lock().unwrap().insert(room_id.to_string(), heating);
    }

    /// Make `set_room_heating` report failure for this room.
    pub fn fail_room(&self, room_id: &str) {
        self.failing_rooms.lock().unwrap().insert(room_id.to_string());
    }

    /// Queue one batch to be returned by the next message fetch.
    pub fn push_message_batch(&self, batch: Vec<AgentMessage>) {
        self.message_batches.lock().unwrap().push_back(batch);
    }

    pub fn heating_calls(&self) -> Vec<(String, bool)> {
        self.heating_calls.lock().unwrap().clone()
    }

    pub fn sent_messages(&self) -> Vec<AgentMessageRequest> {
        self.sent_messages.lock().unwrap().clone()
    }

    pub fn full_fetch_count(&self) -> usize {
        self.full_fetches.load(Ordering::SeqCst)
    }

    /// Cursor values passed to the incremental endpoint, in call order.
    pub fn incremental_fetches(&self) -> Vec<Option<String>> {
        self.incremental_fetches.lock().unwrap().clone()
    }

    fn next_batch(&self) -> Vec<AgentMessage> {
        self.message_batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EnvironmentApi for MockEnvironment {
    async fn fetch_snapshot(&self) -> Option<EnvironmentSnapshot> {
        self.snapshot.lock().unwrap().clone()
    }

    async fn fetch_room_heating(&self, room_id: &str) -> Option<bool> {
        self.heating.lock().unwrap().get(room_id).copied()
    }

    async fn set_room_heating(&self, room_id: &str, desired: bool) -> bool {
        self.heating_calls
            .lock()
            .unwrap()
            .push((room_id.to_string(), desired));
        if self.failing_rooms.lock().unwrap().contains(room_id) {
            return false;
        }
        self.heating.lock().unwrap().insert(room_id.to_string(), desired);
        true
    }

    async fn fetch_messages(&self, _agent_id: &str) -> Vec<AgentMessage> {
        self.full_fetches.fetch_add(1, Ordering::SeqCst);
        self.next_batch()
    }

    async fn fetch_new_messages(&self, agent_id: &str, after: Option<&str>) -> Vec<AgentMessage> {
        if after.is_none() {
            return self.fetch_messages(agent_id).await;
        }
        self.incremental_fetches
            .lock()
            .unwrap()
            .push(after.map(str::to_string));
        self.next_batch()
    }

    async fn send_message(&self, request: &AgentMessageRequest) -> bool {
        self.sent_messages.lock().unwrap().push(request.clone());
        true
    }
}

/// Oracle returning scripted responses in order, then a fixed fallback.
#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<Vec<AgentAction>, String>>>,
    fallback: Vec<AgentAction>,
    inputs: Mutex<Vec<OracleInput>>,
}

impl ScriptedOracle {
    /// An oracle that always proposes nothing.
    pub fn silent() -> Self {
        Self::default()
    }

    /// An oracle that always proposes the given actions.
    pub fn always(actions: Vec<AgentAction>) -> Self {
        Self {
            fallback: actions,
            ..Self::default()
        }
    }

    pub fn push_response(&self, actions: Vec<AgentAction>) {
        self.script.lock().unwrap().push_back(Ok(actions));
    }

    pub fn push_failure(&self, error: &str) {
        self.script.lock().unwrap().push_back(Err(error.to_string()));
    }

    /// Every input the oracle was invoked with.
    pub fn inputs(&self) -> Vec<OracleInput> {
        self.inputs.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    async fn decide(&self, input: &OracleInput) -> Result<Vec<AgentAction>, OracleError> {
        self.inputs.lock().unwrap().push(input.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(actions)) => Ok(actions),
            Some(Err(message)) => Err(OracleError::Call(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Oracle that fails every call, counting attempts.
#[derive(Default)]
pub struct FailingOracle {
    calls: AtomicUsize,
}

impl FailingOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionOracle for FailingOracle {
    async fn decide(&self, _input: &OracleInput) -> Result<Vec<AgentAction>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(OracleError::Call("model unavailable".to_string()))
    }
}
