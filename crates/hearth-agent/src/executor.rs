//! Action executor: commits oracle decisions to the environment.

use std::collections::HashMap;
use std::sync::Arc;

use hearth_client::EnvironmentApi;
use hearth_core::action::AgentAction;
use hearth_core::model::AgentMessageRequest;

/// Outcome of applying one decision's actions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Actions committed to the environment.
    pub applied: usize,
    /// Heating actions skipped because the room was already in the desired
    /// state.
    pub suppressed: usize,
    /// Actions the environment rejected or that failed in transit.
    pub failed: usize,
}

/// Applies proposed actions, suppressing no-ops.
///
/// Each action is independent: one failure never blocks the remaining
/// actions of the same decision output.
pub struct ActionExecutor {
    env: Arc<dyn EnvironmentApi>,
    agent_id: String,
}

impl ActionExecutor {
    pub fn new(env: Arc<dyn EnvironmentApi>, agent_id: impl Into<String>) -> Self {
        Self {
            env,
            agent_id: agent_id.into(),
        }
    }

    /// Apply actions against the environment. `heating` is the per-room
    /// state fetched earlier in the same cycle; a heating action matching it
    /// is suppressed rather than re-sent.
    pub async fn apply(
        &self,
        actions: &[AgentAction],
        heating: &HashMap<String, bool>,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for action in actions {
            match action {
                AgentAction::EnableHeating { .. } | AgentAction::DisableHeating { .. } => {
                    // heating_target is Some for both variants.
                    let Some((room_id, desired)) = action.heating_target() else {
                        continue;
                    };
                    if heating.get(room_id).copied() == Some(desired) {
                        tracing::debug!(room_id = %room_id, desired, "room already in desired state, suppressing");
                        report.suppressed += 1;
                        continue;
                    }
                    if self.env.set_room_heating(room_id, desired).await {
                        tracing::info!(action = %action.describe(), "action applied");
                        report.applied += 1;
                    } else {
                        tracing::warn!(action = %action.describe(), "action rejected by environment");
                        report.failed += 1;
                    }
                }
                AgentAction::SendMessage { to, content, kind } => {
                    let request = AgentMessageRequest {
                        from: self.agent_id.clone(),
                        to: to.clone(),
                        kind: *kind,
                        content: content.clone(),
                        context: None,
                    };
                    if self.env.send_message(&request).await {
                        tracing::info!(to = %to, kind = %kind.as_str(), "message sent");
                        report.applied += 1;
                    } else {
                        tracing::warn!(to = %to, "failed to send message");
                        report.failed += 1;
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEnvironment;
    use hearth_core::model::MessageType;

    fn enable(room_id: &str) -> AgentAction {
        AgentAction::EnableHeating {
            room_id: room_id.to_string(),
            reason: None,
        }
    }

    fn disable(room_id: &str) -> AgentAction {
        AgentAction::DisableHeating {
            room_id: room_id.to_string(),
            reason: None,
        }
    }

    #[tokio::test]
    async fn test_noop_heating_actions_are_suppressed() {
        let env = Arc::new(MockEnvironment::new());
        let executor = ActionExecutor::new(env.clone(), "heating_agent");
        let heating = HashMap::from([
            ("room_1".to_string(), true),
            ("room_2".to_string(), false),
        ]);

        let report = executor
            .apply(&[enable("room_1"), disable("room_2")], &heating)
            .await;

        assert_eq!(report.suppressed, 2);
        assert_eq!(report.applied, 0);
        assert!(env.heating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_state_change_is_committed() {
        let env = Arc::new(MockEnvironment::new());
        let executor = ActionExecutor::new(env.clone(), "heating_agent");
        let heating = HashMap::from([("room_208".to_string(), false)]);

        let report = executor.apply(&[enable("room_208")], &heating).await;

        assert_eq!(report.applied, 1);
        assert_eq!(env.heating_calls(), vec![("room_208".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_unknown_room_state_is_not_suppressed() {
        // When the per-room lookup failed earlier in the cycle, the call is
        // issued rather than guessed away.
        let env = Arc::new(MockEnvironment::new());
        let executor = ActionExecutor::new(env.clone(), "heating_agent");

        let report = executor.apply(&[enable("room_208")], &HashMap::new()).await;

        assert_eq!(report.applied, 1);
        assert_eq!(env.heating_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_siblings() {
        let env = Arc::new(MockEnvironment::new());
        env.fail_room("room_missing");
        let executor = ActionExecutor::new(env.clone(), "heating_agent");

        let report = executor
            .apply(
                &[enable("room_missing"), enable("room_208")],
                &HashMap::new(),
            )
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.applied, 1);
        // Both calls were attempted, in order.
        assert_eq!(
            env.heating_calls(),
            vec![
                ("room_missing".to_string(), true),
                ("room_208".to_string(), true)
            ]
        );
    }

    #[tokio::test]
    async fn test_send_message_fills_sender() {
        let env = Arc::new(MockEnvironment::new());
        let executor = ActionExecutor::new(env.clone(), "heating_agent");

        let action = AgentAction::SendMessage {
            to: "LightAgent".to_string(),
            content: "heating enabled in 208".to_string(),
            kind: MessageType::Inform,
        };
        let report = executor.apply(&[action], &HashMap::new()).await;

        assert_eq!(report.applied, 1);
        let sent = env.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "heating_agent");
        assert_eq!(sent[0].to, "LightAgent");
    }
}
