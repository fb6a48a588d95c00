//! Deterministic rule-based oracle.
//!
//! A direct port of the heating policy the model-backed oracle is prompted
//! with, so the two are substitutable. Meeting proximity is judged on the
//! environment-reported simulation clock, never wall-clock.

use async_trait::async_trait;
use chrono::Duration;

use hearth_core::action::AgentAction;
use hearth_core::config::agent::MEETING_WINDOW_MINUTES;
use hearth_core::model::{MessageType, Room};

use crate::{DecisionContext, DecisionOracle, OracleError, OracleInput};

/// Temperature thresholds for the heating policy (°C).
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Below this an occupied room gets heating.
    pub comfort_low: f64,
    /// Upper edge of the band where an occupied room can coast unheated.
    pub comfort_high: f64,
    /// Above this heating is enabled so setpoint control cools the room.
    pub overheat: f64,
    /// An unoccupied room at or above this can have heating turned off.
    pub vacant_off: f64,
    /// Never let any room drop below this (freeze prevention).
    pub frost_guard: f64,
    /// Pre-meeting arming window, in simulation-minutes.
    pub meeting_window_minutes: i64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            comfort_low: 21.0,
            comfort_high: 23.0,
            overheat: 24.0,
            vacant_off: 18.0,
            frost_guard: 17.0,
            meeting_window_minutes: MEETING_WINDOW_MINUTES,
        }
    }
}

/// Rule-based decision oracle.
#[derive(Debug, Default)]
pub struct RuleOracle {
    config: RuleConfig,
}

impl RuleOracle {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Desired heating state for one room, or `None` to keep the current
    /// state.
    fn desired_state(&self, room: &Room, meeting_soon: bool) -> Option<(bool, &'static str)> {
        let temp = room.temperature();
        let occupied = room.people_count > 0;

        if occupied && temp < self.config.comfort_low {
            return Some((true, "occupied and below comfort temperature"));
        }
        if meeting_soon {
            return Some((true, "meeting starting soon"));
        }
        if temp > self.config.overheat {
            return Some((true, "overheated; setpoint control will cool the room"));
        }
        if temp < self.config.frost_guard {
            return Some((true, "freeze prevention"));
        }
        if !occupied && temp >= self.config.vacant_off {
            return Some((false, "unoccupied, saving energy"));
        }
        if occupied && temp >= self.config.comfort_low && temp <= self.config.comfort_high {
            return Some((false, "within comfort band, no control needed"));
        }
        None
    }

    fn evaluate_rooms(&self, input: &OracleInput) -> Vec<AgentAction> {
        let now = input.snapshot.simulation_time;
        let window = Duration::minutes(self.config.meeting_window_minutes);
        let mut actions = Vec::new();

        for room in &input.snapshot.rooms {
            let meeting_soon = room.meeting_within(now, window);
            let Some((desired, reason)) = self.desired_state(room, meeting_soon) else {
                continue;
            };

            // Only propose a change; matching states are left alone.
            if desired == input.room_heating(&room.id) {
                continue;
            }

            let action = if desired {
                AgentAction::EnableHeating {
                    room_id: room.id.clone(),
                    reason: Some(reason.to_string()),
                }
            } else {
                AgentAction::DisableHeating {
                    room_id: room.id.clone(),
                    reason: Some(reason.to_string()),
                }
            };
            actions.push(action);
        }

        actions
    }
}

#[async_trait]
impl DecisionOracle for RuleOracle {
    async fn decide(&self, input: &OracleInput) -> Result<Vec<AgentAction>, OracleError> {
        let mut actions = self.evaluate_rooms(input);

        // A peer query gets a factual reply; other message kinds just
        // trigger the re-evaluation above.
        if let DecisionContext::Message(message) = &input.context {
            if message.kind == MessageType::Query {
                let summary = input
                    .snapshot
                    .rooms
                    .iter()
                    .map(|room| {
                        format!(
                            "{}: {:.1}C, heating {}",
                            room.id,
                            room.temperature(),
                            if input.room_heating(&room.id) { "on" } else { "off" }
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                actions.push(AgentAction::SendMessage {
                    to: message.from.clone(),
                    content: summary,
                    kind: MessageType::Response,
                });
            }
        }

        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::model::{AgentMessage, EnvironmentSnapshot, Meeting, TemperatureSensor};
    use std::collections::HashMap;

    fn room(id: &str, temp: f64, people: u32, meetings: Vec<Meeting>) -> Room {
        Room {
            id: id.to_string(),
            name: id.to_string(),
            temperature_sensor: TemperatureSensor {
                id: format!("temp_{}", id),
                room_id: id.to_string(),
                temperature: temp,
            },
            people_count: people,
            scheduled_meetings: meetings,
        }
    }

    fn input(rooms: Vec<Room>, heating: &[(&str, bool)]) -> OracleInput {
        OracleInput {
            snapshot: EnvironmentSnapshot {
                simulation_time: "2024-03-11T08:45:00".parse().unwrap(),
                rooms,
                external_temperature: 5.0,
                time_speed_multiplier: 1.0,
                power_outage: false,
                daylight_intensity: 1.0,
            },
            heating: heating
                .iter()
                .map(|(id, on)| (id.to_string(), *on))
                .collect::<HashMap<_, _>>(),
            context: DecisionContext::Cycle,
        }
    }

    #[tokio::test]
    async fn test_cold_occupied_room_gets_heating() {
        // room_208 at 19C with 2 occupants and heating off.
        let oracle = RuleOracle::default();
        let input = input(vec![room("room_208", 19.0, 2, vec![])], &[("room_208", false)]);

        let actions = oracle.decide(&input).await.unwrap();
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            AgentAction::EnableHeating { room_id, .. } => assert_eq!(room_id, "room_208"),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rooms_already_at_desired_state_yield_no_actions() {
        let oracle = RuleOracle::default();
        let input = input(
            vec![
                room("room_101", 19.0, 2, vec![]), // wants heat, already on
                room("room_102", 20.0, 0, vec![]), // wants off, already off
            ],
            &[("room_101", true), ("room_102", false)],
        );

        let actions = oracle.decide(&input).await.unwrap();
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn test_meeting_window_uses_simulation_clock() {
        let oracle = RuleOracle::default();
        let meeting = Meeting {
            start_time: "2024-03-11T09:00:00".parse().unwrap(),
            end_time: "2024-03-11T10:00:00".parse().unwrap(),
            title: "Standup".to_string(),
        };

        // Simulation time 08:45, meeting at 09:00: inside the 15-minute
        // window regardless of wall-clock.
        let input = input(
            vec![room("room_208", 22.0, 0, vec![meeting])],
            &[("room_208", false)],
        );
        let actions = oracle.decide(&input).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].heating_target(), Some(("room_208", true)));
    }

    #[tokio::test]
    async fn test_elapsed_meeting_is_ignored() {
        let oracle = RuleOracle::default();
        let meeting = Meeting {
            start_time: "2024-03-11T07:00:00".parse().unwrap(),
            end_time: "2024-03-11T08:00:00".parse().unwrap(),
            title: "Earlier".to_string(),
        };

        // Unoccupied warm room with only an elapsed meeting: heating goes off.
        let input = input(
            vec![room("room_208", 22.0, 0, vec![meeting])],
            &[("room_208", true)],
        );
        let actions = oracle.decide(&input).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].heating_target(), Some(("room_208", false)));
    }

    #[tokio::test]
    async fn test_overheat_enables_setpoint_control() {
        let oracle = RuleOracle::default();
        let input = input(vec![room("room_208", 25.5, 1, vec![])], &[("room_208", false)]);

        let actions = oracle.decide(&input).await.unwrap();
        assert_eq!(actions[0].heating_target(), Some(("room_208", true)));
    }

    #[tokio::test]
    async fn test_frost_guard_in_empty_room() {
        let oracle = RuleOracle::default();
        let input = input(vec![room("cellar", 15.0, 0, vec![])], &[("cellar", false)]);

        let actions = oracle.decide(&input).await.unwrap();
        assert_eq!(actions[0].heating_target(), Some(("cellar", true)));
    }

    #[tokio::test]
    async fn test_query_message_gets_response() {
        let oracle = RuleOracle::default();
        let mut input = input(vec![room("room_208", 22.0, 1, vec![])], &[("room_208", true)]);
        input.context = DecisionContext::Message(AgentMessage {
            id: "m1".to_string(),
            from: "LightAgent".to_string(),
            to: "heating_agent".to_string(),
            kind: MessageType::Query,
            content: "what is the heating status?".to_string(),
            timestamp: "2024-03-11T08:45:00Z".to_string(),
            context: None,
        });

        let actions = oracle.decide(&input).await.unwrap();
        let reply = actions
            .iter()
            .find_map(|a| match a {
                AgentAction::SendMessage { to, kind, content } => Some((to, kind, content)),
                _ => None,
            })
            .expect("expected a response message");
        assert_eq!(reply.0, "LightAgent");
        assert_eq!(*reply.1, MessageType::Response);
        assert!(reply.2.contains("room_208"));
    }
}
