//! Typed actions a decision oracle can propose.

use crate::model::MessageType;

/// One proposed action. A decision yields zero or more of these; zero is a
/// valid "do nothing" outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    /// Turn heating on for a room (the system then regulates toward its
    /// setpoint, heating or cooling as needed).
    EnableHeating {
        room_id: String,
        reason: Option<String>,
    },
    /// Turn heating off for a room.
    DisableHeating {
        room_id: String,
        reason: Option<String>,
    },
    /// Send a natural-language message to a peer agent (or broadcast).
    SendMessage {
        to: String,
        content: String,
        kind: MessageType,
    },
}

impl AgentAction {
    /// The `(room_id, desired)` pair for heating actions, None for messages.
    pub fn heating_target(&self) -> Option<(&str, bool)> {
        match self {
            Self::EnableHeating { room_id, .. } => Some((room_id, true)),
            Self::DisableHeating { room_id, .. } => Some((room_id, false)),
            Self::SendMessage { .. } => None,
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::EnableHeating { room_id, reason } => format!(
                "enable heating for {} ({})",
                room_id,
                reason.as_deref().unwrap_or("no reason given")
            ),
            Self::DisableHeating { room_id, reason } => format!(
                "disable heating for {} ({})",
                room_id,
                reason.as_deref().unwrap_or("no reason given")
            ),
            Self::SendMessage { to, kind, .. } => {
                format!("send {} message to {}", kind.as_str(), to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heating_target() {
        let on = AgentAction::EnableHeating {
            room_id: "room_208".to_string(),
            reason: None,
        };
        assert_eq!(on.heating_target(), Some(("room_208", true)));

        let msg = AgentAction::SendMessage {
            to: "LightAgent".to_string(),
            content: "hi".to_string(),
            kind: MessageType::Inform,
        };
        assert_eq!(msg.heating_target(), None);
    }
}
