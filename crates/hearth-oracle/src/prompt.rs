//! Prompt rendering for the model-backed oracle.
//!
//! Marshals the observable state into the text contract the model is
//! prompted with. The wording matters less than the information content:
//! every decision-relevant fact (simulation clock, external temperature,
//! per-room temperature/heating/occupancy/meetings) must appear.

use crate::OracleInput;
use hearth_core::model::AgentMessage;

/// System instruction for the periodic decision cycle.
pub const SYSTEM_PROMPT: &str = "\
You are the heating agent in a smart office building. You manage per-room heating.

IMPORTANT: You must use the available tools to act. Your text reply is ignored; only tool calls matter.

Available tools:
- turn_on_heating(roomId, reason): enable heating for a specific room
- turn_off_heating(roomId, reason): disable heating for a specific room
- send_message(to_agent, message, type): send a natural-language message to another agent

How the heating system works:
- When heating is ON for a room, the system regulates toward a 22C setpoint: it heats below 22C and cools above 22C.
- When heating is OFF, the room temperature drifts toward the external temperature.

Policy:
1. Turn heating on when a room is below 21C and occupied.
2. Turn heating on 15 minutes before a scheduled meeting in that room.
3. Turn heating on when a room is above 24C (setpoint control will cool it to 22C).
4. Turn heating off when the temperature is near 22C and no control is needed.
5. Turn heating off when a room is at or above 18C and unoccupied (save energy).
6. Keep every room at a minimum of 17C even when empty (freeze prevention).

Peer agents you can message: WindowBlindsAgent (blinds), LightAgent (lights), PrinterAgent (printers).

REMEMBER: always act through tool calls, never through plain text.";

/// System instruction when reacting to a peer message.
pub const MESSAGE_SYSTEM_PROMPT: &str = "\
You are the heating agent. You received a natural-language message from another agent.

IMPORTANT: You must use the available tools to act. Your text reply is ignored; only tool calls matter.

Available tools:
- turn_on_heating(roomId, reason): enable heating for a specific room
- turn_off_heating(roomId, reason): disable heating for a specific room
- send_message(to_agent, message, type): reply to another agent

Analyze the message and decide whether to react. If so, call the appropriate tools.";

/// Render the per-cycle state prompt.
pub fn decision_prompt(input: &OracleInput) -> String {
    let snapshot = &input.snapshot;
    let mut out = String::new();

    out.push_str("Current environment state:\n");
    out.push_str(&format!("- Simulation time: {}\n", snapshot.simulation_time));
    out.push_str(&format!(
        "- External temperature: {}C\n",
        snapshot.external_temperature
    ));
    out.push_str(&format!(
        "- Power outage: {}\n\n",
        if snapshot.power_outage { "YES" } else { "NO" }
    ));

    out.push_str("Rooms:\n");
    for room in &snapshot.rooms {
        out.push_str(&room_lines(room, input));
        out.push('\n');
    }

    out.push_str(
        "\nFor each room decide whether to turn heating on, turn it off, \
         message another agent, or do nothing. Use tool calls only.",
    );
    out
}

/// Render the prompt for reacting to one inbound message.
pub fn message_prompt(message: &AgentMessage, input: &OracleInput) -> String {
    let snapshot = &input.snapshot;
    let mut out = String::new();

    out.push_str("Received message:\n");
    out.push_str(&format!("From: {}\n", message.from));
    out.push_str(&format!("Type: {}\n", message.kind.as_str()));
    out.push_str(&format!("Content: \"{}\"\n", message.content));
    if let Some(context) = &message.context {
        let pairs = context
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("Context: {}\n", pairs));
    }

    out.push_str("\nCurrent state:\n");
    out.push_str(&format!("- Simulation time: {}\n", snapshot.simulation_time));
    out.push_str(&format!(
        "- External temperature: {}C\n",
        snapshot.external_temperature
    ));
    out.push_str("Rooms:\n");
    for room in &snapshot.rooms {
        out.push_str(&room_lines(room, input));
    }

    out.push_str("\nDecide whether and how to react to this message.");
    out
}

fn room_lines(room: &hearth_core::model::Room, input: &OracleInput) -> String {
    let heating = if input.room_heating(&room.id) {
        "ON (regulating toward 22C, may heat or cool)"
    } else {
        "OFF"
    };
    let meetings = if room.scheduled_meetings.is_empty() {
        "none".to_string()
    } else {
        room.scheduled_meetings
            .iter()
            .map(|m| format!("{} ({} - {})", m.title, m.start_time, m.end_time))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Room {} ({}):\n- Temperature: {}C\n- Heating: {}\n- People: {}\n- Meetings: {}\n",
        room.name,
        room.id,
        room.temperature(),
        heating,
        room.people_count,
        meetings
    )
}
