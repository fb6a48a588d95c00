//! Wire-level data model for the environment service.
//!
//! Field names mirror the simulator's JSON (camelCase). The simulation clock
//! is a timezone-less local date-time and is kept distinct from the
//! wall-clock delivery timestamps on inter-agent messages.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Reserved recipient meaning "deliver to all listening agents".
pub const BROADCAST: &str = "broadcast";

/// One immutable observation of the building, read once per decision cycle.
///
/// Room heating state is NOT embedded here; it is fetched separately per
/// room each cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    pub simulation_time: NaiveDateTime,
    pub rooms: Vec<Room>,
    pub external_temperature: f64,
    #[serde(default = "default_multiplier")]
    pub time_speed_multiplier: f64,
    #[serde(default)]
    pub power_outage: bool,
    #[serde(default = "default_multiplier")]
    pub daylight_intensity: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

/// A room as reported by the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub temperature_sensor: TemperatureSensor,
    #[serde(default)]
    pub people_count: u32,
    #[serde(default)]
    pub scheduled_meetings: Vec<Meeting>,
}

impl Room {
    /// Current temperature in °C.
    pub fn temperature(&self) -> f64 {
        self.temperature_sensor.temperature
    }

    /// Whether any non-elapsed meeting starts within `window` of the
    /// simulation clock `now` (meetings already in progress count).
    pub fn meeting_within(&self, now: NaiveDateTime, window: Duration) -> bool {
        self.scheduled_meetings
            .iter()
            .any(|m| m.upcoming_within(now, window))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSensor {
    pub id: String,
    pub room_id: String,
    pub temperature: f64,
}

/// A scheduled meeting, on the simulation clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default = "default_meeting_title")]
    pub title: String,
}

fn default_meeting_title() -> String {
    "Meeting".to_string()
}

impl Meeting {
    /// A meeting whose end time has passed is no longer decision-relevant.
    pub fn is_elapsed(&self, now: NaiveDateTime) -> bool {
        self.end_time <= now
    }

    /// True when the meeting has not elapsed and starts within `window`
    /// (a meeting already in progress satisfies this).
    pub fn upcoming_within(&self, now: NaiveDateTime, window: Duration) -> bool {
        !self.is_elapsed(now) && self.start_time <= now + window
    }
}

/// Inter-agent message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Request,
    Inform,
    Query,
    Response,
}

impl MessageType {
    /// Parse a loosely typed string from an oracle, defaulting to INFORM.
    pub fn parse_or_inform(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "REQUEST" => Self::Request,
            "QUERY" => Self::Query,
            "RESPONSE" => Self::Response,
            _ => Self::Inform,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Inform => "INFORM",
            Self::Query => "QUERY",
            Self::Response => "RESPONSE",
        }
    }
}

/// A delivered inter-agent message. Created by the sender; the transport
/// assigns `id` and `timestamp` and is the only mutator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    /// Wall-clock delivery timestamp, kept as the raw wire string so it can
    /// be echoed back verbatim as the incremental-fetch cursor.
    pub timestamp: String,
    #[serde(default)]
    pub context: Option<HashMap<String, String>>,
}

impl AgentMessage {
    /// Pure recipient predicate: addressed to this agent or to broadcast.
    pub fn is_addressed_to(&self, agent_id: &str) -> bool {
        self.to == agent_id || self.to == BROADCAST
    }

    /// Delivery timestamp parsed to a comparable instant, if possible.
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Outbound message request; the transport fills in id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessageRequest {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    #[serde(default)]
    pub context: Option<HashMap<String, String>>,
}

/// Generic mutation response from the environment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse a delivery timestamp. Accepts RFC 3339 with offset, or a naive
/// local date-time which is taken as UTC (the simulator runs with zero
/// offset).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_snapshot_deserializes_simulator_json() {
        let json = r#"{
            "simulationTime": "2024-03-11T08:45:00",
            "externalTemperature": 5.0,
            "powerOutage": false,
            "rooms": [{
                "id": "room_208",
                "name": "Conference 208",
                "temperatureSensor": {"id": "temp_208", "roomId": "room_208", "temperature": 19.0},
                "peopleCount": 2,
                "scheduledMeetings": [
                    {"startTime": "2024-03-11T09:00:00", "endTime": "2024-03-11T10:00:00", "title": "Standup"}
                ]
            }]
        }"#;

        let snapshot: EnvironmentSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.external_temperature, 5.0);
        assert!(!snapshot.power_outage);
        assert_eq!(snapshot.time_speed_multiplier, 1.0);

        let room = &snapshot.rooms[0];
        assert_eq!(room.id, "room_208");
        assert_eq!(room.temperature(), 19.0);
        assert_eq!(room.people_count, 2);
        assert_eq!(room.scheduled_meetings[0].title, "Standup");
    }

    #[test]
    fn test_meeting_elapsed_and_window() {
        let meeting = Meeting {
            start_time: ts("2024-03-11T09:00:00"),
            end_time: ts("2024-03-11T10:00:00"),
            title: "Standup".to_string(),
        };

        // Ends at 10:00 -> elapsed at and after 10:00.
        assert!(!meeting.is_elapsed(ts("2024-03-11T09:59:59")));
        assert!(meeting.is_elapsed(ts("2024-03-11T10:00:00")));

        // 15-minute pre-meeting window on the simulation clock.
        let window = Duration::minutes(15);
        assert!(!meeting.upcoming_within(ts("2024-03-11T08:30:00"), window));
        assert!(meeting.upcoming_within(ts("2024-03-11T08:45:00"), window));
        // In progress still counts.
        assert!(meeting.upcoming_within(ts("2024-03-11T09:30:00"), window));
        // Elapsed never counts, no matter the window.
        assert!(!meeting.upcoming_within(ts("2024-03-11T11:00:00"), window));
    }

    #[test]
    fn test_message_recipient_predicate() {
        let mut msg = AgentMessage {
            id: "m1".to_string(),
            from: "LightAgent".to_string(),
            to: "heating_agent".to_string(),
            kind: MessageType::Inform,
            content: "lights off in 208".to_string(),
            timestamp: "2024-03-11T08:45:00Z".to_string(),
            context: None,
        };
        assert!(msg.is_addressed_to("heating_agent"));
        assert!(!msg.is_addressed_to("printer_agent"));

        msg.to = BROADCAST.to_string();
        assert!(msg.is_addressed_to("heating_agent"));
        assert!(msg.is_addressed_to("printer_agent"));

        msg.to = "other_agent".to_string();
        assert!(!msg.is_addressed_to("heating_agent"));
    }

    #[test]
    fn test_message_type_wire_format() {
        let json = r#"{"id":"m1","from":"a","to":"b","type":"REQUEST","content":"x","timestamp":"2024-03-11T08:45:00Z"}"#;
        let msg: AgentMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageType::Request);

        let out = serde_json::to_string(&msg).unwrap();
        assert!(out.contains(r#""type":"REQUEST""#));
    }

    #[test]
    fn test_message_type_parse_or_inform() {
        assert_eq!(MessageType::parse_or_inform("request"), MessageType::Request);
        assert_eq!(MessageType::parse_or_inform("QUERY"), MessageType::Query);
        assert_eq!(MessageType::parse_or_inform("nonsense"), MessageType::Inform);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let a = parse_timestamp("2024-03-11T08:45:00Z").unwrap();
        let b = parse_timestamp("2024-03-11T08:45:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("not a time").is_none());
    }
}
