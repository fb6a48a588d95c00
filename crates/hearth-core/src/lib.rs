//! Core types for the hearth heating agent.
//!
//! This crate defines the environment data model, the typed actions an
//! oracle can propose, the unified error type, and configuration defaults
//! shared across the workspace.

pub mod action;
pub mod config;
pub mod error;
pub mod model;

pub use action::AgentAction;
pub use error::{Error, Result};
pub use model::{
    AgentMessage, AgentMessageRequest, ApiResponse, EnvironmentSnapshot, Meeting, MessageType,
    Room, TemperatureSensor, BROADCAST,
};
