//! Configuration defaults and environment-variable helpers.
//!
//! Every tunable the agent reads lives here so the defaults are defined in
//! exactly one place and the CLI, tests and library code agree on them.

/// Default endpoint constants.
pub mod endpoints {
    pub const SIMULATOR: &str = "http://localhost:8080";
    pub const OLLAMA: &str = "http://localhost:11434";
}

/// Default model constants.
pub mod models {
    pub const OLLAMA_DEFAULT: &str = "qwen3:4b";
}

/// Agent scheduling constants.
pub mod agent {
    /// Identity under which the agent polls its mailbox.
    pub const DEFAULT_AGENT_ID: &str = "heating_agent";
    /// Minimum spacing between two decision cycles.
    pub const DECISION_INTERVAL_SECS: u64 = 10;
    /// Mailbox poll interval.
    pub const MESSAGE_INTERVAL_SECS: u64 = 3;
    /// Decision-loop wake-up tick.
    pub const TICK_INTERVAL_SECS: u64 = 2;
    /// Sleep after an unexpected loop error before resuming the cadence.
    pub const ERROR_BACKOFF_SECS: u64 = 5;
    /// Heating is pre-armed this many simulation-minutes before a meeting.
    pub const MEETING_WINDOW_MINUTES: i64 = 15;
}

/// HTTP client constants.
pub mod http {
    /// Request timeout, sized to tolerate a slow oracle elsewhere in the
    /// pipeline (the simulator may itself be waiting on one).
    pub const REQUEST_TIMEOUT_SECS: u64 = 180;
    /// Connection establishment timeout.
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// Environment variable names.
pub mod env_vars {
    pub const SIMULATOR_URL: &str = "HEARTH_SIMULATOR_URL";
    pub const AGENT_ID: &str = "HEARTH_AGENT_ID";
    pub const DECISION_INTERVAL_SECS: &str = "HEARTH_DECISION_INTERVAL_SECS";
    pub const MESSAGE_INTERVAL_SECS: &str = "HEARTH_MESSAGE_INTERVAL_SECS";
    pub const OLLAMA_ENDPOINT: &str = "HEARTH_OLLAMA_ENDPOINT";
    pub const OLLAMA_MODEL: &str = "HEARTH_OLLAMA_MODEL";

    /// Simulator base URL from the environment, or the default.
    pub fn simulator_url() -> String {
        std::env::var(SIMULATOR_URL).unwrap_or_else(|_| super::endpoints::SIMULATOR.to_string())
    }

    /// Agent id from the environment, or the default.
    pub fn agent_id() -> String {
        std::env::var(AGENT_ID).unwrap_or_else(|_| super::agent::DEFAULT_AGENT_ID.to_string())
    }

    /// Decision interval in seconds from the environment, or the default.
    pub fn decision_interval_secs() -> u64 {
        parse_or(DECISION_INTERVAL_SECS, super::agent::DECISION_INTERVAL_SECS)
    }

    /// Message poll interval in seconds from the environment, or the default.
    pub fn message_interval_secs() -> u64 {
        parse_or(MESSAGE_INTERVAL_SECS, super::agent::MESSAGE_INTERVAL_SECS)
    }

    /// Ollama endpoint from the environment, or the default.
    pub fn ollama_endpoint() -> String {
        std::env::var(OLLAMA_ENDPOINT).unwrap_or_else(|_| super::endpoints::OLLAMA.to_string())
    }

    /// Ollama model from the environment, or the default.
    pub fn ollama_model() -> String {
        std::env::var(OLLAMA_MODEL).unwrap_or_else(|_| super::models::OLLAMA_DEFAULT.to_string())
    }

    fn parse_or(var: &str, default: u64) -> u64 {
        std::env::var(var)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
