//! HTTP implementation of the environment client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use hearth_core::config::http as http_defaults;
use hearth_core::model::{AgentMessage, AgentMessageRequest, ApiResponse, EnvironmentSnapshot};

use crate::api::EnvironmentApi;

/// Errors from the fallible inner layer. These never escape the
/// [`EnvironmentApi`] surface; they exist so the degradation point has one
/// place to log the underlying cause.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Result type for the inner client layer.
type ClientResult<T> = Result<T, ClientError>;

/// Connection settings for the simulator.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Simulator base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Per-request timeout. Generous: the simulator may itself be waiting
    /// on a slow oracle elsewhere in the pipeline.
    pub request_timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            request_timeout: Duration::from_secs(http_defaults::REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(http_defaults::CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(hearth_core::config::endpoints::SIMULATOR)
    }
}

/// Environment client over the simulator's REST API.
pub struct HttpEnvironmentClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl HttpEnvironmentClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.config.base_url,
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ClientResult<T> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn post_json<B: serde::Serialize>(&self, url: &str, body: &B) -> ClientResult<ApiResponse> {
        let response = self.http_client.post(url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl EnvironmentApi for HttpEnvironmentClient {
    async fn fetch_snapshot(&self) -> Option<EnvironmentSnapshot> {
        let url = self.api_url("environment/state");
        match self.get_json::<EnvironmentSnapshot>(&url).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch environment snapshot");
                None
            }
        }
    }

    async fn fetch_room_heating(&self, room_id: &str) -> Option<bool> {
        let url = self.api_url(&format!("environment/heating/{}", room_id));
        match self.get_json::<HashMap<String, bool>>(&url).await {
            Ok(body) => body.get("isHeating").copied(),
            Err(e) => {
                tracing::warn!(room_id = %room_id, error = %e, "failed to fetch room heating state");
                None
            }
        }
    }

    async fn set_room_heating(&self, room_id: &str, desired: bool) -> bool {
        let url = self.api_url(&format!("environment/heating/{}/control", room_id));
        let body = serde_json::json!({ "isHeating": desired });
        match self.post_json(&url, &body).await {
            Ok(response) => response.success,
            Err(e) => {
                tracing::warn!(room_id = %room_id, desired, error = %e, "failed to set room heating state");
                false
            }
        }
    }

    async fn fetch_messages(&self, agent_id: &str) -> Vec<AgentMessage> {
        let url = self.api_url(&format!("environment/agents/messages/{}", agent_id));
        match self.get_json::<Vec<AgentMessage>>(&url).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(agent_id = %agent_id, error = %e, "failed to fetch messages");
                Vec::new()
            }
        }
    }

    async fn fetch_new_messages(&self, agent_id: &str, after: Option<&str>) -> Vec<AgentMessage> {
        let url = self.api_url(&format!("environment/agents/messages/{}/new", agent_id));
        let mut request = self.http_client.get(&url);
        if let Some(cursor) = after {
            request = request.query(&[("after", cursor)]);
        }

        let result: ClientResult<Vec<AgentMessage>> = async {
            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(ClientError::Status(response.status()));
            }
            Ok(response.json().await?)
        }
        .await;

        match result {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(agent_id = %agent_id, error = %e, "failed to fetch new messages");
                Vec::new()
            }
        }
    }

    async fn send_message(&self, request: &AgentMessageRequest) -> bool {
        let url = self.api_url("environment/agents/messages");
        match self.post_json(&url, request).await {
            Ok(response) => response.success,
            Err(e) => {
                tracing::warn!(to = %request.to, error = %e, "failed to send message");
                false
            }
        }
    }
}
