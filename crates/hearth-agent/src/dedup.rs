//! Message deduplication tracker.
//!
//! Guarantees each mailbox message reaches the oracle at most once per
//! runtime lifetime, in delivery-timestamp order, across repeated polls of
//! a transport that may re-deliver.

use chrono::{DateTime, Utc};

use hearth_core::model::AgentMessage;

/// The dedup cursor: the maximum delivery timestamp already processed.
///
/// The raw wire string is kept alongside the parsed instant so the
/// incremental endpoint receives the timestamp exactly as the transport
/// produced it, while ordering never relies on lexicographic comparison.
#[derive(Debug, Clone)]
struct Cursor {
    raw: String,
    instant: DateTime<Utc>,
}

/// Tracks the last-seen message timestamp across polls.
#[derive(Debug, Default)]
pub struct MessageTracker {
    cursor: Option<Cursor>,
}

impl MessageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cursor string for the incremental fetch, or `None` on cold start
    /// (meaning: fetch the full history).
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_ref().map(|c| c.raw.as_str())
    }

    /// Ingest one polled batch. Returns the messages not seen before, in
    /// delivery-timestamp order, and advances the cursor to the maximum
    /// timestamp of the batch.
    ///
    /// Two messages sharing a timestamp are both delivered; only messages
    /// at or before the previous cursor are dropped (re-delivery). A message
    /// whose timestamp cannot be parsed is delivered last and never
    /// advances the cursor.
    pub fn ingest(&mut self, batch: Vec<AgentMessage>) -> Vec<AgentMessage> {
        if batch.is_empty() {
            return Vec::new();
        }

        // The server is not trusted to order the batch.
        let mut parsed: Vec<(Option<DateTime<Utc>>, AgentMessage)> = batch
            .into_iter()
            .map(|message| (message.delivered_at(), message))
            .collect();
        parsed.sort_by_key(|(instant, _)| instant.unwrap_or(DateTime::<Utc>::MAX_UTC));

        let floor = self.cursor.as_ref().map(|c| c.instant);
        let mut delivered = Vec::new();
        let mut max_seen: Option<(DateTime<Utc>, String)> = None;

        for (instant, message) in parsed {
            match instant {
                Some(instant) => {
                    if floor.is_some_and(|f| instant <= f) {
                        tracing::debug!(id = %message.id, "dropping re-delivered message");
                        continue;
                    }
                    if max_seen.as_ref().is_none_or(|(max, _)| instant > *max) {
                        max_seen = Some((instant, message.timestamp.clone()));
                    }
                    delivered.push(message);
                }
                None => {
                    tracing::warn!(
                        id = %message.id,
                        timestamp = %message.timestamp,
                        "message has unparseable timestamp, delivering without dedup"
                    );
                    delivered.push(message);
                }
            }
        }

        if let Some((instant, raw)) = max_seen {
            self.cursor = Some(Cursor { raw, instant });
        }

        delivered
    }
}
