//! Client analytics events.
//!
//! Events are validated, timestamped and handed to an [`AnalyticsSink`].
//! The default sink only logs and counts; nothing is stored.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::ServiceError;

pub const MAX_EVENT_NAME_LENGTH: usize = 100;

/// Event as posted by a client; `timestamp` is epoch milliseconds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedEvent {
    pub name: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<String>,
    pub user_id: String,
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &RecordedEvent) -> Result<(), ServiceError>;
}

/// Logs each event at `info` and bumps the Prometheus counter.
pub struct TracingSink;

#[async_trait]
impl AnalyticsSink for TracingSink {
    async fn record(&self, event: &RecordedEvent) -> Result<(), ServiceError> {
        common::metrics::ANALYTICS_EVENTS_TOTAL.inc();
        info!(
            event = %event.name,
            user_id = %event.user_id,
            session_id = event.session_id.as_deref().unwrap_or("-"),
            at = %event.timestamp.to_rfc3339(),
            data = %event.data,
            "analytics_event"
        );
        Ok(())
    }
}

/// Keeps events in memory; used by tests.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemorySink {
    pub async fn events(&self) -> Vec<RecordedEvent> { self.events.lock().await.clone() }
}

#[async_trait]
impl AnalyticsSink for MemorySink {
    async fn record(&self, event: &RecordedEvent) -> Result<(), ServiceError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsService {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self { Self { sink } }

    pub async fn track(&self, user_id: &str, event: AnalyticsEvent) -> Result<RecordedEvent, ServiceError> {
        let name = event.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("event name is required".into()));
        }
        if name.chars().count() > MAX_EVENT_NAME_LENGTH {
            return Err(ServiceError::Validation(format!(
                "event name must be at most {} characters",
                MAX_EVENT_NAME_LENGTH
            )));
        }
        let timestamp = match event.timestamp {
            Some(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| ServiceError::Validation("timestamp out of range".into()))?,
            None => Utc::now(),
        };
        let recorded = RecordedEvent {
            name: name.to_string(),
            data: event.data,
            timestamp,
            session_id: event.session_id.filter(|s| !s.is_empty()),
            user_id: user_id.to_string(),
        };
        self.sink.record(&recorded).await?;
        Ok(recorded)
    }
}

impl Default for AnalyticsService {
    fn default() -> Self { Self::new(Arc::new(TracingSink)) }
}
