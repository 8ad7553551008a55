//! Prediction publisher - Redis pub/sub
//!
//! Every prediction is announced on the `new_prediction` channel, where the
//! alerting and map services subscribe. Delivery is best-effort.

use std::time::Duration;

use redis::{aio::ConnectionManager, AsyncCommands};
use stmodel_core::{PredictionEvent, PredictionResult};

/// Channel the downstream listeners subscribe to
pub const PREDICTION_CHANNEL: &str = "new_prediction";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Publisher errors
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Clone)]
pub struct PredictionPublisher {
    conn: ConnectionManager,
}

impl PredictionPublisher {
    /// Connect once; the manager reconnects on its own afterwards
    pub async fn connect(redis_url: &str) -> Result<Self, PublishError> {
        let client = redis::Client::open(redis_url)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| PublishError::Timeout(CONNECT_TIMEOUT))??;

        Ok(Self { conn })
    }

    /// Returns the number of subscribers that received the event
    pub async fn publish(&self, event: &PredictionEvent) -> Result<usize, PublishError> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.conn.clone();
        let receivers: usize = conn.publish(PREDICTION_CHANNEL, payload).await?;
        Ok(receivers)
    }
}

/// Announce a prediction; failures are logged, never surfaced.
/// Returns whether the event reached Redis.
pub async fn publish_prediction(
    publisher: Option<&PredictionPublisher>,
    result: &PredictionResult,
) -> bool {
    let Some(publisher) = publisher else {
        tracing::debug!("No Redis configured, prediction {} not published", result.prediction_id);
        return false;
    };

    match publisher.publish(&PredictionEvent::from(result)).await {
        Ok(receivers) => {
            tracing::info!(
                "Prediction {} published on {} ({} subscribers)",
                result.prediction_id,
                PREDICTION_CHANNEL,
                receivers
            );
            true
        }
        Err(e) => {
            tracing::warn!("Failed to publish prediction {}: {}", result.prediction_id, e);
            false
        }
    }
}
