//! Domain event publishing.

use crate::domain::events::DomainEvent;

/// Logs every event and forwards it to NATS when connected.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn disabled() -> Self {
        Self { nats: None }
    }

    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        let client = async_nats::connect(url).await?;
        tracing::info!(url, "Connected to NATS");
        Ok(Self { nats: Some(client) })
    }

    pub fn is_connected(&self) -> bool {
        self.nats.is_some()
    }

    /// Delivery is best effort; failures are logged, never returned.
    pub async fn publish(&self, event: impl Into<DomainEvent>) {
        let event = event.into();
        let subject = event.subject();
        tracing::info!(%subject, ?event, "domain event");

        let Some(client) = &self.nats else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%subject, error = %e, "Failed to encode event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            tracing::warn!(%subject, error = %e, "Failed to publish event");
        }
    }
}
