use async_trait::async_trait;
use tracing::info;
use crate::core::circulation::CirculationError;
use crate::core::events::DomainEvent;
use crate::gateway::events::EventPublisher;

// Publishes domain events to the structured log stream. The surrounding
// system tails these for audit and cache invalidation.
#[derive(Debug)]
pub(crate) struct LogPublisher {}

impl LogPublisher {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), CirculationError> {
        info!(event_id = event.event_id.as_str(),
              name = event.name.as_str(),
              entity_kind = event.entity_kind.as_str(),
              entity_id = event.entity_id.as_str(),
              data = event.json_data.as_str(),
              "domain event");
        Ok(())
    }
}
