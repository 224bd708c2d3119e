use std::collections::HashMap;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::date::serializer;

// DomainEventType defines type of event for domain changes
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum DomainEventType {
    Added,
    Updated,
    Deleted,
}

// DomainEvent abstracts circulation lifecycle changes (loan granted, hold
// queued, hold expired) for downstream consumers
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct DomainEvent {
    pub event_id: String,
    pub name: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub kind: DomainEventType,
    pub metadata: HashMap<String, String>,
    pub json_data: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl DomainEvent {
    pub fn added<T: Serialize>(name: &str, entity_kind: &str, entity_id: &str,
                               metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, entity_kind, entity_id, DomainEventType::Added, metadata, json))
    }

    pub fn updated<T: Serialize>(name: &str, entity_kind: &str, entity_id: &str,
                                 metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, entity_kind, entity_id, DomainEventType::Updated, metadata, json))
    }

    pub fn deleted<T: Serialize>(name: &str, entity_kind: &str, entity_id: &str,
                                 metadata: &HashMap<String, String>, data: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(Self::build(name, entity_kind, entity_id, DomainEventType::Deleted, metadata, json))
    }

    fn build(name: &str, entity_kind: &str, entity_id: &str, kind: DomainEventType,
             metadata: &HashMap<String, String>, json: String) -> DomainEvent {
        DomainEvent {
            event_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            entity_kind: entity_kind.to_string(),
            entity_id: entity_id.to_string(),
            kind,
            metadata: metadata.clone(),
            json_data: json,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, DomainEventType};

    #[tokio::test]
    async fn test_should_build_added() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::added("loan_granted", "loan", "loan1", &HashMap::new(), &data).expect("build event");
        assert_eq!("loan_granted", event.name.as_str());
        assert_eq!("loan1", event.entity_id.as_str());
        assert_eq!(DomainEventType::Added, event.kind);
    }

    #[tokio::test]
    async fn test_should_build_updated() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::updated("hold_moved", "hold", "hold1", &HashMap::new(), &data).expect("build event");
        assert_eq!("hold_moved", event.name.as_str());
        assert_eq!("hold1", event.entity_id.as_str());
        assert_eq!(DomainEventType::Updated, event.kind);
    }

    #[tokio::test]
    async fn test_should_build_deleted() {
        let data = HashMap::from([("a", 1), ("b", 2)]);
        let event = DomainEvent::deleted("hold_expired", "hold", "hold1", &HashMap::new(), &data).expect("build event");
        assert_eq!("hold_expired", event.name.as_str());
        assert_eq!("hold1", event.entity_id.as_str());
        assert_eq!(DomainEventType::Deleted, event.kind);
    }
}
