use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::{opt_serializer, serializer};

// HoldEntity is a patron's place in line for a pool with no available copy.
// Position 0 means a copy is reserved for this patron and `end` is the
// reservation deadline, otherwise `end` is the worst-case delivery estimate.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct HoldEntity {
    pub hold_id: String,
    pub version: i64,
    pub pool_id: String,
    pub patron_id: String,
    pub position: i64,
    #[serde(with = "serializer")]
    pub start: NaiveDateTime,
    #[serde(with = "opt_serializer")]
    pub end: Option<NaiveDateTime>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl HoldEntity {
    pub fn new(pool_id: &str, patron_id: &str, position: i64) -> Self {
        Self {
            hold_id: Uuid::new_v4().to_string(),
            version: 0,
            pool_id: pool_id.to_string(),
            patron_id: patron_id.to_string(),
            position,
            start: Utc::now().naive_utc(),
            end: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    // still queued, or holding an unexpired reservation
    pub fn is_live(&self, now: NaiveDateTime) -> bool {
        self.position > 0 || self.end.map(|end| end > now).unwrap_or(true)
    }

    // reservation ran out without the patron checking out
    pub fn is_expired_reservation(&self, now: NaiveDateTime) -> bool {
        self.position == 0 && self.end.map(|end| end < now).unwrap_or(false)
    }

    // a position-0 hold with time left entitles the patron to check out even
    // when the availability counter reads zero
    pub fn is_ready(&self, now: NaiveDateTime) -> bool {
        self.position == 0 && self.end.map(|end| end >= now).unwrap_or(true)
    }
}

impl Identifiable for HoldEntity {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
