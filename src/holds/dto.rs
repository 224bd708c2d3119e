use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::{opt_serializer, serializer};

// HoldDto abstracts a patron's place in line for a pool
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct HoldDto {
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

impl Identifiable for HoldDto {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
