use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// LoanDto abstracts one granted loan of a licensed copy
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct LoanDto {
    pub loan_id: String,
    pub version: i64,
    pub pool_id: String,
    pub patron_id: String,
    pub license_id: String,
    pub external_identifier: Option<String>,
    #[serde(with = "serializer")]
    pub start: NaiveDateTime,
    #[serde(with = "serializer")]
    pub end: NaiveDateTime,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl Identifiable for LoanDto {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
