use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::{opt_serializer, serializer};

// LicenseEntity is one unit of borrowing capacity with its own remote
// checkout endpoint, expiration and checkout budget.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct LicenseEntity {
    // opaque remote license id
    pub license_id: String,
    pub checkout_url_template: String,
    pub status_url: Option<String>,
    #[serde(with = "opt_serializer")]
    pub expires: Option<NaiveDateTime>,
    pub concurrent_checkouts: Option<i64>,
    // decremented on every checkout, zero means no further checkouts
    // although existing loans continue
    pub remaining_checkouts: Option<i64>,
}

impl LicenseEntity {
    pub fn new(license_id: &str, checkout_url_template: &str) -> Self {
        Self {
            license_id: license_id.to_string(),
            checkout_url_template: checkout_url_template.to_string(),
            status_url: None,
            expires: None,
            concurrent_checkouts: None,
            remaining_checkouts: None,
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        match self.expires {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    pub fn is_available(&self, now: NaiveDateTime) -> bool {
        !self.is_expired(now) && self.remaining_checkouts.map(|left| left > 0).unwrap_or(true)
    }

    // capacity this license contributes to licenses_owned, one unit unless
    // the import said otherwise
    pub fn owned_contribution(&self) -> i64 {
        self.concurrent_checkouts.unwrap_or(1)
    }
}

// LicensePoolEntity aggregates all licenses for one title in one collection.
// License order is import order and the queue-cycle arithmetic depends on it.
// Counters are recomputed by the scheduler, never hand-edited.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct LicensePoolEntity {
    pub pool_id: String,
    pub version: i64,
    pub collection_id: String,
    pub title_id: String,
    pub licenses: Vec<LicenseEntity>,
    pub licenses_owned: i64,
    pub licenses_available: i64,
    pub licenses_reserved: i64,
    pub patrons_in_hold_queue: i64,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl LicensePoolEntity {
    pub fn new(collection_id: &str, title_id: &str) -> Self {
        Self {
            pool_id: Uuid::new_v4().to_string(),
            version: 0,
            collection_id: collection_id.to_string(),
            title_id: title_id.to_string(),
            licenses: Vec::new(),
            licenses_owned: 0,
            licenses_available: 0,
            licenses_reserved: 0,
            patrons_in_hold_queue: 0,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn add_license(&mut self, license: LicenseEntity) {
        self.licenses.push(license);
    }

    pub fn find_license(&self, license_id: &str) -> Option<&LicenseEntity> {
        self.licenses.iter().find(|license| license.license_id == license_id)
    }

    // first non-expired license with checkouts left, in import order
    pub fn best_available_license(&self, now: NaiveDateTime) -> Option<&LicenseEntity> {
        self.licenses.iter().find(|license| license.is_available(now))
    }

    pub fn consume_license(&mut self, license_id: &str) -> bool {
        match self.licenses.iter_mut().find(|license| license.license_id == license_id) {
            Some(license) => {
                if let Some(left) = license.remaining_checkouts {
                    license.remaining_checkouts = Some(left - 1);
                }
                true
            }
            None => false,
        }
    }
}

impl Identifiable for LicensePoolEntity {
    fn id(&self) -> String {
        self.pool_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
