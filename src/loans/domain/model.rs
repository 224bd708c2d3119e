use chrono::{Duration, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;

// LoanEntity is the local row for one remote loan. It is created before the
// remote checkout succeeds so the notification callback url can carry its id,
// and rolled back if the remote side never grants the loan.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct LoanEntity {
    pub loan_id: String,
    pub version: i64,
    pub pool_id: String,
    pub patron_id: String,
    // weak reference, the license stays owned by its pool
    pub license_id: String,
    // checkout-session id sent to the remote service
    pub checkout_id: String,
    // random per-loan pseudonym, the real patron id never crosses the wire
    pub loan_token: String,
    // canonical remote url from the status document's self link
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

impl LoanEntity {
    pub fn new(pool_id: &str, patron_id: &str, license_id: &str, loan_period: Duration) -> Self {
        Self {
            loan_id: Uuid::new_v4().to_string(),
            version: 0,
            pool_id: pool_id.to_string(),
            patron_id: patron_id.to_string(),
            license_id: license_id.to_string(),
            checkout_id: random_token(),
            loan_token: random_token(),
            external_identifier: None,
            start: Utc::now().naive_utc(),
            end: Utc::now().naive_utc() + loan_period,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        self.end > now
    }
}

pub(crate) fn random_token() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(24).map(char::from).collect()
}

impl Identifiable for LoanEntity {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::loans::domain::model::{random_token, LoanEntity};

    #[tokio::test]
    async fn test_should_build_loan() {
        let loan = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        assert_eq!("pool1", loan.pool_id.as_str());
        assert_eq!("patron1", loan.patron_id.as_str());
        assert_eq!("lic1", loan.license_id.as_str());
        assert_eq!(None, loan.external_identifier);
        assert!(loan.end > loan.start);
    }

    #[tokio::test]
    async fn test_should_mint_distinct_tokens() {
        let loan = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        assert_ne!(loan.checkout_id, loan.loan_token);
        assert_ne!(random_token(), random_token());
        assert_eq!(24, random_token().len());
    }

    #[tokio::test]
    async fn test_should_report_active() {
        let now = Utc::now().naive_utc();
        let mut loan = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        assert!(loan.is_active(now));
        loan.end = now - Duration::hours(1);
        assert!(!loan.is_active(now));
    }
}
