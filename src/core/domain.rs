use chrono::Duration;
use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}


// Configuration abstracts config options for the circulation system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    // library short name, embedded in the notification callback url
    pub library_id: String,
    pub loan_period_days: i64,
    pub reservation_period_days: i64,
    // base url of this system, the remote distributor calls back into it
    pub notification_base_url: String,
    pub remote_auth_token: Option<String>,
    pub remote_timeout_secs: u64,
    pub reaper_interval_secs: u64,
}

impl Configuration {
    pub fn new(library_id: &str) -> Self {
        Configuration {
            library_id: library_id.to_string(),
            loan_period_days: 21,
            reservation_period_days: 3,
            notification_base_url: "http://localhost:8080".to_string(),
            remote_auth_token: None,
            remote_timeout_secs: 30,
            reaper_interval_secs: 300,
        }
    }

    pub fn loan_period(&self) -> Duration {
        Duration::days(self.loan_period_days)
    }

    pub fn reservation_period(&self) -> Duration {
        Duration::days(self.reservation_period_days)
    }

    // callback the remote distributor uses to push loan status changes
    pub fn notification_url(&self, loan_id: &str) -> String {
        format!("{}/loans/{}/notify?library={}",
                self.notification_base_url, loan_id, self.library_id)
    }
}
