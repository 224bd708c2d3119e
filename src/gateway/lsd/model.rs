use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::circulation::{CirculationError, CirculationResult};
use crate::utils::date::{parse_iso8601, to_iso8601};

// License Status Document protocol model. The remote distributor answers
// every checkout request and every status poll with one of these documents.

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DocumentStatus {
    Ready,
    Active,
    Revoked,
    Returned,
    Cancelled,
    Expired,
}

impl DocumentStatus {
    // ready/active means the remote considers the loan live
    pub fn is_open(&self) -> bool {
        matches!(self, DocumentStatus::Ready | DocumentStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct StatusLink {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PotentialRights {
    pub end: Option<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct StatusDocument {
    pub status: DocumentStatus,
    pub potential_rights: Option<PotentialRights>,
    #[serde(default)]
    pub links: Vec<StatusLink>,
}

impl StatusDocument {
    // an unknown status value is a protocol error, not a new state
    pub fn parse(body: &str) -> CirculationResult<StatusDocument> {
        serde_json::from_str(body).map_err(|err| CirculationError::bad_response(
            format!("malformed status document {:?}", err).as_str()))
    }

    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links.iter().find(|link| link.rel == rel).map(|link| link.href.as_str())
    }

    // canonical remote identifier of the loan
    pub fn self_link(&self) -> Option<&str> {
        self.link("self")
    }

    // absent return link means return happens through a different channel
    pub fn return_link(&self) -> Option<&str> {
        self.link("return")
    }

    pub fn rights_end(&self) -> CirculationResult<Option<NaiveDateTime>> {
        match self.potential_rights.as_ref().and_then(|rights| rights.end.as_ref()) {
            Some(end) => parse_iso8601(end.as_str()).map(Some),
            None => Ok(None),
        }
    }
}

// Builds the templated checkout/hold request URL. The patron pseudonym and
// checkout-session id are per-request random tokens, the real patron id
// never reaches the remote service.
pub(crate) fn checkout_url(template: &str, license_id: &str, checkout_id: &str,
                           loan_token: &str, expires: NaiveDateTime,
                           notification_url: &str) -> String {
    template
        .replace("{id}", urlencoding::encode(license_id).as_ref())
        .replace("{checkout_id}", urlencoding::encode(checkout_id).as_ref())
        .replace("{patron_id}", urlencoding::encode(loan_token).as_ref())
        .replace("{expires}", urlencoding::encode(to_iso8601(expires).as_str()).as_ref())
        .replace("{notification_url}", urlencoding::encode(notification_url).as_ref())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::core::circulation::CirculationError;
    use crate::gateway::lsd::model::{checkout_url, DocumentStatus, StatusDocument};

    fn document(status: &str) -> String {
        format!(r#"{{
            "status": "{}",
            "potential_rights": {{ "end": "2024-04-01T00:00:00+00:00" }},
            "links": [
                {{"rel": "self", "href": "https://lsd.example.org/loans/1"}},
                {{"rel": "return", "href": "https://lsd.example.org/loans/1/return"}}
            ]
        }}"#, status)
    }

    #[tokio::test]
    async fn test_should_parse_status_document() {
        let doc = StatusDocument::parse(document("ready").as_str()).expect("should parse");
        assert_eq!(DocumentStatus::Ready, doc.status);
        assert_eq!(Some("https://lsd.example.org/loans/1"), doc.self_link());
        assert_eq!(Some("https://lsd.example.org/loans/1/return"), doc.return_link());
        let end = doc.rights_end().expect("should parse end").expect("should have end");
        assert_eq!(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(), end);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_status() {
        let res = StatusDocument::parse(document("paused").as_str());
        assert!(matches!(res, Err(CirculationError::BadResponse { message: _ })));
    }

    #[tokio::test]
    async fn test_should_parse_document_without_links() {
        let doc = StatusDocument::parse(r#"{"status": "expired", "potential_rights": null}"#)
            .expect("should parse");
        assert_eq!(DocumentStatus::Expired, doc.status);
        assert_eq!(None, doc.self_link());
        assert_eq!(None, doc.rights_end().expect("should parse end"));
    }

    #[tokio::test]
    async fn test_should_classify_status() {
        assert!(DocumentStatus::Ready.is_open());
        assert!(DocumentStatus::Active.is_open());
        assert!(DocumentStatus::Revoked.is_terminal());
        assert!(DocumentStatus::Returned.is_terminal());
        assert!(DocumentStatus::Cancelled.is_terminal());
        assert!(DocumentStatus::Expired.is_terminal());
    }

    #[tokio::test]
    async fn test_should_expand_checkout_url() {
        let expires = NaiveDate::from_ymd_opt(2024, 3, 22).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let url = checkout_url(
            "https://lsd.example.org/checkout?id={id}&cid={checkout_id}&p={patron_id}&exp={expires}&notify={notification_url}",
            "lic1", "co1", "pseudonym1", expires, "http://localhost:8080/loans/l1/notify?library=lib1");
        assert!(url.contains("id=lic1"));
        assert!(url.contains("cid=co1"));
        assert!(url.contains("p=pseudonym1"));
        assert!(url.contains("exp=2024-03-22T00%3A00%3A00%2B00%3A00"));
        assert!(url.contains("notify=http%3A%2F%2Flocalhost%3A8080%2Floans%2Fl1%2Fnotify%3Flibrary%3Dlib1"));
        assert!(!url.contains('{'));
    }
}
