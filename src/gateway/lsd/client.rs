use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::debug;
use crate::core::circulation::{CirculationError, CirculationResult};
use crate::core::domain::Configuration;
use crate::gateway::lsd::model::StatusDocument;

// Client half of the License Status Document protocol. Network and protocol
// failures are wrapped and surfaced, never swallowed, the caller decides
// whether an operation is retryable.
#[async_trait]
pub(crate) trait StatusClient: Sync + Send {
    // authenticated GET of a status document, also used to issue the
    // templated checkout request (the remote answers it with a document)
    async fn fetch_status(&self, url: &str) -> CirculationResult<StatusDocument>;

    // authenticated GET against a document's return link
    async fn issue_return(&self, url: &str) -> CirculationResult<()>;
}

pub(crate) struct HttpStatusClient {
    client: reqwest::Client,
    auth_token: Option<String>,
}

impl HttpStatusClient {
    pub(crate) fn new(config: &Configuration) -> CirculationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.remote_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            auth_token: config.remote_auth_token.clone(),
        })
    }

    async fn get(&self, url: &str) -> CirculationResult<String> {
        let mut req = self.client.get(url);
        if let Some(ref token) = self.auth_token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(CirculationError::cannot_fulfill(
                format!("remote status service rejected {}", url).as_str(),
                Some(status.as_u16().to_string())));
        }
        res.text().await.map_err(CirculationError::from)
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn fetch_status(&self, url: &str) -> CirculationResult<StatusDocument> {
        let body = self.get(url).await?;
        let doc = StatusDocument::parse(body.as_str())?;
        debug!(url = url, status = ?doc.status, "fetched status document");
        Ok(doc)
    }

    async fn issue_return(&self, url: &str) -> CirculationResult<()> {
        let _ = self.get(url).await?;
        debug!(url = url, "issued return");
        Ok(())
    }
}
