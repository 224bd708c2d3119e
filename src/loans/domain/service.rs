use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::repository::Repository;
use crate::gateway::events::EventPublisher;
use crate::gateway::lsd::client::StatusClient;
use crate::gateway::lsd::model::checkout_url;
use crate::holds::domain::HoldService;
use crate::holds::repository::HoldRepository;
use crate::loans::domain::{CheckoutOutcome, LoanService};
use crate::loans::domain::model::LoanEntity;
use crate::loans::dto::LoanDto;
use crate::loans::repository::LoanRepository;
use crate::pools::domain::PoolService;

pub(crate) struct LoanServiceImpl {
    config: Configuration,
    loan_repository: Arc<dyn LoanRepository>,
    hold_repository: Arc<dyn HoldRepository>,
    pool_service: Box<dyn PoolService>,
    hold_service: Box<dyn HoldService>,
    status_client: Box<dyn StatusClient>,
    events_publisher: Box<dyn EventPublisher>,
}

impl LoanServiceImpl {
    pub(crate) fn new(config: &Configuration, loan_repository: Arc<dyn LoanRepository>,
                      hold_repository: Arc<dyn HoldRepository>,
                      pool_service: Box<dyn PoolService>,
                      hold_service: Box<dyn HoldService>,
                      status_client: Box<dyn StatusClient>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            config: config.clone(),
            loan_repository,
            hold_repository,
            pool_service,
            hold_service,
            status_client,
            events_publisher,
        }
    }

    // Explicit rollback of the optimistic loan row. The row exists only so
    // the notification url can carry its id, once the remote side refuses
    // the checkout it must not linger.
    async fn release_pending_loan(&self, loan_id: &str) {
        if let Err(err) = self.loan_repository.delete(loan_id).await {
            warn!(loan_id = loan_id, error = %err, "failed to roll back pending loan");
        }
    }

    fn checkout_failure(err: CirculationError) -> CirculationError {
        match err {
            CirculationError::BadResponse { .. } => err,
            err => CirculationError::cannot_loan(
                format!("remote checkout failed {}", err).as_str(), None),
        }
    }

    async fn delete_loan(&self, loan: &LoanEntity, reason: &str) -> CirculationResult<()> {
        self.loan_repository.delete(loan.loan_id.as_str()).await?;
        let dto = LoanDto::from(loan);
        let _ = self.events_publisher.publish(&DomainEvent::deleted(
            reason, "loan", loan.loan_id.as_str(), &HashMap::new(), &dto)?).await?;
        Ok(())
    }
}

#[async_trait]
impl LoanService for LoanServiceImpl {
    async fn checkout(&self, patron_id: &str, pool_id: &str) -> CirculationResult<LoanDto> {
        let now = Utc::now().naive_utc();
        if self.loan_repository.find_by_patron_pool(patron_id, pool_id).await?.is_some() {
            return Err(CirculationError::already_checked_out(
                format!("patron {} already borrowed pool {}", patron_id, pool_id).as_str()));
        }
        let pool = self.pool_service.recompute(pool_id).await?;
        let license = match pool.best_available_license(now) {
            Some(license) => license.clone(),
            None => {
                return Err(CirculationError::no_licenses(
                    format!("pool {} has no usable license", pool_id).as_str()));
            }
        };
        let hold = self.hold_repository.find_by_patron_pool(patron_id, pool_id).await?;
        let reserved_copy = hold.as_ref().map(|hold| hold.is_ready(now)).unwrap_or(false);
        if pool.licenses_available < 1 && !reserved_copy {
            return Err(CirculationError::no_available_copies(
                format!("pool {} has no available copies", pool_id).as_str()));
        }

        // local row first, its id is baked into the notification callback
        let mut loan = LoanEntity::new(pool_id, patron_id,
                                       license.license_id.as_str(), self.config.loan_period());
        self.loan_repository.create(&loan).await.map_err(|err| match err {
            CirculationError::DuplicateKey { message } => {
                CirculationError::already_checked_out(message.as_str())
            }
            err => err,
        })?;

        let url = checkout_url(license.checkout_url_template.as_str(),
                               license.license_id.as_str(),
                               loan.checkout_id.as_str(),
                               loan.loan_token.as_str(),
                               now + self.config.loan_period(),
                               self.config.notification_url(loan.loan_id.as_str()).as_str());
        let doc = match self.status_client.fetch_status(url.as_str()).await {
            Ok(doc) => doc,
            Err(err) => {
                self.release_pending_loan(loan.loan_id.as_str()).await;
                return Err(Self::checkout_failure(err));
            }
        };
        if !doc.status.is_open() {
            self.release_pending_loan(loan.loan_id.as_str()).await;
            return Err(CirculationError::cannot_loan(
                format!("remote answered checkout with status {:?}", doc.status).as_str(), None));
        }
        let external_identifier = match doc.self_link() {
            Some(link) => link.to_string(),
            None => {
                self.release_pending_loan(loan.loan_id.as_str()).await;
                return Err(CirculationError::cannot_loan(
                    "status document carries no self link", None));
            }
        };
        loan.external_identifier = Some(external_identifier);
        match doc.rights_end() {
            Ok(Some(end)) => {
                loan.end = end;
            }
            Ok(None) => {}
            Err(err) => {
                self.release_pending_loan(loan.loan_id.as_str()).await;
                return Err(err);
            }
        }
        loan.updated_at = Utc::now().naive_utc();
        self.loan_repository.update(&loan).await?;
        self.pool_service.consume_license(pool_id, license.license_id.as_str()).await?;

        // the hold is fulfilled by this loan
        if let Some(hold) = hold {
            self.hold_repository.delete(hold.hold_id.as_str()).await?;
        }
        self.pool_service.recompute(pool_id).await?;

        let loan = self.loan_repository.get(loan.loan_id.as_str()).await?;
        let loan = LoanDto::from(&loan);
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "loan_granted", "loan", loan.loan_id.as_str(), &HashMap::new(), &loan.clone())?).await?;
        Ok(loan)
    }

    async fn checkout_or_hold(&self, patron_id: &str, pool_id: &str) -> CirculationResult<CheckoutOutcome> {
        match self.checkout(patron_id, pool_id).await {
            Ok(loan) => Ok(CheckoutOutcome::Granted { loan }),
            // no copy locally, or the remote granted the racing patron the
            // last one, either way the patron queues up
            Err(CirculationError::NoAvailableCopies { .. })
            | Err(CirculationError::CannotLoan { .. }) => {
                let hold = self.hold_service.place_hold(patron_id, pool_id).await?;
                Ok(CheckoutOutcome::Queued { hold })
            }
            Err(err) => Err(err),
        }
    }

    async fn checkin(&self, patron_id: &str, pool_id: &str) -> CirculationResult<LoanDto> {
        let loan = match self.loan_repository.find_by_patron_pool(patron_id, pool_id).await? {
            Some(loan) => loan,
            None => {
                return Err(CirculationError::not_checked_out(
                    format!("patron {} has no loan for pool {}", patron_id, pool_id).as_str()));
            }
        };
        let dto = LoanDto::from(&loan);
        let url = match loan.external_identifier.as_ref() {
            Some(url) => url.to_string(),
            None => {
                // the remote never confirmed this loan, drop the local row
                self.delete_loan(&loan, "loan_returned").await?;
                self.pool_service.recompute(pool_id).await?;
                return Ok(dto);
            }
        };
        let doc = self.status_client.fetch_status(url.as_str()).await?;
        if doc.status.is_terminal() {
            // the remote side already ended the loan, converge on it
            self.delete_loan(&loan, "loan_returned").await?;
            self.pool_service.recompute(pool_id).await?;
            return Ok(dto);
        }
        match doc.return_link() {
            Some(return_url) => {
                self.status_client.issue_return(return_url).await?;
                let confirm = self.status_client.fetch_status(url.as_str()).await?;
                if !confirm.status.is_terminal() {
                    return Err(CirculationError::cannot_fulfill(
                        format!("loan {} still {:?} after return", loan.loan_id, confirm.status).as_str(), None));
                }
                self.delete_loan(&loan, "loan_returned").await?;
                self.pool_service.recompute(pool_id).await?;
                Ok(dto)
            }
            None => {
                // return happens through the DRM channel, leave the row for
                // the next status sync to clean up
                self.pool_service.recompute(pool_id).await?;
                Ok(dto)
            }
        }
    }

    async fn sync_loan(&self, loan_id: &str) -> CirculationResult<Option<LoanDto>> {
        let mut loan = self.loan_repository.get(loan_id).await?;
        let url = match loan.external_identifier.as_ref() {
            Some(url) => url.to_string(),
            None => {
                // nothing remote to reconcile against yet
                return Ok(Some(LoanDto::from(&loan)));
            }
        };
        let doc = self.status_client.fetch_status(url.as_str()).await?;
        if doc.status.is_terminal() {
            self.delete_loan(&loan, "loan_revoked").await?;
            self.pool_service.recompute(loan.pool_id.as_str()).await?;
            return Ok(None);
        }
        if let Some(end) = doc.rights_end()? {
            if end != loan.end {
                loan.end = end;
                loan.updated_at = Utc::now().naive_utc();
                self.loan_repository.update(&loan).await?;
                loan = self.loan_repository.get(loan_id).await?;
                let dto = LoanDto::from(&loan);
                let _ = self.events_publisher.publish(&DomainEvent::updated(
                    "loan_refreshed", "loan", loan.loan_id.as_str(), &HashMap::new(), &dto)?).await?;
            }
        }
        Ok(Some(LoanDto::from(&loan)))
    }

    async fn query_loans(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<LoanDto>> {
        let res = self.loan_repository.query(predicate, page, page_size).await?;
        let records = res.records.iter().map(LoanDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

impl From<&LoanEntity> for LoanDto {
    fn from(other: &LoanEntity) -> LoanDto {
        LoanDto {
            loan_id: other.loan_id.to_string(),
            version: other.version,
            pool_id: other.pool_id.to_string(),
            patron_id: other.patron_id.to_string(),
            license_id: other.license_id.to_string(),
            external_identifier: other.external_identifier.clone(),
            start: other.start,
            end: other.end,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
