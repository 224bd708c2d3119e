use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::core::circulation::{CirculationError, CirculationResult};
use crate::core::domain::Configuration;
use crate::core::repository::Repository;
use crate::holds::repository::HoldRepository;
use crate::loans::repository::LoanRepository;
use crate::pools::domain::model::LicensePoolEntity;
use crate::pools::domain::PoolService;
use crate::pools::domain::scheduler::{recompute_queue, ActiveLoan, QueuedHold};
use crate::pools::repository::PoolRepository;

pub(crate) struct PoolServiceImpl {
    config: Configuration,
    pool_repository: Arc<dyn PoolRepository>,
    loan_repository: Arc<dyn LoanRepository>,
    hold_repository: Arc<dyn HoldRepository>,
}

impl PoolServiceImpl {
    pub(crate) fn new(config: &Configuration, pool_repository: Arc<dyn PoolRepository>,
                      loan_repository: Arc<dyn LoanRepository>,
                      hold_repository: Arc<dyn HoldRepository>) -> Self {
        Self {
            config: config.clone(),
            pool_repository,
            loan_repository,
            hold_repository,
        }
    }
}

#[async_trait]
impl PoolService for PoolServiceImpl {
    async fn find_pool_by_id(&self, pool_id: &str) -> CirculationResult<LicensePoolEntity> {
        self.pool_repository.get(pool_id).await
    }

    async fn recompute(&self, pool_id: &str) -> CirculationResult<LicensePoolEntity> {
        let now = Utc::now().naive_utc();
        let mut pool = self.pool_repository.get(pool_id).await?;
        let loans = self.loan_repository.find_active_by_pool(pool_id, now).await?;
        let holds = self.hold_repository.find_live_by_pool(pool_id, now).await?;

        let active: Vec<ActiveLoan> = loans.iter()
            .map(|loan| ActiveLoan { start: loan.start, end: loan.end })
            .collect();
        let queued: Vec<QueuedHold> = holds.iter()
            .map(|hold| QueuedHold {
                hold_id: hold.hold_id.to_string(),
                position: hold.position,
                start: hold.start,
                end: hold.end,
            })
            .collect();

        let update = recompute_queue(pool.licenses.as_slice(), active.as_slice(),
                                     queued.as_slice(), now,
                                     self.config.loan_period(), self.config.reservation_period());
        pool.licenses_owned = update.licenses_owned;
        pool.licenses_available = update.licenses_available;
        pool.licenses_reserved = update.licenses_reserved;
        pool.patrons_in_hold_queue = update.patrons_in_hold_queue;
        pool.updated_at = now;
        self.pool_repository.update(&pool).await?;

        for change in update.hold_changes {
            // a hold can be released between the snapshot and here, skip it
            match self.hold_repository.get(change.hold_id.as_str()).await {
                Ok(mut hold) => {
                    hold.position = change.position;
                    hold.end = change.end;
                    hold.updated_at = now;
                    self.hold_repository.update(&hold).await?;
                }
                Err(CirculationError::NotFound { message }) => {
                    warn!(hold_id = change.hold_id.as_str(), message = message.as_str(),
                          "hold vanished during recompute");
                }
                Err(err) => {
                    return Err(err);
                }
            }
        }
        self.pool_repository.get(pool_id).await
    }

    async fn consume_license(&self, pool_id: &str, license_id: &str) -> CirculationResult<()> {
        let mut pool = self.pool_repository.get(pool_id).await?;
        if !pool.consume_license(license_id) {
            return Err(CirculationError::not_found(
                format!("license {} not found in pool {}", license_id, pool_id).as_str()));
        }
        pool.updated_at = Utc::now().naive_utc();
        self.pool_repository.update(&pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use chrono::{Duration, Utc};
    use uuid::Uuid;
    use crate::core::domain::Configuration;
    use crate::core::repository::Repository;
    use crate::holds::domain::model::HoldEntity;
    use crate::holds::repository::mem_hold_repository::MemHoldRepository;
    use crate::loans::domain::model::LoanEntity;
    use crate::loans::repository::mem_loan_repository::MemLoanRepository;
    use crate::pools::domain::model::{LicenseEntity, LicensePoolEntity};
    use crate::pools::domain::PoolService;
    use crate::pools::domain::service::PoolServiceImpl;
    use crate::pools::repository::mem_pool_repository::MemPoolRepository;

    struct Fixture {
        service: PoolServiceImpl,
        pool_repository: Arc<MemPoolRepository>,
        loan_repository: Arc<MemLoanRepository>,
        hold_repository: Arc<MemHoldRepository>,
    }

    fn fixture() -> Fixture {
        let suffix = Uuid::new_v4();
        let pool_repository = Arc::new(MemPoolRepository::new(format!("pools_{}", suffix).as_str()));
        let loan_repository = Arc::new(MemLoanRepository::new(format!("loans_{}", suffix).as_str()));
        let hold_repository = Arc::new(MemHoldRepository::new(format!("holds_{}", suffix).as_str()));
        let service = PoolServiceImpl::new(&Configuration::new("test"),
                                           pool_repository.clone(), loan_repository.clone(),
                                           hold_repository.clone());
        Fixture { service, pool_repository, loan_repository, hold_repository }
    }

    async fn seed_pool(fixture: &Fixture, license_count: usize) -> LicensePoolEntity {
        let mut pool = LicensePoolEntity::new("collection1", "title1");
        for idx in 0..license_count {
            pool.add_license(LicenseEntity::new(format!("lic{}", idx).as_str(), "template"));
        }
        fixture.pool_repository.create(&pool).await.expect("should create pool");
        pool
    }

    #[tokio::test]
    async fn test_should_recompute_counters_for_idle_pool() {
        let fixture = fixture();
        let pool = seed_pool(&fixture, 2).await;
        let pool = fixture.service.recompute(pool.pool_id.as_str()).await.expect("should recompute");
        assert_eq!(2, pool.licenses_owned);
        assert_eq!(2, pool.licenses_available);
        assert_eq!(0, pool.licenses_reserved);
        assert_eq!(0, pool.patrons_in_hold_queue);
    }

    #[tokio::test]
    async fn test_should_reserve_copy_for_promoted_hold() {
        let fixture = fixture();
        let pool = seed_pool(&fixture, 2).await;
        let loan = LoanEntity::new(pool.pool_id.as_str(), "patron1", "lic0", Duration::days(21));
        fixture.loan_repository.create(&loan).await.expect("should create loan");
        let hold = HoldEntity::new(pool.pool_id.as_str(), "patron2", 1);
        fixture.hold_repository.create(&hold).await.expect("should create hold");

        let pool = fixture.service.recompute(pool.pool_id.as_str()).await.expect("should recompute");
        assert_eq!(0, pool.licenses_available);
        assert_eq!(1, pool.licenses_reserved);
        assert_eq!(1, pool.patrons_in_hold_queue);

        let promoted = fixture.hold_repository.get(hold.hold_id.as_str()).await.expect("should get hold");
        assert_eq!(0, promoted.position);
        assert!(promoted.end.is_some());
    }

    #[tokio::test]
    async fn test_should_keep_recompute_idempotent() {
        let fixture = fixture();
        let pool = seed_pool(&fixture, 1).await;
        let loan = LoanEntity::new(pool.pool_id.as_str(), "patron1", "lic0", Duration::days(21));
        fixture.loan_repository.create(&loan).await.expect("should create loan");
        let hold = HoldEntity::new(pool.pool_id.as_str(), "patron2", 1);
        fixture.hold_repository.create(&hold).await.expect("should create hold");

        let first = fixture.service.recompute(pool.pool_id.as_str()).await.expect("should recompute");
        let second = fixture.service.recompute(pool.pool_id.as_str()).await.expect("should recompute");
        assert_eq!(first.licenses_available, second.licenses_available);
        assert_eq!(first.licenses_reserved, second.licenses_reserved);
        assert_eq!(first.patrons_in_hold_queue, second.patrons_in_hold_queue);
        let queued = fixture.hold_repository.get(hold.hold_id.as_str()).await.expect("should get hold");
        assert_eq!(1, queued.position);
    }

    #[tokio::test]
    async fn test_should_conserve_copies_after_recompute() {
        let fixture = fixture();
        let pool = seed_pool(&fixture, 3).await;
        let loan = LoanEntity::new(pool.pool_id.as_str(), "patron1", "lic0", Duration::days(21));
        fixture.loan_repository.create(&loan).await.expect("should create loan");
        for idx in 0..2 {
            let hold = HoldEntity::new(pool.pool_id.as_str(), format!("held{}", idx).as_str(), 1);
            fixture.hold_repository.create(&hold).await.expect("should create hold");
        }
        let pool = fixture.service.recompute(pool.pool_id.as_str()).await.expect("should recompute");
        assert_eq!(pool.licenses_owned - 1, pool.licenses_available + pool.licenses_reserved);
    }

    #[tokio::test]
    async fn test_should_consume_license_budget() {
        let fixture = fixture();
        let mut pool = LicensePoolEntity::new("collection1", "title1");
        let mut license = LicenseEntity::new("lic0", "template");
        license.remaining_checkouts = Some(1);
        pool.add_license(license);
        fixture.pool_repository.create(&pool).await.expect("should create pool");

        fixture.service.consume_license(pool.pool_id.as_str(), "lic0").await.expect("should consume");
        let pool = fixture.service.find_pool_by_id(pool.pool_id.as_str()).await.expect("should get");
        assert_eq!(Some(0), pool.find_license("lic0").unwrap().remaining_checkouts);
        assert!(fixture.service.consume_license(pool.pool_id.as_str(), "missing").await.is_err());
    }
}
