use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use tokio::time;
use tracing::{error, info, warn};

use crate::core::circulation::CirculationResult;
use crate::core::events::DomainEvent;
use crate::core::repository::Repository;
use crate::gateway::events::EventPublisher;
use crate::holds::dto::HoldDto;
use crate::holds::repository::HoldRepository;
use crate::pools::domain::PoolService;

#[derive(Debug, PartialEq)]
pub(crate) struct ReaperReport {
    pub holds_deleted: usize,
    pub pools_touched: usize,
}

// Periodic sweep that expires reservations whose deadline passed without a
// checkout, releasing the reserved copy to the next patron in line. One bad
// row never blocks the rest of the sweep.
pub(crate) struct HoldReaper {
    hold_repository: Arc<dyn HoldRepository>,
    pool_service: Box<dyn PoolService>,
    events_publisher: Box<dyn EventPublisher>,
    interval: Duration,
}

impl HoldReaper {
    pub(crate) fn new(hold_repository: Arc<dyn HoldRepository>,
                      pool_service: Box<dyn PoolService>,
                      events_publisher: Box<dyn EventPublisher>,
                      interval_seconds: u64) -> Self {
        Self {
            hold_repository,
            pool_service,
            events_publisher,
            interval: Duration::from_secs(interval_seconds),
        }
    }

    pub(crate) async fn sweep(&self, as_of: NaiveDateTime) -> CirculationResult<ReaperReport> {
        let expired = self.hold_repository.query_expired_reservations(as_of).await?;
        let mut holds_deleted = 0;
        let mut pools: HashSet<String> = HashSet::new();
        for hold in expired {
            match self.hold_repository.delete(hold.hold_id.as_str()).await {
                Ok(_) => {
                    holds_deleted += 1;
                    pools.insert(hold.pool_id.to_string());
                    let dto = HoldDto::from(&hold);
                    if let Ok(event) = DomainEvent::deleted(
                        "hold_expired", "hold", hold.hold_id.as_str(), &HashMap::new(), &dto) {
                        if let Err(err) = self.events_publisher.publish(&event).await {
                            warn!(hold_id = hold.hold_id.as_str(), error = %err,
                                  "failed to publish hold expiry");
                        }
                    }
                }
                Err(err) => {
                    warn!(hold_id = hold.hold_id.as_str(), error = %err,
                          "failed to expire hold, continuing sweep");
                }
            }
        }
        // recompute once per distinct pool, not once per hold
        let mut pools_touched = 0;
        for pool_id in pools {
            match self.pool_service.recompute(pool_id.as_str()).await {
                Ok(_) => {
                    pools_touched += 1;
                }
                Err(err) => {
                    warn!(pool_id = pool_id.as_str(), error = %err,
                          "failed to recompute pool after expiry");
                }
            }
        }
        Ok(ReaperReport { holds_deleted, pools_touched })
    }

    // Ticks run strictly in sequence, a slow sweep delays the next tick
    // rather than overlapping it.
    pub(crate) async fn run(&self, cancel: tokio::sync::watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "hold reaper started");

        let mut interval = time::interval(self.interval);
        let mut cancel = cancel;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sweep(Utc::now().naive_utc()).await {
                        Ok(report) => {
                            info!(holds_deleted = report.holds_deleted,
                                  pools_touched = report.pools_touched, "hold reaper sweep done");
                        }
                        Err(err) => {
                            error!(error = %err, "hold reaper sweep failed");
                        }
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("hold reaper shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDateTime, Utc};
    use uuid::Uuid;
    use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};
    use crate::core::domain::Configuration;
    use crate::core::repository::Repository;
    use crate::gateway::logs::publisher::LogPublisher;
    use crate::holds::domain::model::HoldEntity;
    use crate::holds::domain::reaper::HoldReaper;
    use crate::holds::repository::HoldRepository;
    use crate::holds::repository::mem_hold_repository::MemHoldRepository;
    use crate::loans::repository::mem_loan_repository::MemLoanRepository;
    use crate::pools::domain::model::{LicenseEntity, LicensePoolEntity};
    use crate::pools::domain::service::PoolServiceImpl;
    use crate::pools::repository::mem_pool_repository::MemPoolRepository;

    // delegate that refuses to delete one specific hold
    struct FailingDeleteRepository {
        inner: MemHoldRepository,
        poisoned_hold_id: String,
    }

    #[async_trait]
    impl Repository<HoldEntity> for FailingDeleteRepository {
        async fn create(&self, entity: &HoldEntity) -> CirculationResult<usize> {
            self.inner.create(entity).await
        }

        async fn update(&self, entity: &HoldEntity) -> CirculationResult<usize> {
            self.inner.update(entity).await
        }

        async fn get(&self, id: &str) -> CirculationResult<HoldEntity> {
            self.inner.get(id).await
        }

        async fn delete(&self, id: &str) -> CirculationResult<usize> {
            if id == self.poisoned_hold_id.as_str() {
                return Err(CirculationError::storage("poisoned row", None, false));
            }
            self.inner.delete(id).await
        }

        async fn query(&self, predicate: &HashMap<String, String>,
                       page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<HoldEntity>> {
            self.inner.query(predicate, page, page_size).await
        }
    }

    #[async_trait]
    impl HoldRepository for FailingDeleteRepository {
        async fn find_by_patron_pool(&self, patron_id: &str, pool_id: &str) -> CirculationResult<Option<HoldEntity>> {
            self.inner.find_by_patron_pool(patron_id, pool_id).await
        }

        async fn find_live_by_pool(&self, pool_id: &str, as_of: NaiveDateTime) -> CirculationResult<Vec<HoldEntity>> {
            self.inner.find_live_by_pool(pool_id, as_of).await
        }

        async fn query_expired_reservations(&self, as_of: NaiveDateTime) -> CirculationResult<Vec<HoldEntity>> {
            self.inner.query_expired_reservations(as_of).await
        }
    }

    struct Fixture {
        reaper: HoldReaper,
        pool_repository: Arc<MemPoolRepository>,
        hold_repository: Arc<MemHoldRepository>,
    }

    fn fixture() -> Fixture {
        let suffix = Uuid::new_v4();
        let config = Configuration::new("test");
        let pool_repository = Arc::new(MemPoolRepository::new(format!("pools_{}", suffix).as_str()));
        let loan_repository = Arc::new(MemLoanRepository::new(format!("loans_{}", suffix).as_str()));
        let hold_repository = Arc::new(MemHoldRepository::new(format!("holds_{}", suffix).as_str()));
        let pool_service = Box::new(PoolServiceImpl::new(&config, pool_repository.clone(),
                                                         loan_repository.clone(), hold_repository.clone()));
        let reaper = HoldReaper::new(hold_repository.clone(), pool_service,
                                     Box::new(LogPublisher::new()), 300);
        Fixture { reaper, pool_repository, hold_repository }
    }

    async fn seed_pool(fixture: &Fixture) -> LicensePoolEntity {
        let mut pool = LicensePoolEntity::new("collection1", "title1");
        pool.add_license(LicenseEntity::new("lic0", "template"));
        fixture.pool_repository.create(&pool).await.expect("should create pool");
        pool
    }

    #[tokio::test]
    async fn test_should_expire_lapsed_reservation() {
        let fixture = fixture();
        let pool = seed_pool(&fixture).await;
        let now = Utc::now().naive_utc();
        let mut lapsed = HoldEntity::new(pool.pool_id.as_str(), "patron1", 0);
        lapsed.end = Some(now - Duration::hours(1));
        fixture.hold_repository.create(&lapsed).await.expect("should create hold");

        let report = fixture.reaper.sweep(now).await.expect("should sweep");
        assert_eq!(1, report.holds_deleted);
        assert_eq!(1, report.pools_touched);
        assert!(fixture.hold_repository.get(lapsed.hold_id.as_str()).await.is_err());
        let pool = fixture.pool_repository.get(pool.pool_id.as_str()).await.expect("should get pool");
        assert_eq!(0, pool.patrons_in_hold_queue);
        assert_eq!(1, pool.licenses_available);
    }

    #[tokio::test]
    async fn test_should_leave_live_holds_alone() {
        let fixture = fixture();
        let pool = seed_pool(&fixture).await;
        let now = Utc::now().naive_utc();
        let mut reserved = HoldEntity::new(pool.pool_id.as_str(), "patron1", 0);
        reserved.end = Some(now + Duration::hours(1));
        fixture.hold_repository.create(&reserved).await.expect("should create hold");
        let queued = HoldEntity::new(pool.pool_id.as_str(), "patron2", 1);
        fixture.hold_repository.create(&queued).await.expect("should create hold");

        let report = fixture.reaper.sweep(now).await.expect("should sweep");
        assert_eq!(0, report.holds_deleted);
        assert_eq!(0, report.pools_touched);
        assert!(fixture.hold_repository.get(reserved.hold_id.as_str()).await.is_ok());
        assert!(fixture.hold_repository.get(queued.hold_id.as_str()).await.is_ok());
    }

    #[tokio::test]
    async fn test_should_batch_recompute_per_pool() {
        let fixture = fixture();
        let pool = seed_pool(&fixture).await;
        let now = Utc::now().naive_utc();
        for idx in 0..3i64 {
            let mut lapsed = HoldEntity::new(pool.pool_id.as_str(),
                                             format!("patron{}", idx).as_str(), 0);
            lapsed.end = Some(now - Duration::hours(idx + 1));
            fixture.hold_repository.create(&lapsed).await.expect("should create hold");
        }

        let report = fixture.reaper.sweep(now).await.expect("should sweep");
        assert_eq!(3, report.holds_deleted);
        assert_eq!(1, report.pools_touched);
    }

    #[tokio::test]
    async fn test_should_continue_sweep_past_failing_hold() {
        let suffix = Uuid::new_v4();
        let config = Configuration::new("test");
        let pool_repository = Arc::new(MemPoolRepository::new(format!("pools_{}", suffix).as_str()));
        let loan_repository = Arc::new(MemLoanRepository::new(format!("loans_{}", suffix).as_str()));
        let now = Utc::now().naive_utc();

        let mut pool = LicensePoolEntity::new("collection1", "title1");
        pool.add_license(LicenseEntity::new("lic0", "template"));
        pool_repository.create(&pool).await.expect("should create pool");

        let table = format!("holds_{}", suffix);
        let seed_repo = MemHoldRepository::new(table.as_str());
        let mut poisoned = HoldEntity::new(pool.pool_id.as_str(), "patron1", 0);
        poisoned.start = now - Duration::days(2);
        poisoned.end = Some(now - Duration::hours(2));
        seed_repo.create(&poisoned).await.expect("should create hold");
        let mut lapsed = HoldEntity::new(pool.pool_id.as_str(), "patron2", 0);
        lapsed.start = now - Duration::days(1);
        lapsed.end = Some(now - Duration::hours(1));
        seed_repo.create(&lapsed).await.expect("should create hold");

        let hold_repository = Arc::new(FailingDeleteRepository {
            inner: MemHoldRepository::new(table.as_str()),
            poisoned_hold_id: poisoned.hold_id.to_string(),
        });
        let pool_service = Box::new(PoolServiceImpl::new(&config, pool_repository.clone(),
                                                         loan_repository.clone(), hold_repository.clone()));
        let reaper = HoldReaper::new(hold_repository.clone(), pool_service,
                                     Box::new(LogPublisher::new()), 300);

        // the bad row is skipped, the rest of the sweep still lands
        let report = reaper.sweep(now).await.expect("should sweep");
        assert_eq!(1, report.holds_deleted);
        assert_eq!(1, report.pools_touched);
        assert!(hold_repository.get(poisoned.hold_id.as_str()).await.is_ok());
        assert!(hold_repository.get(lapsed.hold_id.as_str()).await.is_err());
    }

    #[tokio::test]
    async fn test_should_promote_next_hold_after_expiry() {
        let fixture = fixture();
        let pool = seed_pool(&fixture).await;
        let now = Utc::now().naive_utc();
        let mut lapsed = HoldEntity::new(pool.pool_id.as_str(), "patron1", 0);
        lapsed.start = now - Duration::days(2);
        lapsed.end = Some(now - Duration::hours(1));
        fixture.hold_repository.create(&lapsed).await.expect("should create hold");
        let mut waiting = HoldEntity::new(pool.pool_id.as_str(), "patron2", 1);
        waiting.start = now - Duration::days(1);
        fixture.hold_repository.create(&waiting).await.expect("should create hold");

        let report = fixture.reaper.sweep(now).await.expect("should sweep");
        assert_eq!(1, report.holds_deleted);
        let promoted = fixture.hold_repository.get(waiting.hold_id.as_str()).await.expect("should get hold");
        assert_eq!(0, promoted.position);
        assert!(promoted.end.is_some());
    }
}
