pub mod mem_loan_repository;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::core::circulation::CirculationResult;
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;

#[async_trait]
pub(crate) trait LoanRepository : Repository<LoanEntity> {
    // at most one loan per (patron, pool), the uniqueness constraint is the
    // only hard mutual-exclusion primitive in this core
    async fn find_by_patron_pool(&self, patron_id: &str, pool_id: &str) -> CirculationResult<Option<LoanEntity>>;

    // unexpired loans for a pool ordered by start
    async fn find_active_by_pool(&self, pool_id: &str, as_of: NaiveDateTime) -> CirculationResult<Vec<LoanEntity>>;
}
