pub mod mem_hold_repository;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::core::circulation::CirculationResult;
use crate::core::repository::Repository;
use crate::holds::domain::model::HoldEntity;

#[async_trait]
pub(crate) trait HoldRepository : Repository<HoldEntity> {
    // at most one hold per (patron, pool)
    async fn find_by_patron_pool(&self, patron_id: &str, pool_id: &str) -> CirculationResult<Option<HoldEntity>>;

    // queued or unexpired-reservation holds for a pool ordered by start
    async fn find_live_by_pool(&self, pool_id: &str, as_of: NaiveDateTime) -> CirculationResult<Vec<HoldEntity>>;

    // reservations whose deadline has passed, the expiry reaper's work list
    async fn query_expired_reservations(&self, as_of: NaiveDateTime) -> CirculationResult<Vec<HoldEntity>>;
}
