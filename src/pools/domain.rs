use async_trait::async_trait;
use crate::core::circulation::CirculationResult;
use crate::pools::domain::model::LicensePoolEntity;

pub mod model;
pub mod scheduler;
pub mod service;

// PoolService owns the availability counters of a pool. Every decision that
// depends on them recomputes first, counters are never read from a cache
// held across an operation.
#[async_trait]
pub(crate) trait PoolService: Sync + Send {
    async fn find_pool_by_id(&self, pool_id: &str) -> CirculationResult<LicensePoolEntity>;

    // re-derive counters and hold positions from current loans and holds
    async fn recompute(&self, pool_id: &str) -> CirculationResult<LicensePoolEntity>;

    // burn one checkout off a license's budget
    async fn consume_license(&self, pool_id: &str, license_id: &str) -> CirculationResult<()>;
}
