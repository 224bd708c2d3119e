pub mod mem_pool_repository;

use crate::core::repository::Repository;
use crate::pools::domain::model::LicensePoolEntity;

pub(crate) trait PoolRepository : Repository<LicensePoolEntity> {}
