use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;

use crate::DaoError;

/// A process-wide lease so that only one running instance executes the
/// year-end rollover job for a given year, even if several processes share
/// the scheduler's cron trigger (spec: "take a global rollover lease").
#[derive(Clone, Debug, PartialEq)]
pub struct RolloverLeaseEntity {
    pub year: u32,
    pub locked_at: PrimitiveDateTime,
    pub locked_by: std::sync::Arc<str>,
}

#[automock]
#[async_trait]
pub trait RolloverLeaseDao {
    /// Attempts to claim the lease for `year`; returns `true` if this call
    /// claimed it, `false` if another process already holds it.
    async fn try_acquire(&self, lease: &RolloverLeaseEntity) -> Result<bool, DaoError>;
    async fn release(&self, year: u32) -> Result<(), DaoError>;
}
