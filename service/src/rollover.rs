use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Outcome of rolling a single user over a single year, returned for
/// logging/telemetry by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RolloverOutcome {
    pub end_of_year_balance: f64,
    pub vacation_carryover: f32,
    pub already_done: bool,
}

/// The year-end rollover job (spec C7). Triggered on January 1st at 00:05
/// local civil time; idempotent per `(user, year)` via a uniqueness key on
/// the carryover marker, and resumable if the process crashes partway
/// through a batch of users.
#[automock]
#[async_trait]
pub trait RolloverService {
    /// Rolls every active user over from `year` into `year + 1`. Acquires
    /// the global rollover lease for `year` first; if another process
    /// already holds it, returns immediately without touching any user.
    async fn run_for_year(&self, year: u32) -> Result<u32, ServiceError>;

    async fn run_for_user(
        &self,
        user_id: uuid::Uuid,
        year: u32,
    ) -> Result<RolloverOutcome, ServiceError>;
}
