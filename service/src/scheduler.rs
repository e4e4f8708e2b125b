use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Drives the engine's scheduled jobs on dedicated timers in the configured
/// civil timezone (spec §5). Today this is only the year-end rollover; the
/// trait exists as the single place future scheduled jobs (e.g. a nightly
/// consistency sweep) would register.
#[automock]
#[async_trait]
pub trait SchedulerService {
    async fn start(&self) -> Result<(), ServiceError>;
}
