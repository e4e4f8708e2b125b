use async_trait::async_trait;
use mockall::automock;
use time::Date;

use crate::user::User;
use crate::ServiceError;

/// Day classification: weekends, public holidays, and the per-user
/// scheduled target for a given date. This is, per the design notes, the
/// single most bug-prone rule in the source system and is centralized here
/// rather than re-derived at each call site.
///
/// Contract for `daily_target_hours` (order is significant - later rules
/// never override an earlier zero):
/// 1. Outside `[hire_date, end_date]` -> 0.
/// 2. Holiday -> 0 (a holiday overrides a scheduled workday).
/// 3. `work_schedule` present -> that weekday's entry, or 0 if absent.
/// 4. Weekend with no `work_schedule` -> 0.
/// 5. Otherwise -> `weekly_hours / 5`.
#[automock]
#[async_trait]
pub trait CalendarService {
    async fn is_holiday(&self, date: Date) -> Result<bool, ServiceError>;
    fn is_weekend(&self, date: Date) -> bool;
    async fn daily_target_hours(&self, user: &User, date: Date) -> Result<f64, ServiceError>;
    async fn count_working_days(
        &self,
        user: &User,
        start: Date,
        end: Date,
    ) -> Result<u32, ServiceError>;
}
