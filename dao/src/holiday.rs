use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::Date;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq)]
pub struct HolidayEntity {
    pub date: Date,
    pub name: Arc<str>,
    /// Informational only; the core treats the holiday table as already
    /// scoped to the tenant (no regional filtering here).
    pub scope: Arc<str>,
}

#[automock]
#[async_trait]
pub trait HolidayDao {
    async fn all(&self) -> Result<Arc<[HolidayEntity]>, DaoError>;
    async fn find_by_date(&self, date: Date) -> Result<Option<HolidayEntity>, DaoError>;
    async fn find_between(&self, start: Date, end: Date) -> Result<Arc<[HolidayEntity]>, DaoError>;
    async fn upsert(&self, entity: &HolidayEntity) -> Result<(), DaoError>;
    async fn delete(&self, date: Date) -> Result<(), DaoError>;
}
