use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ledger_utils::weekday::DayOfWeek;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleEntity {
    Admin,
    Employee,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: Arc<str>,
    pub role: RoleEntity,
    pub weekly_hours: f32,
    /// Vacation days granted at each year-end rollover (spec C7 step 3).
    pub vacation_days_per_year: f32,
    /// When present, fully supersedes `weekly_hours` for day-target
    /// computation. Absent weekdays default to 0.
    pub work_schedule: Option<BTreeMap<DayOfWeek, f32>>,
    pub hire_date: Date,
    pub end_date: Option<Date>,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait UserDao {
    async fn all(&self) -> Result<Arc<[UserEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, DaoError>;
    async fn create(&self, entity: &UserEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &UserEntity, process: &str) -> Result<(), DaoError>;
    async fn delete(&self, id: Uuid, process: &str) -> Result<(), DaoError>;
}
