use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use ledger_utils::weekday::DayOfWeek;
use mockall::automock;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Employee,
}
impl From<dao::user::RoleEntity> for Role {
    fn from(role: dao::user::RoleEntity) -> Self {
        match role {
            dao::user::RoleEntity::Admin => Self::Admin,
            dao::user::RoleEntity::Employee => Self::Employee,
        }
    }
}
impl From<Role> for dao::user::RoleEntity {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Employee => Self::Employee,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: Arc<str>,
    pub role: Role,
    pub weekly_hours: f32,
    pub work_schedule: Option<BTreeMap<DayOfWeek, f32>>,
    pub hire_date: time::Date,
    pub end_date: Option<time::Date>,
    pub vacation_days_per_year: f32,
}
impl From<&dao::user::UserEntity> for User {
    fn from(entity: &dao::user::UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username.clone(),
            role: entity.role.into(),
            weekly_hours: entity.weekly_hours,
            work_schedule: entity.work_schedule.clone(),
            hire_date: entity.hire_date,
            end_date: entity.end_date,
            vacation_days_per_year: entity.vacation_days_per_year,
        }
    }
}
ledger_utils::derive_from_reference!(dao::user::UserEntity, User);

impl User {
    /// Whether `date` falls within this user's effective employment window.
    pub fn is_effective_on(&self, date: time::Date) -> bool {
        date >= self.hire_date && self.end_date.map_or(true, |end| date <= end)
    }
}

#[automock]
#[async_trait]
pub trait UserService {
    async fn all(&self) -> Result<Arc<[User]>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    async fn create(&self, user: &User, by: &str) -> Result<User, ServiceError>;
    async fn update(&self, user: &User, by: &str) -> Result<User, ServiceError>;
    async fn deactivate(&self, id: Uuid, by: &str) -> Result<(), ServiceError>;
}
