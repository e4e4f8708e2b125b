use std::sync::Arc;

use async_trait::async_trait;
use dao::{user::UserDao, TransactionDao};
use service::{clock::ClockService, user::User, uuid_service::UuidService, ServiceError};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct UserServiceImpl: UserService = UserServiceDeps {
        UserDao: UserDao = user_dao,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: UserServiceDeps> service::user::UserService for UserServiceImpl<Deps> {
    async fn all(&self) -> Result<Arc<[User]>, ServiceError> {
        Ok(self.user_dao.all().await?.iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.user_dao.find_by_id(id).await?.as_ref().map(User::from))
    }

    async fn create(&self, user: &User, by: &str) -> Result<User, ServiceError> {
        if user.weekly_hours < 0.0 || user.weekly_hours > 80.0 {
            return Err(ServiceError::InvalidInput("weekly_hours must be within [0, 80]".into()));
        }
        let entity = dao::user::UserEntity {
            id: self.uuid_service.new_uuid("user_service::create id"),
            username: user.username.clone(),
            role: user.role.into(),
            weekly_hours: user.weekly_hours,
            work_schedule: user.work_schedule.clone(),
            hire_date: user.hire_date,
            end_date: user.end_date,
            vacation_days_per_year: user.vacation_days_per_year,
            created: self.clock_service.now(),
            deleted: None,
            version: self.uuid_service.new_uuid("user_service::create version"),
        };
        self.user_dao.create(&entity, by).await?;
        Ok(User::from(&entity))
    }

    async fn update(&self, user: &User, by: &str) -> Result<User, ServiceError> {
        let mut entity = self
            .user_dao
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {} not found", user.id).into()))?;
        entity.username = user.username.clone();
        entity.role = user.role.into();
        entity.weekly_hours = user.weekly_hours;
        entity.work_schedule = user.work_schedule.clone();
        entity.hire_date = user.hire_date;
        entity.end_date = user.end_date;
        entity.vacation_days_per_year = user.vacation_days_per_year;
        entity.version = self.uuid_service.new_uuid("user_service::update version");
        self.user_dao.update(&entity, by).await?;
        Ok(User::from(&entity))
    }

    async fn deactivate(&self, id: Uuid, by: &str) -> Result<(), ServiceError> {
        let mut entity = self
            .user_dao
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id} not found").into()))?;
        entity.end_date = Some(self.clock_service.today());
        entity.version = self.uuid_service.new_uuid("user_service::deactivate version");
        self.user_dao.update(&entity, by).await?;
        Ok(())
    }
}
