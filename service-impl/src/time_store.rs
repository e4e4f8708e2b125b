use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    absence_request::{AbsenceRequestDao, AbsenceStatusEntity},
    correction::CorrectionDao,
    time_entry::TimeEntryDao,
    TransactionDao,
};
use service::{
    absence::AbsenceType,
    clock::ClockService,
    time_store::{Correction, TimeEntry, TimeStoreService},
    user::UserService,
    uuid_service::UuidService,
    ServiceError,
};
use time::Date;
use uuid::Uuid;

use crate::gen_service_impl;

const TIME_STORE_PROCESS: &str = "time-store-service";

gen_service_impl! {
    struct TimeStoreServiceImpl: TimeStoreService = TimeStoreServiceDeps {
        TimeEntryDao: TimeEntryDao<Transaction = Self::Transaction> = time_entry_dao,
        CorrectionDao: CorrectionDao<Transaction = Self::Transaction> = correction_dao,
        AbsenceRequestDao: AbsenceRequestDao<Transaction = Self::Transaction> = absence_request_dao,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        UserService: UserService = user_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: TimeStoreServiceDeps> TimeStoreService for TimeStoreServiceImpl<Deps> {
    async fn worked(&self, user_id: Uuid, date: Date) -> Result<f64, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entries = self
            .time_entry_dao
            .find_by_user_and_date(user_id, date, tx.clone())
            .await?;
        let total = entries.iter().map(|entry| entry.hours as f64).sum();
        self.transaction_dao.commit(tx).await?;
        Ok(total)
    }

    async fn active_absence_types(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> Result<Arc<[AbsenceType]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let requests = self
            .absence_request_dao
            .find_by_user_and_range(user_id, date, date, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(requests
            .iter()
            .filter(|request| request.status == AbsenceStatusEntity::Approved)
            .map(|request| request.absence_type.into())
            .collect())
    }

    async fn corrections(&self, user_id: Uuid, date: Date) -> Result<Arc<[Correction]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entities = self
            .correction_dao
            .find_by_user_and_date(user_id, date, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(entities.iter().map(Correction::from).collect())
    }

    async fn record_time_entry(
        &self,
        user_id: Uuid,
        date: Date,
        hours: f32,
    ) -> Result<TimeEntry, ServiceError> {
        if !(0.0..=24.0).contains(&hours) {
            return Err(ServiceError::InvalidInput("hours must be within [0, 24]".into()));
        }
        let user = self
            .user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}").into()))?;
        if !user.is_effective_on(date) {
            return Err(ServiceError::PreconditionFailed(
                "time entry date falls outside the user's employment window".into(),
            ));
        }
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entity = dao::time_entry::TimeEntryEntity {
            id: self.uuid_service.new_uuid("time_store_service::record_time_entry id"),
            user_id,
            date,
            hours,
            created: self.clock_service.now(),
            deleted: None,
            version: self.uuid_service.new_uuid("time_store_service::record_time_entry version"),
        };
        self.time_entry_dao
            .create(&entity, TIME_STORE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(TimeEntry::from(&entity))
    }

    async fn delete_time_entry(&self, id: Uuid, by: &str) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.time_entry_dao.delete(id, by, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn record_correction(
        &self,
        user_id: Uuid,
        date: Date,
        hours: f32,
        reason: Arc<str>,
        created_by: Arc<str>,
    ) -> Result<Correction, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entity = dao::correction::CorrectionEntity {
            id: self.uuid_service.new_uuid("time_store_service::record_correction id"),
            user_id,
            date,
            hours,
            reason,
            created_by,
            created_at: self.clock_service.now(),
            deleted: None,
            version: self.uuid_service.new_uuid("time_store_service::record_correction version"),
        };
        self.correction_dao
            .create(&entity, TIME_STORE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(Correction::from(&entity))
    }

    async fn delete_correction(&self, id: Uuid, by: &str) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.correction_dao.delete(id, by, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}
