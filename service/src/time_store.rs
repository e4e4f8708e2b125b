use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::absence::AbsenceType;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub hours: f32,
}
impl From<&dao::time_entry::TimeEntryEntity> for TimeEntry {
    fn from(entity: &dao::time_entry::TimeEntryEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            date: entity.date,
            hours: entity.hours,
        }
    }
}
ledger_utils::derive_from_reference!(dao::time_entry::TimeEntryEntity, TimeEntry);

#[derive(Clone, Debug, PartialEq)]
pub struct Correction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub hours: f32,
    pub reason: Arc<str>,
    pub created_by: Arc<str>,
    pub created_at: PrimitiveDateTime,
}
impl From<&dao::correction::CorrectionEntity> for Correction {
    fn from(entity: &dao::correction::CorrectionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            date: entity.date,
            hours: entity.hours,
            reason: entity.reason.clone(),
            created_by: entity.created_by.clone(),
            created_at: entity.created_at,
        }
    }
}
ledger_utils::derive_from_reference!(dao::correction::CorrectionEntity, Correction);

/// The raw-data aggregation facade the daily calculator consults. Hire/
/// termination gating on time entries (spec: reject `date < hire_date` or
/// `date > end_date`) is enforced here, once, rather than at every caller.
#[automock]
#[async_trait]
pub trait TimeStoreService {
    async fn worked(&self, user_id: Uuid, date: Date) -> Result<f64, ServiceError>;
    async fn active_absence_types(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> Result<Arc<[AbsenceType]>, ServiceError>;
    async fn corrections(&self, user_id: Uuid, date: Date) -> Result<Arc<[Correction]>, ServiceError>;

    async fn record_time_entry(
        &self,
        user_id: Uuid,
        date: Date,
        hours: f32,
    ) -> Result<TimeEntry, ServiceError>;
    async fn delete_time_entry(&self, id: Uuid, by: &str) -> Result<(), ServiceError>;

    async fn record_correction(
        &self,
        user_id: Uuid,
        date: Date,
        hours: f32,
        reason: Arc<str>,
        created_by: Arc<str>,
    ) -> Result<Correction, ServiceError>;
    async fn delete_correction(&self, id: Uuid, by: &str) -> Result<(), ServiceError>;
}
