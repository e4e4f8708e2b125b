use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceTypeEntity {
    Vacation,
    Sick,
    OvertimeComp,
    Special,
    Unpaid,
}

impl AbsenceTypeEntity {
    /// Paid types credit the scheduled target on days they cover; `Unpaid`
    /// never does (spec: "unpaid wins" when both overlap a day).
    pub fn is_paid(&self) -> bool {
        !matches!(self, AbsenceTypeEntity::Unpaid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceStatusEntity {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AbsenceRequestEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub absence_type: AbsenceTypeEntity,
    pub start_date: Date,
    pub end_date: Date,
    pub status: AbsenceStatusEntity,
    pub decided_by: Option<Arc<str>>,
    pub decided_at: Option<PrimitiveDateTime>,
    pub reason: Option<Arc<str>>,
    pub created: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait AbsenceRequestDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<AbsenceRequestEntity>, DaoError>;
    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[AbsenceRequestEntity]>, DaoError>;
    async fn find_overlapping(
        &self,
        user_id: Uuid,
        absence_type: AbsenceTypeEntity,
        status: AbsenceStatusEntity,
        start: Date,
        end: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[AbsenceRequestEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &AbsenceRequestEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &AbsenceRequestEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
