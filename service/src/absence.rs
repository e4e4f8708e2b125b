use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbsenceType {
    Vacation,
    Sick,
    OvertimeComp,
    Special,
    Unpaid,
}
impl AbsenceType {
    pub fn is_paid(&self) -> bool {
        !matches!(self, AbsenceType::Unpaid)
    }
}
impl From<dao::absence_request::AbsenceTypeEntity> for AbsenceType {
    fn from(value: dao::absence_request::AbsenceTypeEntity) -> Self {
        use dao::absence_request::AbsenceTypeEntity as E;
        match value {
            E::Vacation => Self::Vacation,
            E::Sick => Self::Sick,
            E::OvertimeComp => Self::OvertimeComp,
            E::Special => Self::Special,
            E::Unpaid => Self::Unpaid,
        }
    }
}
impl From<AbsenceType> for dao::absence_request::AbsenceTypeEntity {
    fn from(value: AbsenceType) -> Self {
        use dao::absence_request::AbsenceTypeEntity as E;
        match value {
            AbsenceType::Vacation => E::Vacation,
            AbsenceType::Sick => E::Sick,
            AbsenceType::OvertimeComp => E::OvertimeComp,
            AbsenceType::Special => E::Special,
            AbsenceType::Unpaid => E::Unpaid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}
impl From<dao::absence_request::AbsenceStatusEntity> for AbsenceStatus {
    fn from(value: dao::absence_request::AbsenceStatusEntity) -> Self {
        use dao::absence_request::AbsenceStatusEntity as E;
        match value {
            E::Pending => Self::Pending,
            E::Approved => Self::Approved,
            E::Rejected => Self::Rejected,
        }
    }
}
impl From<AbsenceStatus> for dao::absence_request::AbsenceStatusEntity {
    fn from(value: AbsenceStatus) -> Self {
        use dao::absence_request::AbsenceStatusEntity as E;
        match value {
            AbsenceStatus::Pending => E::Pending,
            AbsenceStatus::Approved => E::Approved,
            AbsenceStatus::Rejected => E::Rejected,
        }
    }
}

/// The action an admin takes on a pending (or previously decided) request.
/// `Reset` is the only transition allowed to return a request to `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsenceDecision {
    Approve,
    Reject,
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AbsenceRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub absence_type: AbsenceType,
    pub start_date: Date,
    pub end_date: Date,
    pub status: AbsenceStatus,
    pub decided_by: Option<Arc<str>>,
    pub decided_at: Option<PrimitiveDateTime>,
    pub reason: Option<Arc<str>>,
}
impl From<&dao::absence_request::AbsenceRequestEntity> for AbsenceRequest {
    fn from(entity: &dao::absence_request::AbsenceRequestEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            absence_type: entity.absence_type.into(),
            start_date: entity.start_date,
            end_date: entity.end_date,
            status: entity.status.into(),
            decided_by: entity.decided_by.clone(),
            decided_at: entity.decided_at,
            reason: entity.reason.clone(),
        }
    }
}
ledger_utils::derive_from_reference!(dao::absence_request::AbsenceRequestEntity, AbsenceRequest);

/// The absence lifecycle state machine (spec C6). Every decision
/// re-recomputes affected days through the orchestrator and must be
/// idempotent under the circular sequence
/// `pending -> approved -> rejected -> approved`.
#[automock]
#[async_trait]
pub trait AbsenceService {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AbsenceRequest>, ServiceError>;
    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Arc<[AbsenceRequest]>, ServiceError>;

    /// Creates a new `pending` request. Rejects overlap with another request
    /// of the *same* type and status on any covered date.
    async fn request(
        &self,
        user_id: Uuid,
        absence_type: AbsenceType,
        start_date: Date,
        end_date: Date,
        reason: Option<Arc<str>>,
    ) -> Result<AbsenceRequest, ServiceError>;

    /// Applies `decision` to `id`. Triggers a recompute over
    /// `[start_date, end_date]` for every transition except
    /// `pending -> rejected`, which has no journal effect.
    async fn decide(
        &self,
        id: Uuid,
        decision: AbsenceDecision,
        decided_by: &str,
    ) -> Result<AbsenceRequest, ServiceError>;
}
