use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    absence_request::{AbsenceRequestDao, AbsenceStatusEntity},
    TransactionDao,
};
use service::{
    absence::{AbsenceDecision, AbsenceRequest, AbsenceService, AbsenceType},
    calendar::CalendarService,
    clock::ClockService,
    journal::{JournalService, NewTransaction, TransactionType},
    orchestrator::{Mutation, OrchestratorService},
    user::UserService,
    uuid_service::UuidService,
    vacation::VacationService,
    ServiceError,
};
use time::Date;
use uuid::Uuid;

use crate::gen_service_impl;

const ABSENCE_SERVICE_PROCESS: &str = "absence-service";

gen_service_impl! {
    struct AbsenceServiceImpl: AbsenceService = AbsenceServiceDeps {
        AbsenceRequestDao: AbsenceRequestDao<Transaction = Self::Transaction> = absence_request_dao,
        CalendarService: CalendarService = calendar_service,
        VacationService: VacationService = vacation_service,
        JournalService: JournalService = journal_service,
        OrchestratorService: OrchestratorService = orchestrator_service,
        UserService: UserService = user_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

/// `decide` admits every decision from every prior status; repeated
/// application is a no-op because the journal rewrite it triggers
/// (delete-then-reinsert) is itself idempotent. This is what makes the
/// circular sequence `pending -> approved -> rejected -> approved` converge
/// to the same state as a single `pending -> approved`.
fn apply_decision(decision: AbsenceDecision) -> AbsenceStatusEntity {
    match decision {
        AbsenceDecision::Approve => AbsenceStatusEntity::Approved,
        AbsenceDecision::Reject => AbsenceStatusEntity::Rejected,
        AbsenceDecision::Reset => AbsenceStatusEntity::Pending,
    }
}

impl<Deps: AbsenceServiceDeps> AbsenceServiceImpl<Deps> {
    async fn adjust_vacation_balance(
        &self,
        user_id: Uuid,
        from: AbsenceStatusEntity,
        to: AbsenceStatusEntity,
        start: Date,
        end: Date,
    ) -> Result<(), ServiceError> {
        use AbsenceStatusEntity::*;
        if from == to {
            return Ok(());
        }
        let user = self
            .user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found").into()))?;
        let year = start.year() as u32;
        let days = self.calendar_service.count_working_days(&user, start, end).await? as f32;

        match (from, to) {
            (Pending, Approved) => self.vacation_service.on_vacation_approved(user_id, year, days).await,
            (Pending, Rejected) => self.vacation_service.on_vacation_rejected(user_id, year, days).await,
            (Approved, Rejected) => self.vacation_service.on_vacation_revoked(user_id, year, days).await,
            (Rejected, Approved) => self.vacation_service.on_vacation_approved(user_id, year, days).await,
            (Approved, Pending) => {
                self.vacation_service.on_vacation_revoked(user_id, year, days).await?;
                self.vacation_service.on_vacation_requested(user_id, year, days).await
            }
            (Rejected, Pending) => self.vacation_service.on_vacation_requested(user_id, year, days).await,
            _ => Ok(()),
        }
    }

    /// `overtime_comp` approval spends the account: a `compensation` entry of
    /// `-(sum of effective targets over the range)` makes the spend visible
    /// in the ledger even though C4's same-day credit already nets it to
    /// zero. A later revoke reverses it with a symmetric positive entry.
    /// Any previous compensation entry for this request is retired first, so
    /// an approve/reject/approve cycle keeps exactly one row rather than
    /// accumulating one per toggle (spec P3).
    async fn record_compensation_spend(
        &self,
        request_id: Uuid,
        user_id: Uuid,
        start: Date,
        end: Date,
        sign: f64,
    ) -> Result<(), ServiceError> {
        self.journal_service
            .delete_by_reference(user_id, &request_id.to_string())
            .await?;
        let user = self
            .user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found").into()))?;
        let mut total_target = 0.0;
        let mut cursor = start;
        loop {
            total_target += self.calendar_service.daily_target_hours(&user, cursor).await?;
            if cursor >= end {
                break;
            }
            cursor = cursor
                .next_day()
                .ok_or_else(|| ServiceError::InvalidInput("date overflow in absence range".into()))?;
        }
        if total_target.abs() < 1e-9 {
            return Ok(());
        }
        self.journal_service
            .append(NewTransaction {
                user_id,
                date: start,
                tx_type: TransactionType::Compensation,
                hours: sign * -total_target,
                reference_kind: Some(Arc::from("absence")),
                reference_id: Some(Arc::from(request_id.to_string())),
                description: Arc::from("overtime compensation spend"),
                created_by: Some(Arc::from(ABSENCE_SERVICE_PROCESS)),
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<Deps: AbsenceServiceDeps> AbsenceService for AbsenceServiceImpl<Deps> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AbsenceRequest>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entity = self.absence_request_dao.find_by_id(id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(entity.as_ref().map(AbsenceRequest::from))
    }

    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Arc<[AbsenceRequest]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entities = self
            .absence_request_dao
            .find_by_user_and_range(user_id, start, end, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(entities.iter().map(AbsenceRequest::from).collect())
    }

    async fn request(
        &self,
        user_id: Uuid,
        absence_type: AbsenceType,
        start_date: Date,
        end_date: Date,
        reason: Option<Arc<str>>,
    ) -> Result<AbsenceRequest, ServiceError> {
        if end_date < start_date {
            return Err(ServiceError::InvalidInput("end_date must not precede start_date".into()));
        }
        let tx = self.transaction_dao.use_transaction(None).await?;
        let overlapping = self
            .absence_request_dao
            .find_overlapping(
                user_id,
                absence_type.into(),
                AbsenceStatusEntity::Pending,
                start_date,
                end_date,
                tx.clone(),
            )
            .await?;
        if !overlapping.is_empty() {
            return Err(ServiceError::Conflict(
                "a pending request of the same type already overlaps this range".into(),
            ));
        }

        let entity = dao::absence_request::AbsenceRequestEntity {
            id: self.uuid_service.new_uuid("absence_service::request id"),
            user_id,
            absence_type: absence_type.into(),
            start_date,
            end_date,
            status: AbsenceStatusEntity::Pending,
            decided_by: None,
            decided_at: None,
            reason,
            created: self.clock_service.now(),
            version: self.uuid_service.new_uuid("absence_service::request version"),
        };
        self.absence_request_dao
            .create(&entity, ABSENCE_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        if absence_type == AbsenceType::Vacation {
            let user = self
                .user_service
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found").into()))?;
            let days = self
                .calendar_service
                .count_working_days(&user, start_date, end_date)
                .await? as f32;
            self.vacation_service
                .on_vacation_requested(user_id, start_date.year() as u32, days)
                .await?;
        }

        Ok(AbsenceRequest::from(&entity))
    }

    async fn decide(
        &self,
        id: Uuid,
        decision: AbsenceDecision,
        decided_by: &str,
    ) -> Result<AbsenceRequest, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let mut entity = self
            .absence_request_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("absence request {id} not found").into()))?;

        let from = entity.status;
        let to = apply_decision(decision);

        if to == AbsenceStatusEntity::Approved && from != AbsenceStatusEntity::Approved {
            let overlapping = self
                .absence_request_dao
                .find_overlapping(
                    entity.user_id,
                    entity.absence_type,
                    AbsenceStatusEntity::Approved,
                    entity.start_date,
                    entity.end_date,
                    tx.clone(),
                )
                .await?;
            if overlapping.iter().any(|other| other.id != entity.id) {
                return Err(ServiceError::PreconditionFailed(
                    "overlapping duplicate approved absence".into(),
                ));
            }
        }

        entity.status = to;
        entity.decided_by = Some(Arc::from(decided_by));
        entity.decided_at = Some(self.clock_service.now());
        entity.version = self.uuid_service.new_uuid("absence_service::decide version");
        self.absence_request_dao
            .update(&entity, ABSENCE_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let was_active = from == AbsenceStatusEntity::Approved;
        let will_be_active = to == AbsenceStatusEntity::Approved;
        if was_active || will_be_active {
            self.orchestrator_service
                .recompute(
                    entity.user_id,
                    Mutation::AbsenceDecided {
                        start: entity.start_date,
                        end: entity.end_date,
                    },
                )
                .await?;
        }

        if entity.absence_type == dao::absence_request::AbsenceTypeEntity::Vacation {
            self.adjust_vacation_balance(entity.user_id, from, to, entity.start_date, entity.end_date)
                .await?;
        }

        if entity.absence_type == dao::absence_request::AbsenceTypeEntity::OvertimeComp {
            if !was_active && will_be_active {
                self.record_compensation_spend(entity.id, entity.user_id, entity.start_date, entity.end_date, 1.0)
                    .await?;
            } else if was_active && !will_be_active {
                self.record_compensation_spend(entity.id, entity.user_id, entity.start_date, entity.end_date, -1.0)
                    .await?;
            }
        }

        Ok(AbsenceRequest::from(&entity))
    }
}
