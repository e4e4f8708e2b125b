use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
    Earned,
    AbsenceCredit,
    UnpaidAdjust,
    Compensation,
    Correction,
    Carryover,
}
impl From<dao::overtime_transaction::OvertimeTransactionTypeEntity> for TransactionType {
    fn from(value: dao::overtime_transaction::OvertimeTransactionTypeEntity) -> Self {
        use dao::overtime_transaction::OvertimeTransactionTypeEntity as E;
        match value {
            E::Earned => Self::Earned,
            E::AbsenceCredit => Self::AbsenceCredit,
            E::UnpaidAdjust => Self::UnpaidAdjust,
            E::Compensation => Self::Compensation,
            E::Correction => Self::Correction,
            E::Carryover => Self::Carryover,
        }
    }
}
impl From<TransactionType> for dao::overtime_transaction::OvertimeTransactionTypeEntity {
    fn from(value: TransactionType) -> Self {
        use dao::overtime_transaction::OvertimeTransactionTypeEntity as E;
        match value {
            TransactionType::Earned => E::Earned,
            TransactionType::AbsenceCredit => E::AbsenceCredit,
            TransactionType::UnpaidAdjust => E::UnpaidAdjust,
            TransactionType::Compensation => E::Compensation,
            TransactionType::Correction => E::Correction,
            TransactionType::Carryover => E::Carryover,
        }
    }
}

/// `earned`, `absence_credit`, `unpaid_adjust` and `correction` entries are
/// rewritten wholesale by the orchestrator on every recompute of a day;
/// `compensation` and `carryover` reference independent domain events
/// (an absence decision, a year boundary) and are never touched by a
/// recompute delete.
pub const RECOMPUTE_OWNED_TYPES: [TransactionType; 4] = [
    TransactionType::Earned,
    TransactionType::AbsenceCredit,
    TransactionType::UnpaidAdjust,
    TransactionType::Correction,
];

#[derive(Clone, Debug, PartialEq)]
pub struct OvertimeTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub tx_type: TransactionType,
    pub hours: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub reference_kind: Option<Arc<str>>,
    pub reference_id: Option<Arc<str>>,
    pub description: Arc<str>,
    pub created_by: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
}
impl From<&dao::overtime_transaction::OvertimeTransactionEntity> for OvertimeTransaction {
    fn from(entity: &dao::overtime_transaction::OvertimeTransactionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            date: entity.date,
            tx_type: entity.tx_type.into(),
            hours: entity.hours as f64,
            balance_before: entity.balance_before as f64,
            balance_after: entity.balance_after as f64,
            reference_kind: entity.reference_kind.clone(),
            reference_id: entity.reference_id.clone(),
            description: entity.description.clone(),
            created_by: entity.created_by.clone(),
            created_at: entity.created_at,
        }
    }
}
ledger_utils::derive_from_reference!(
    dao::overtime_transaction::OvertimeTransactionEntity,
    OvertimeTransaction
);

/// Describes one new ledger entry to append. `balance_before`/`balance_after`
/// are not supplied by callers - the journal service derives them from the
/// current tail so the chain invariant (spec P1) is a property of `append`
/// itself, never something a caller can get wrong.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub date: Date,
    pub tx_type: TransactionType,
    pub hours: f64,
    pub reference_kind: Option<Arc<str>>,
    pub reference_id: Option<Arc<str>>,
    pub description: Arc<str>,
    pub created_by: Option<Arc<str>>,
}

/// The append-only per-user ledger (spec C3). The Recompute Orchestrator is
/// the journal's only writer; every other component only reads through
/// `balance_as_of` / `list`.
#[automock]
#[async_trait]
pub trait JournalService {
    async fn append(&self, new_tx: NewTransaction) -> Result<OvertimeTransaction, ServiceError>;

    /// Deletes every entry for `user_id` on `date` whose type is in
    /// `RECOMPUTE_OWNED_TYPES`, then re-chains every following entry of that
    /// user so `balance_before`/`balance_after` stay monotonic. Runs as one
    /// atomic unit; partial application is never observable.
    async fn delete_and_rechain(&self, user_id: Uuid, date: Date) -> Result<(), ServiceError>;

    /// Deletes the entry (if any) referencing `reference_id` for `user_id`
    /// and re-chains the tail from its date. Lets a caller retire a stale
    /// `compensation` entry before appending its replacement, so repeating
    /// the same toggle never accumulates more than one row (spec P3).
    async fn delete_by_reference(&self, user_id: Uuid, reference_id: &str) -> Result<(), ServiceError>;

    async fn balance_as_of(
        &self,
        user_id: Uuid,
        date: Option<Date>,
    ) -> Result<f64, ServiceError>;

    async fn list(
        &self,
        user_id: Uuid,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<Arc<[OvertimeTransaction]>, ServiceError>;
}
