use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OvertimeTransactionTypeEntity {
    Earned,
    AbsenceCredit,
    UnpaidAdjust,
    Compensation,
    Correction,
    Carryover,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OvertimeTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub tx_type: OvertimeTransactionTypeEntity,
    pub hours: f32,
    pub balance_before: f32,
    pub balance_after: f32,
    pub reference_kind: Option<Arc<str>>,
    pub reference_id: Option<Arc<str>>,
    pub description: Arc<str>,
    pub created_by: Option<Arc<str>>,
    pub created_at: PrimitiveDateTime,
}

/// Storage for the append-only per-user ledger. The DAO itself does not
/// compute running balances or chain order - that is the journal service's
/// job (dao layer is plain CRUD, as every DAO in this crate is); this trait
/// only exposes the reads and writes the journal service needs to do it.
#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait OvertimeTransactionDao {
    type Transaction: crate::Transaction;

    /// All entries for `user_id` ordered by `(date, created_at, id)` ascending.
    async fn find_all_for_user(
        &self,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError>;

    /// Entries on or after `from_date`, in chain order - the tail slice a
    /// re-chain operation needs to rewrite.
    async fn find_from_date(
        &self,
        user_id: Uuid,
        from_date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError>;

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError>;

    async fn find_by_user_and_year(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError>;

    async fn find_carryover_marker(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<Option<OvertimeTransactionEntity>, DaoError>;

    async fn insert(
        &self,
        entity: &OvertimeTransactionEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    /// Deletes every entry for `user_id` on `date` whose type is in
    /// `types`. `compensation` and `carryover` entries reference independent
    /// domain events and are never targeted by a recompute delete.
    async fn delete_by_user_date_and_types(
        &self,
        user_id: Uuid,
        date: Date,
        types: &[OvertimeTransactionTypeEntity],
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    /// Deletes the entry (if any) for `user_id` whose `reference_id` matches,
    /// returning the date it lived on so the caller can re-chain the tail.
    /// Used to retire a stale `compensation` entry before its replacement is
    /// inserted, so a repeated approve/reject toggle never accumulates more
    /// than one row per absence decision.
    async fn delete_by_reference_id(
        &self,
        user_id: Uuid,
        reference_id: &str,
        tx: Self::Transaction,
    ) -> Result<Option<Date>, DaoError>;

    /// Rewrites `balance_before`/`balance_after` for an already-persisted
    /// batch of entries, in the same transaction as any delete/insert that
    /// preceded it, so the chain invariant is restored atomically.
    async fn update_balances(
        &self,
        updates: &[(Uuid, f32, f32)],
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
