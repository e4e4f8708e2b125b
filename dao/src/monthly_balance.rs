use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

/// Denormalized per-user-per-month cache. `month` is `1..=12`; `overtime`
/// is always derivable as `actual_hours - target_hours` and is therefore not
/// stored.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlyBalanceEntity {
    pub user_id: Uuid,
    pub year: u32,
    pub month: u8,
    pub target_hours: f32,
    pub actual_hours: f32,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait MonthlyBalanceDao {
    type Transaction: crate::Transaction;

    async fn find(
        &self,
        user_id: Uuid,
        year: u32,
        month: u8,
        tx: Self::Transaction,
    ) -> Result<Option<MonthlyBalanceEntity>, DaoError>;

    async fn find_by_user_and_year(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<std::sync::Arc<[MonthlyBalanceEntity]>, DaoError>;

    async fn upsert(
        &self,
        entity: &MonthlyBalanceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
