use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq)]
pub struct VacationBalanceEntity {
    pub user_id: Uuid,
    pub year: u32,
    pub entitlement: f32,
    pub carryover: f32,
    pub taken: f32,
    pub pending: f32,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait VacationBalanceDao {
    type Transaction: crate::Transaction;

    async fn find(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<Option<VacationBalanceEntity>, DaoError>;

    async fn upsert(
        &self,
        entity: &VacationBalanceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
