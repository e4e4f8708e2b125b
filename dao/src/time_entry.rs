use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntryEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub hours: f32,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait TimeEntryDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<TimeEntryEntity>, DaoError>;
    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError>;
    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError>;
    async fn create(
        &self,
        entity: &TimeEntryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &TimeEntryEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete(
        &self,
        id: Uuid,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
