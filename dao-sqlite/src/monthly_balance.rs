use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    monthly_balance::{MonthlyBalanceDao, MonthlyBalanceEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use uuid::Uuid;

use crate::{ResultDbErrorExt, TransactionImpl};

#[derive(FromRow)]
struct MonthlyBalanceDb {
    user_id: Vec<u8>,
    year: i64,
    month: i64,
    target_hours: f64,
    actual_hours: f64,
}

impl TryFrom<&MonthlyBalanceDb> for MonthlyBalanceEntity {
    type Error = DaoError;
    fn try_from(row: &MonthlyBalanceDb) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Uuid::from_slice(&row.user_id).map_db_error()?,
            year: row.year as u32,
            month: row.month as u8,
            target_hours: row.target_hours as f32,
            actual_hours: row.actual_hours as f32,
        })
    }
}

const COLUMNS: &str = "user_id, year, month, target_hours, actual_hours";

pub struct MonthlyBalanceDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl MonthlyBalanceDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl MonthlyBalanceDao for MonthlyBalanceDaoImpl {
    type Transaction = TransactionImpl;

    async fn find(
        &self,
        user_id: Uuid,
        year: u32,
        month: u8,
        tx: Self::Transaction,
    ) -> Result<Option<MonthlyBalanceEntity>, DaoError> {
        query_as::<_, MonthlyBalanceDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_balance WHERE user_id = ? AND year = ? AND month = ?"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(year as i64)
        .bind(month as i64)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(MonthlyBalanceEntity::try_from)
        .transpose()
    }

    async fn find_by_user_and_year(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<Arc<[MonthlyBalanceEntity]>, DaoError> {
        query_as::<_, MonthlyBalanceDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_balance WHERE user_id = ? AND year = ? ORDER BY month ASC"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(year as i64)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(MonthlyBalanceEntity::try_from)
        .collect()
    }

    async fn upsert(&self, entity: &MonthlyBalanceEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        query(
            "INSERT INTO overtime_balance (user_id, year, month, target_hours, actual_hours) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, year, month) DO UPDATE SET target_hours = excluded.target_hours, actual_hours = excluded.actual_hours",
        )
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.year as i64)
        .bind(entity.month as i64)
        .bind(entity.target_hours as f64)
        .bind(entity.actual_hours as f64)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
