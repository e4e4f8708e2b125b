use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    vacation_balance::{VacationBalanceDao, VacationBalanceEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use uuid::Uuid;

use crate::{ResultDbErrorExt, TransactionImpl};

#[derive(FromRow)]
struct VacationBalanceDb {
    user_id: Vec<u8>,
    year: i64,
    entitlement: f64,
    carryover: f64,
    taken: f64,
    pending: f64,
}

impl TryFrom<&VacationBalanceDb> for VacationBalanceEntity {
    type Error = DaoError;
    fn try_from(row: &VacationBalanceDb) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Uuid::from_slice(&row.user_id).map_db_error()?,
            year: row.year as u32,
            entitlement: row.entitlement as f32,
            carryover: row.carryover as f32,
            taken: row.taken as f32,
            pending: row.pending as f32,
        })
    }
}

const COLUMNS: &str = "user_id, year, entitlement, carryover, taken, pending";

pub struct VacationBalanceDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl VacationBalanceDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl VacationBalanceDao for VacationBalanceDaoImpl {
    type Transaction = TransactionImpl;

    async fn find(&self, user_id: Uuid, year: u32, tx: Self::Transaction) -> Result<Option<VacationBalanceEntity>, DaoError> {
        query_as::<_, VacationBalanceDb>(&format!("SELECT {COLUMNS} FROM vacation_balance WHERE user_id = ? AND year = ?"))
            .bind(user_id.as_bytes().to_vec())
            .bind(year as i64)
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(VacationBalanceEntity::try_from)
            .transpose()
    }

    async fn upsert(&self, entity: &VacationBalanceEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        query(
            "INSERT INTO vacation_balance (user_id, year, entitlement, carryover, taken, pending) VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, year) DO UPDATE SET entitlement = excluded.entitlement, carryover = excluded.carryover, \
             taken = excluded.taken, pending = excluded.pending",
        )
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.year as i64)
        .bind(entity.entitlement as f64)
        .bind(entity.carryover as f64)
        .bind(entity.taken as f64)
        .bind(entity.pending as f64)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
