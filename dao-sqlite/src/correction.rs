use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    correction::{CorrectionDao, CorrectionEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::{ResultDbErrorExt, TransactionImpl};

#[derive(FromRow)]
struct CorrectionDb {
    id: Vec<u8>,
    user_id: Vec<u8>,
    date: String,
    hours: f64,
    reason: String,
    created_by: String,
    created_at: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

impl TryFrom<&CorrectionDb> for CorrectionEntity {
    type Error = DaoError;
    fn try_from(row: &CorrectionDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            user_id: Uuid::from_slice(&row.user_id).map_db_error()?,
            date: Date::parse(&row.date, &time::format_description::well_known::Iso8601::DATE).map_db_error()?,
            hours: row.hours as f32,
            reason: Arc::from(row.reason.as_str()),
            created_by: Arc::from(row.created_by.as_str()),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME).map_db_error()?,
            deleted: row
                .deleted
                .as_ref()
                .map(|value| PrimitiveDateTime::parse(value, &Iso8601::DATE_TIME))
                .transpose()
                .map_db_error()?,
            version: Uuid::from_slice(&row.update_version).map_db_error()?,
        })
    }
}

const COLUMNS: &str = "id, user_id, date, hours, reason, created_by, created_at, deleted, update_version";

pub struct CorrectionDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl CorrectionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl CorrectionDao for CorrectionDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(&self, id: Uuid, tx: Self::Transaction) -> Result<Option<CorrectionEntity>, DaoError> {
        query_as::<_, CorrectionDb>(&format!("SELECT {COLUMNS} FROM overtime_correction WHERE id = ? AND deleted IS NULL"))
            .bind(id.as_bytes().to_vec())
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(CorrectionEntity::try_from)
            .transpose()
    }

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[CorrectionEntity]>, DaoError> {
        query_as::<_, CorrectionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_correction WHERE user_id = ? AND date = ? AND deleted IS NULL"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(date.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(CorrectionEntity::try_from)
        .collect()
    }

    async fn create(&self, entity: &CorrectionEntity, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query(
            "INSERT INTO overtime_correction (id, user_id, date, hours, reason, created_by, created_at, deleted, update_version, update_process) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.date.to_string())
        .bind(entity.hours as f64)
        .bind(entity.reason.as_ref())
        .bind(entity.created_by.as_ref())
        .bind(created_at)
        .bind(None::<String>)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        query("UPDATE overtime_correction SET deleted = datetime('now'), update_process = ? WHERE id = ?")
            .bind(process)
            .bind(id.as_bytes().to_vec())
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}
