use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    time_entry::{TimeEntryDao, TimeEntryEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::{ResultDbErrorExt, TransactionImpl};

#[derive(FromRow)]
struct TimeEntryDb {
    id: Vec<u8>,
    user_id: Vec<u8>,
    date: String,
    hours: f64,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

impl TryFrom<&TimeEntryDb> for TimeEntryEntity {
    type Error = DaoError;
    fn try_from(row: &TimeEntryDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            user_id: Uuid::from_slice(&row.user_id).map_db_error()?,
            date: Date::parse(&row.date, &time::format_description::well_known::Iso8601::DATE).map_db_error()?,
            hours: row.hours as f32,
            created: PrimitiveDateTime::parse(&row.created, &Iso8601::DATE_TIME).map_db_error()?,
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

const COLUMNS: &str = "id, user_id, date, hours, created, deleted, update_version";

pub struct TimeEntryDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl TimeEntryDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl TimeEntryDao for TimeEntryDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(&self, id: Uuid, tx: Self::Transaction) -> Result<Option<TimeEntryEntity>, DaoError> {
        query_as::<_, TimeEntryDb>(&format!("SELECT {COLUMNS} FROM time_entry WHERE id = ? AND deleted IS NULL"))
            .bind(id.as_bytes().to_vec())
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(TimeEntryEntity::try_from)
            .transpose()
    }

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError> {
        query_as::<_, TimeEntryDb>(&format!(
            "SELECT {COLUMNS} FROM time_entry WHERE user_id = ? AND date = ? AND deleted IS NULL"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(date.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(TimeEntryEntity::try_from)
        .collect()
    }

    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError> {
        query_as::<_, TimeEntryDb>(&format!(
            "SELECT {COLUMNS} FROM time_entry WHERE user_id = ? AND date BETWEEN ? AND ? AND deleted IS NULL"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(TimeEntryEntity::try_from)
        .collect()
    }

    async fn create(&self, entity: &TimeEntryEntity, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        let created = entity.created.format(&Iso8601::DATE_TIME).map_db_error()?;
        query(
            "INSERT INTO time_entry (id, user_id, date, hours, created, deleted, update_version, update_process) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.date.to_string())
        .bind(entity.hours as f64)
        .bind(created)
        .bind(None::<String>)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(&self, entity: &TimeEntryEntity, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        query("UPDATE time_entry SET hours = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(entity.hours as f64)
            .bind(entity.version.as_bytes().to_vec())
            .bind(process)
            .bind(entity.id.as_bytes().to_vec())
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        query("UPDATE time_entry SET deleted = datetime('now'), update_process = ? WHERE id = ?")
            .bind(process)
            .bind(id.as_bytes().to_vec())
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}
