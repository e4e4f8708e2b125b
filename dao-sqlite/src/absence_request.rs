use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    absence_request::{AbsenceRequestDao, AbsenceRequestEntity, AbsenceStatusEntity, AbsenceTypeEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::{ResultDbErrorExt, TransactionImpl};

fn type_text(value: AbsenceTypeEntity) -> &'static str {
    match value {
        AbsenceTypeEntity::Vacation => "vacation",
        AbsenceTypeEntity::Sick => "sick",
        AbsenceTypeEntity::OvertimeComp => "overtime_comp",
        AbsenceTypeEntity::Special => "special",
        AbsenceTypeEntity::Unpaid => "unpaid",
    }
}

fn parse_type(value: &str) -> Result<AbsenceTypeEntity, DaoError> {
    match value {
        "vacation" => Ok(AbsenceTypeEntity::Vacation),
        "sick" => Ok(AbsenceTypeEntity::Sick),
        "overtime_comp" => Ok(AbsenceTypeEntity::OvertimeComp),
        "special" => Ok(AbsenceTypeEntity::Special),
        "unpaid" => Ok(AbsenceTypeEntity::Unpaid),
        other => Err(DaoError::DatabaseQueryError(format!("unknown absence type '{other}'").into())),
    }
}

fn status_text(value: AbsenceStatusEntity) -> &'static str {
    match value {
        AbsenceStatusEntity::Pending => "pending",
        AbsenceStatusEntity::Approved => "approved",
        AbsenceStatusEntity::Rejected => "rejected",
    }
}

fn parse_status(value: &str) -> Result<AbsenceStatusEntity, DaoError> {
    match value {
        "pending" => Ok(AbsenceStatusEntity::Pending),
        "approved" => Ok(AbsenceStatusEntity::Approved),
        "rejected" => Ok(AbsenceStatusEntity::Rejected),
        other => Err(DaoError::DatabaseQueryError(format!("unknown absence status '{other}'").into())),
    }
}

#[derive(FromRow)]
struct AbsenceRequestDb {
    id: Vec<u8>,
    user_id: Vec<u8>,
    absence_type: String,
    start_date: String,
    end_date: String,
    status: String,
    decided_by: Option<String>,
    decided_at: Option<String>,
    reason: Option<String>,
    created: String,
    update_version: Vec<u8>,
}

fn parse_date(value: &str) -> Result<Date, DaoError> {
    Date::parse(value, &time::format_description::well_known::Iso8601::DATE).map_db_error()
}

impl TryFrom<&AbsenceRequestDb> for AbsenceRequestEntity {
    type Error = DaoError;
    fn try_from(row: &AbsenceRequestDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            user_id: Uuid::from_slice(&row.user_id).map_db_error()?,
            absence_type: parse_type(&row.absence_type)?,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            status: parse_status(&row.status)?,
            decided_by: row.decided_by.as_deref().map(Arc::from),
            decided_at: row
                .decided_at
                .as_ref()
                .map(|value| PrimitiveDateTime::parse(value, &Iso8601::DATE_TIME))
                .transpose()
                .map_db_error()?,
            reason: row.reason.as_deref().map(Arc::from),
            created: PrimitiveDateTime::parse(&row.created, &Iso8601::DATE_TIME).map_db_error()?,
            version: Uuid::from_slice(&row.update_version).map_db_error()?,
        })
    }
}

const COLUMNS: &str =
    "id, user_id, absence_type, start_date, end_date, status, decided_by, decided_at, reason, created, update_version";

pub struct AbsenceRequestDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl AbsenceRequestDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl AbsenceRequestDao for AbsenceRequestDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(&self, id: Uuid, tx: Self::Transaction) -> Result<Option<AbsenceRequestEntity>, DaoError> {
        query_as::<_, AbsenceRequestDb>(&format!("SELECT {COLUMNS} FROM absence_request WHERE id = ?"))
            .bind(id.as_bytes().to_vec())
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(AbsenceRequestEntity::try_from)
            .transpose()
    }

    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[AbsenceRequestEntity]>, DaoError> {
        query_as::<_, AbsenceRequestDb>(&format!(
            "SELECT {COLUMNS} FROM absence_request WHERE user_id = ? AND start_date <= ? AND end_date >= ?"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(end.to_string())
        .bind(start.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(AbsenceRequestEntity::try_from)
        .collect()
    }

    async fn find_overlapping(
        &self,
        user_id: Uuid,
        absence_type: AbsenceTypeEntity,
        status: AbsenceStatusEntity,
        start: Date,
        end: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[AbsenceRequestEntity]>, DaoError> {
        query_as::<_, AbsenceRequestDb>(&format!(
            "SELECT {COLUMNS} FROM absence_request WHERE user_id = ? AND absence_type = ? AND status = ? \
             AND start_date <= ? AND end_date >= ?"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(type_text(absence_type))
        .bind(status_text(status))
        .bind(end.to_string())
        .bind(start.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(AbsenceRequestEntity::try_from)
        .collect()
    }

    async fn create(&self, entity: &AbsenceRequestEntity, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        let created = entity.created.format(&Iso8601::DATE_TIME).map_db_error()?;
        query(
            "INSERT INTO absence_request (id, user_id, absence_type, start_date, end_date, status, decided_by, decided_at, reason, created, update_version, update_process) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(type_text(entity.absence_type))
        .bind(entity.start_date.to_string())
        .bind(entity.end_date.to_string())
        .bind(status_text(entity.status))
        .bind(entity.decided_by.as_deref())
        .bind(None::<String>)
        .bind(entity.reason.as_deref())
        .bind(created)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(&self, entity: &AbsenceRequestEntity, process: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        let decided_at = entity
            .decided_at
            .map(|value| value.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        query(
            "UPDATE absence_request SET status = ?, decided_by = ?, decided_at = ?, update_version = ?, update_process = ? WHERE id = ?",
        )
        .bind(status_text(entity.status))
        .bind(entity.decided_by.as_deref())
        .bind(decided_at)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
