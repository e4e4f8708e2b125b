use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    overtime_transaction::{OvertimeTransactionDao, OvertimeTransactionEntity, OvertimeTransactionTypeEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::{ResultDbErrorExt, TransactionImpl};

fn type_text(value: OvertimeTransactionTypeEntity) -> &'static str {
    match value {
        OvertimeTransactionTypeEntity::Earned => "earned",
        OvertimeTransactionTypeEntity::AbsenceCredit => "absence_credit",
        OvertimeTransactionTypeEntity::UnpaidAdjust => "unpaid_adjust",
        OvertimeTransactionTypeEntity::Compensation => "compensation",
        OvertimeTransactionTypeEntity::Correction => "correction",
        OvertimeTransactionTypeEntity::Carryover => "carryover",
    }
}

fn parse_type(value: &str) -> Result<OvertimeTransactionTypeEntity, DaoError> {
    match value {
        "earned" => Ok(OvertimeTransactionTypeEntity::Earned),
        "absence_credit" => Ok(OvertimeTransactionTypeEntity::AbsenceCredit),
        "unpaid_adjust" => Ok(OvertimeTransactionTypeEntity::UnpaidAdjust),
        "compensation" => Ok(OvertimeTransactionTypeEntity::Compensation),
        "correction" => Ok(OvertimeTransactionTypeEntity::Correction),
        "carryover" => Ok(OvertimeTransactionTypeEntity::Carryover),
        other => Err(DaoError::DatabaseQueryError(format!("unknown transaction type '{other}'").into())),
    }
}

#[derive(FromRow)]
struct OvertimeTransactionDb {
    id: Vec<u8>,
    user_id: Vec<u8>,
    date: String,
    tx_type: String,
    hours: f64,
    balance_before: f64,
    balance_after: f64,
    reference_kind: Option<String>,
    reference_id: Option<String>,
    description: String,
    created_by: Option<String>,
    created_at: String,
}

impl TryFrom<&OvertimeTransactionDb> for OvertimeTransactionEntity {
    type Error = DaoError;
    fn try_from(row: &OvertimeTransactionDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            user_id: Uuid::from_slice(&row.user_id).map_db_error()?,
            date: Date::parse(&row.date, &time::format_description::well_known::Iso8601::DATE).map_db_error()?,
            tx_type: parse_type(&row.tx_type)?,
            hours: row.hours as f32,
            balance_before: row.balance_before as f32,
            balance_after: row.balance_after as f32,
            reference_kind: row.reference_kind.as_deref().map(Arc::from),
            reference_id: row.reference_id.as_deref().map(Arc::from),
            description: Arc::from(row.description.as_str()),
            created_by: row.created_by.as_deref().map(Arc::from),
            created_at: PrimitiveDateTime::parse(&row.created_at, &Iso8601::DATE_TIME).map_db_error()?,
        })
    }
}

const COLUMNS: &str = "id, user_id, date, tx_type, hours, balance_before, balance_after, reference_kind, reference_id, description, created_by, created_at";
const ORDER: &str = "ORDER BY date ASC, created_at ASC, id ASC";

pub struct OvertimeTransactionDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl OvertimeTransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl OvertimeTransactionDao for OvertimeTransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_all_for_user(
        &self,
        user_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError> {
        query_as::<_, OvertimeTransactionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_transaction WHERE user_id = ? {ORDER}"
        ))
        .bind(user_id.as_bytes().to_vec())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(OvertimeTransactionEntity::try_from)
        .collect()
    }

    async fn find_from_date(
        &self,
        user_id: Uuid,
        from_date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError> {
        query_as::<_, OvertimeTransactionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_transaction WHERE user_id = ? AND date >= ? {ORDER}"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(from_date.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(OvertimeTransactionEntity::try_from)
        .collect()
    }

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError> {
        query_as::<_, OvertimeTransactionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_transaction WHERE user_id = ? AND date = ? {ORDER}"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(date.to_string())
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(OvertimeTransactionEntity::try_from)
        .collect()
    }

    async fn find_by_user_and_year(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<Arc<[OvertimeTransactionEntity]>, DaoError> {
        let from = format!("{year:04}-01-01");
        let to = format!("{year:04}-12-31");
        query_as::<_, OvertimeTransactionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_transaction WHERE user_id = ? AND date BETWEEN ? AND ? {ORDER}"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(from)
        .bind(to)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(OvertimeTransactionEntity::try_from)
        .collect()
    }

    async fn find_carryover_marker(
        &self,
        user_id: Uuid,
        year: u32,
        tx: Self::Transaction,
    ) -> Result<Option<OvertimeTransactionEntity>, DaoError> {
        let jan_1 = format!("{year:04}-01-01");
        query_as::<_, OvertimeTransactionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_transaction WHERE user_id = ? AND date = ? AND tx_type = 'carryover'"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(jan_1)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(OvertimeTransactionEntity::try_from)
        .transpose()
    }

    async fn insert(&self, entity: &OvertimeTransactionEntity, tx: Self::Transaction) -> Result<(), DaoError> {
        let created_at = entity.created_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        query(
            "INSERT INTO overtime_transaction (id, user_id, date, tx_type, hours, balance_before, balance_after, reference_kind, reference_id, description, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.user_id.as_bytes().to_vec())
        .bind(entity.date.to_string())
        .bind(type_text(entity.tx_type))
        .bind(entity.hours as f64)
        .bind(entity.balance_before as f64)
        .bind(entity.balance_after as f64)
        .bind(entity.reference_kind.as_deref())
        .bind(entity.reference_id.as_deref())
        .bind(entity.description.as_ref())
        .bind(entity.created_by.as_deref())
        .bind(created_at)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete_by_user_date_and_types(
        &self,
        user_id: Uuid,
        date: Date,
        types: &[OvertimeTransactionTypeEntity],
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        if types.is_empty() {
            return Ok(());
        }
        let placeholders = types.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!("DELETE FROM overtime_transaction WHERE user_id = ? AND date = ? AND tx_type IN ({placeholders})");
        let mut statement = query(&sql).bind(user_id.as_bytes().to_vec()).bind(date.to_string());
        for tx_type in types {
            statement = statement.bind(type_text(*tx_type));
        }
        statement.execute(tx.tx.lock().await.as_mut()).await.map_db_error()?;
        Ok(())
    }

    async fn delete_by_reference_id(
        &self,
        user_id: Uuid,
        reference_id: &str,
        tx: Self::Transaction,
    ) -> Result<Option<Date>, DaoError> {
        let mut guard = tx.tx.lock().await;
        let existing = query_as::<_, OvertimeTransactionDb>(&format!(
            "SELECT {COLUMNS} FROM overtime_transaction WHERE user_id = ? AND reference_id = ?"
        ))
        .bind(user_id.as_bytes().to_vec())
        .bind(reference_id)
        .fetch_optional(guard.as_mut())
        .await
        .map_db_error()?;
        let Some(existing) = existing else {
            return Ok(None);
        };
        let entity = OvertimeTransactionEntity::try_from(&existing)?;
        query("DELETE FROM overtime_transaction WHERE user_id = ? AND reference_id = ?")
            .bind(user_id.as_bytes().to_vec())
            .bind(reference_id)
            .execute(guard.as_mut())
            .await
            .map_db_error()?;
        Ok(Some(entity.date))
    }

    async fn update_balances(&self, updates: &[(Uuid, f32, f32)], tx: Self::Transaction) -> Result<(), DaoError> {
        let mut guard = tx.tx.lock().await;
        for (id, balance_before, balance_after) in updates {
            query("UPDATE overtime_transaction SET balance_before = ?, balance_after = ? WHERE id = ?")
                .bind(*balance_before as f64)
                .bind(*balance_after as f64)
                .bind(id.as_bytes().to_vec())
                .execute(guard.as_mut())
                .await
                .map_db_error()?;
        }
        Ok(())
    }
}
