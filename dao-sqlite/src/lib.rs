use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, Transaction as TransactionMarker, TransactionDao};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

pub mod absence_request;
pub mod correction;
pub mod holiday;
pub mod monthly_balance;
pub mod overtime_transaction;
pub mod rollover_lease;
pub mod time_entry;
pub mod user;
pub mod vacation_balance;

const MIGRATION_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Opens (creating if absent) the engine's SQLite file, enables foreign keys
/// and full fsync durability, and applies the schema if it hasn't been
/// applied yet. One embedded file, no external database server (spec §9).
pub async fn connect(database_url: &str) -> Result<SqlitePool, DaoError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_db_error()?
        .create_if_missing(true)
        .foreign_keys(true)
        .pragma("synchronous", "FULL");
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .map_db_error()?;
    sqlx::query(MIGRATION_SQL).execute(&pool).await.map_db_error()?;
    Ok(pool)
}

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| DaoError::DatabaseQueryError(Box::new(err)))
    }
}

/// Wraps a live `sqlx::Transaction` behind a mutex so the cloneable handle
/// the `dao::Transaction` contract requires can still be driven from the one
/// place at a time SQLite transactions actually allow.
#[derive(Clone, Debug)]
pub struct TransactionImpl {
    pub(crate) tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}
impl TransactionMarker for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(Mutex::new(tx)),
        })
    }

    async fn use_transaction(&self, tx: Option<Self::Transaction>) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        match Arc::into_inner(transaction.tx) {
            Some(tx) => tx.into_inner().commit().await.map_db_error(),
            // Another clone of the handle is still outstanding; the caller
            // holding it is responsible for the final commit.
            None => Ok(()),
        }
    }
}
