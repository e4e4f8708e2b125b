use std::sync::Arc;

use async_trait::async_trait;
use dao::{rollover_lease::RolloverLeaseDao, rollover_lease::RolloverLeaseEntity, DaoError};
use sqlx::{query, SqlitePool};
use time::format_description::well_known::Iso8601;

use crate::ResultDbErrorExt;

pub struct RolloverLeaseDaoImpl {
    pool: Arc<SqlitePool>,
}
impl RolloverLeaseDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RolloverLeaseDao for RolloverLeaseDaoImpl {
    async fn try_acquire(&self, lease: &RolloverLeaseEntity) -> Result<bool, DaoError> {
        let locked_at = lease.locked_at.format(&Iso8601::DATE_TIME).map_db_error()?;
        let result = query("INSERT INTO rollover_lease (year, locked_at, locked_by) VALUES (?, ?, ?) ON CONFLICT(year) DO NOTHING")
            .bind(lease.year as i64)
            .bind(locked_at)
            .bind(lease.locked_by.as_ref())
            .execute(self.pool.as_ref())
            .await
            .map_db_error()?;
        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, year: u32) -> Result<(), DaoError> {
        query("DELETE FROM rollover_lease WHERE year = ?")
            .bind(year as i64)
            .execute(self.pool.as_ref())
            .await
            .map_db_error()?;
        Ok(())
    }
}
