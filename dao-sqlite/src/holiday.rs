use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    holiday::{HolidayDao, HolidayEntity},
    DaoError,
};
use sqlx::{query, query_as, FromRow, SqlitePool};
use time::Date;

use crate::ResultDbErrorExt;

#[derive(FromRow)]
struct HolidayDb {
    date: String,
    name: String,
    scope: String,
}

fn parse_date(value: &str) -> Result<Date, DaoError> {
    Date::parse(value, &time::format_description::well_known::Iso8601::DATE).map_db_error()
}

impl TryFrom<&HolidayDb> for HolidayEntity {
    type Error = DaoError;
    fn try_from(row: &HolidayDb) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_date(&row.date)?,
            name: Arc::from(row.name.as_str()),
            scope: Arc::from(row.scope.as_str()),
        })
    }
}

pub struct HolidayDaoImpl {
    pool: Arc<SqlitePool>,
}
impl HolidayDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolidayDao for HolidayDaoImpl {
    async fn all(&self) -> Result<Arc<[HolidayEntity]>, DaoError> {
        query_as::<_, HolidayDb>("SELECT date, name, scope FROM holiday")
            .fetch_all(self.pool.as_ref())
            .await
            .map_db_error()?
            .iter()
            .map(HolidayEntity::try_from)
            .collect()
    }

    async fn find_by_date(&self, date: Date) -> Result<Option<HolidayEntity>, DaoError> {
        query_as::<_, HolidayDb>("SELECT date, name, scope FROM holiday WHERE date = ?")
            .bind(date.to_string())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_db_error()?
            .as_ref()
            .map(HolidayEntity::try_from)
            .transpose()
    }

    async fn find_between(&self, start: Date, end: Date) -> Result<Arc<[HolidayEntity]>, DaoError> {
        query_as::<_, HolidayDb>("SELECT date, name, scope FROM holiday WHERE date BETWEEN ? AND ?")
            .bind(start.to_string())
            .bind(end.to_string())
            .fetch_all(self.pool.as_ref())
            .await
            .map_db_error()?
            .iter()
            .map(HolidayEntity::try_from)
            .collect()
    }

    async fn upsert(&self, entity: &HolidayEntity) -> Result<(), DaoError> {
        query("INSERT INTO holiday (date, name, scope) VALUES (?, ?, ?) ON CONFLICT(date) DO UPDATE SET name = excluded.name, scope = excluded.scope")
            .bind(entity.date.to_string())
            .bind(entity.name.as_ref())
            .bind(entity.scope.as_ref())
            .execute(self.pool.as_ref())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, date: Date) -> Result<(), DaoError> {
        query("DELETE FROM holiday WHERE date = ?")
            .bind(date.to_string())
            .execute(self.pool.as_ref())
            .await
            .map_db_error()?;
        Ok(())
    }
}
