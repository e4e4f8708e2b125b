use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    user::{RoleEntity, UserDao, UserEntity},
    DaoError,
};
use ledger_utils::weekday::DayOfWeek;
use sqlx::{query, query_as, FromRow, SqlitePool};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::ResultDbErrorExt;

#[derive(FromRow)]
struct UserDb {
    id: Vec<u8>,
    username: String,
    role: String,
    weekly_hours: f64,
    vacation_days_per_year: f64,
    work_schedule: Option<String>,
    hire_date: String,
    end_date: Option<String>,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

fn parse_role(role: &str) -> Result<RoleEntity, DaoError> {
    match role {
        "admin" => Ok(RoleEntity::Admin),
        "employee" => Ok(RoleEntity::Employee),
        other => Err(DaoError::DatabaseQueryError(
            format!("unknown role '{other}'").into(),
        )),
    }
}

fn role_text(role: RoleEntity) -> &'static str {
    match role {
        RoleEntity::Admin => "admin",
        RoleEntity::Employee => "employee",
    }
}

fn parse_date(value: &str) -> Result<Date, DaoError> {
    Date::parse(value, &time::format_description::well_known::Iso8601::DATE).map_db_error()
}

fn parse_day_of_week(name: &str) -> Option<DayOfWeek> {
    match name {
        "Monday" => Some(DayOfWeek::Monday),
        "Tuesday" => Some(DayOfWeek::Tuesday),
        "Wednesday" => Some(DayOfWeek::Wednesday),
        "Thursday" => Some(DayOfWeek::Thursday),
        "Friday" => Some(DayOfWeek::Friday),
        "Saturday" => Some(DayOfWeek::Saturday),
        "Sunday" => Some(DayOfWeek::Sunday),
        _ => None,
    }
}

impl TryFrom<&UserDb> for UserEntity {
    type Error = DaoError;
    fn try_from(row: &UserDb) -> Result<Self, Self::Error> {
        let work_schedule = row
            .work_schedule
            .as_ref()
            .map(|json| serde_json::from_str::<BTreeMap<String, f32>>(json))
            .transpose()
            .map_db_error()?
            .map(|raw| {
                raw.into_iter()
                    .filter_map(|(day, hours)| parse_day_of_week(&day).map(|day| (day, hours)))
                    .collect()
            });
        Ok(Self {
            id: Uuid::from_slice(&row.id).map_db_error()?,
            username: Arc::from(row.username.as_str()),
            role: parse_role(&row.role)?,
            weekly_hours: row.weekly_hours as f32,
            vacation_days_per_year: row.vacation_days_per_year as f32,
            work_schedule,
            hire_date: parse_date(&row.hire_date)?,
            end_date: row.end_date.as_deref().map(parse_date).transpose()?,
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

pub struct UserDaoImpl {
    pool: Arc<SqlitePool>,
}
impl UserDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, username, role, weekly_hours, vacation_days_per_year, work_schedule, hire_date, end_date, created, deleted, update_version";

#[async_trait]
impl UserDao for UserDaoImpl {
    async fn all(&self) -> Result<Arc<[UserEntity]>, DaoError> {
        query_as::<_, UserDb>(&format!("SELECT {COLUMNS} FROM user WHERE deleted IS NULL"))
            .fetch_all(self.pool.as_ref())
            .await
            .map_db_error()?
            .iter()
            .map(UserEntity::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, DaoError> {
        query_as::<_, UserDb>(&format!("SELECT {COLUMNS} FROM user WHERE id = ?"))
            .bind(id.as_bytes().to_vec())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_db_error()?
            .as_ref()
            .map(UserEntity::try_from)
            .transpose()
    }

    async fn create(&self, entity: &UserEntity, process: &str) -> Result<(), DaoError> {
        let work_schedule = entity
            .work_schedule
            .as_ref()
            .map(|schedule| {
                serde_json::to_string(
                    &schedule
                        .iter()
                        .map(|(day, hours)| (day.to_string(), hours))
                        .collect::<BTreeMap<_, _>>(),
                )
            })
            .transpose()
            .map_db_error()?;
        let created = entity.created.format(&Iso8601::DATE_TIME).map_db_error()?;
        let deleted = entity
            .deleted
            .map(|value| value.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        query(
            "INSERT INTO user (id, username, role, weekly_hours, vacation_days_per_year, work_schedule, hire_date, end_date, created, deleted, update_version, update_process) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.username.as_ref())
        .bind(role_text(entity.role))
        .bind(entity.weekly_hours as f64)
        .bind(entity.vacation_days_per_year as f64)
        .bind(work_schedule)
        .bind(entity.hire_date.to_string())
        .bind(entity.end_date.map(|date| date.to_string()))
        .bind(created)
        .bind(deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(self.pool.as_ref())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(&self, entity: &UserEntity, process: &str) -> Result<(), DaoError> {
        let work_schedule = entity
            .work_schedule
            .as_ref()
            .map(|schedule| {
                serde_json::to_string(
                    &schedule
                        .iter()
                        .map(|(day, hours)| (day.to_string(), hours))
                        .collect::<BTreeMap<_, _>>(),
                )
            })
            .transpose()
            .map_db_error()?;
        let deleted = entity
            .deleted
            .map(|value| value.format(&Iso8601::DATE_TIME))
            .transpose()
            .map_db_error()?;
        query(
            "UPDATE user SET username = ?, role = ?, weekly_hours = ?, vacation_days_per_year = ?, work_schedule = ?, \
             hire_date = ?, end_date = ?, deleted = ?, update_version = ?, update_process = ? WHERE id = ?",
        )
        .bind(entity.username.as_ref())
        .bind(role_text(entity.role))
        .bind(entity.weekly_hours as f64)
        .bind(entity.vacation_days_per_year as f64)
        .bind(work_schedule)
        .bind(entity.hire_date.to_string())
        .bind(entity.end_date.map(|date| date.to_string()))
        .bind(deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .execute(self.pool.as_ref())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, process: &str) -> Result<(), DaoError> {
        query("UPDATE user SET deleted = datetime('now'), update_process = ? WHERE id = ?")
            .bind(process)
            .bind(id.as_bytes().to_vec())
            .execute(self.pool.as_ref())
            .await
            .map_db_error()?;
        Ok(())
    }
}
