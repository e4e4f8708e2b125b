use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use dao::{monthly_balance::MonthlyBalanceDao, TransactionDao};
use service::{
    calendar::CalendarService,
    clock::ClockService,
    event_bus::{EventBusService, EventKind, LedgerEvent},
    journal::{JournalService, NewTransaction, TransactionType},
    orchestrator::{BalanceChanged, Mutation, OrchestratorService},
    time_store::TimeStoreService,
    user::UserService,
    ServiceError,
};
use time::{Date, Month};
use uuid::Uuid;

use crate::daily::compute_day;
use crate::gen_service_impl;

const ORCHESTRATOR_PROCESS: &str = "recompute-orchestrator";

gen_service_impl! {
    struct OrchestratorServiceImpl: OrchestratorService = OrchestratorServiceDeps {
        TimeStoreService: TimeStoreService = time_store_service,
        JournalService: JournalService = journal_service,
        CalendarService: CalendarService = calendar_service,
        EventBusService: EventBusService = event_bus_service,
        ClockService: ClockService = clock_service,
        UserService: UserService = user_service,
        MonthlyBalanceDao: MonthlyBalanceDao<Transaction = Self::Transaction> = monthly_balance_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
    ; custom_fields {
        UserLocks: Arc<UserLocks> = user_locks,
    }
}

/// Keyed per-user lock table. A recompute holds its user's lock across the
/// whole delete -> recompute -> re-chain -> cache-update -> publish sequence
/// (spec P8); distinct users never block each other.
pub struct UserLocks {
    locks: std::sync::Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self {
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, user_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

impl Default for UserLocks {
    fn default() -> Self {
        Self::new()
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// Expands `mutation` into the distinct dates whose journal entries may
/// change, ascending and deduplicated.
fn affected_dates(mutation: &Mutation, today: Date) -> Vec<Date> {
    let mut dates = match mutation {
        Mutation::TimeEntryChanged { date } => vec![*date],
        Mutation::CorrectionChanged { date } => vec![*date],
        Mutation::AbsenceDecided { start, end } => {
            let mut dates = Vec::new();
            let mut cursor = *start;
            while cursor <= *end {
                dates.push(cursor);
                cursor = match cursor.next_day() {
                    Some(next) => next,
                    None => break,
                };
            }
            dates
        }
        Mutation::UserProfileChanged { effective_from } => {
            let mut dates = Vec::new();
            let mut cursor = *effective_from;
            while cursor <= today {
                dates.push(cursor);
                cursor = match cursor.next_day() {
                    Some(next) => next,
                    None => break,
                };
            }
            dates
        }
    };
    // P6: a recompute never reaches beyond today.
    dates.retain(|date| *date <= today);
    dates.sort();
    dates.dedup();
    dates
}

impl<Deps: OrchestratorServiceDeps> OrchestratorServiceImpl<Deps> {
    async fn append_if_nonzero(
        &self,
        user_id: Uuid,
        date: Date,
        tx_type: TransactionType,
        hours: f64,
        description: &str,
    ) -> Result<(), ServiceError> {
        if hours.abs() < 1e-9 {
            return Ok(());
        }
        self.journal_service
            .append(NewTransaction {
                user_id,
                date,
                tx_type,
                hours,
                reference_kind: Some(Arc::from("recompute")),
                reference_id: None,
                description: Arc::from(description),
                created_by: Some(Arc::from(ORCHESTRATOR_PROCESS)),
            })
            .await?;
        Ok(())
    }

    async fn refresh_monthly_cache(
        &self,
        user: &service::user::User,
        year: i32,
        month: Month,
        today: Date,
    ) -> Result<(), ServiceError> {
        let last_day = days_in_month(year, month);
        let month_end = Date::from_calendar_date(year, month, last_day)
            .map_err(|_| ServiceError::InvalidInput("invalid calendar month".into()))?;
        let clamp_end = month_end.min(today);
        let month_start = Date::from_calendar_date(year, month, 1)
            .map_err(|_| ServiceError::InvalidInput("invalid calendar month".into()))?;

        if month_start > clamp_end {
            return Ok(());
        }

        let mut target_hours = 0.0;
        let mut actual_hours = 0.0;
        let mut cursor = month_start;
        loop {
            let day = compute_day(
                self.time_store_service.as_ref(),
                self.calendar_service.as_ref(),
                user,
                cursor,
            )
            .await?;
            target_hours += day.effective_target;
            actual_hours += day.actual;
            if cursor >= clamp_end {
                break;
            }
            cursor = cursor
                .next_day()
                .ok_or_else(|| ServiceError::InvalidInput("date overflow while scanning a month".into()))?;
        }

        let tx = self.transaction_dao.use_transaction(None).await?;
        self.monthly_balance_dao
            .upsert(
                &dao::monthly_balance::MonthlyBalanceEntity {
                    user_id: user.id,
                    year: year as u32,
                    month: month as u8,
                    target_hours: target_hours as f32,
                    actual_hours: actual_hours as f32,
                },
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}

#[async_trait]
impl<Deps: OrchestratorServiceDeps> OrchestratorService for OrchestratorServiceImpl<Deps> {
    async fn recompute(&self, user_id: Uuid, mutation: Mutation) -> Result<BalanceChanged, ServiceError> {
        let lock = self.user_locks.lock_for(user_id);
        let _guard = lock.lock().await;

        let user = self
            .user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found").into()))?;
        let today = self.clock_service.today();
        let dates = affected_dates(&mutation, today);

        let mut touched_months: HashSet<(i32, Month)> = HashSet::new();
        for date in &dates {
            self.journal_service.delete_and_rechain(user_id, *date).await?;
            let day = compute_day(
                self.time_store_service.as_ref(),
                self.calendar_service.as_ref(),
                &user,
                *date,
            )
            .await?;

            self.append_if_nonzero(user_id, *date, TransactionType::Earned, day.earned_delta, "earned")
                .await?;
            self.append_if_nonzero(
                user_id,
                *date,
                TransactionType::AbsenceCredit,
                day.absence_credit,
                "absence credit",
            )
            .await?;
            self.append_if_nonzero(
                user_id,
                *date,
                TransactionType::Correction,
                day.correction_total,
                "correction",
            )
            .await?;

            touched_months.insert((date.year(), date.month()));
        }

        for (year, month) in touched_months {
            self.refresh_monthly_cache(&user, year, month, today).await?;
        }

        let new_balance = self.journal_service.balance_as_of(user_id, None).await?;

        self.event_bus_service.publish(LedgerEvent {
            kind: EventKind::OvertimeUpdated,
            user_id,
            payload: Arc::from(format!("{{\"balance\":{new_balance}}}")),
            timestamp_utc: self.clock_service.now(),
        });

        Ok(BalanceChanged {
            user_id,
            dates: dates.into(),
            new_balance,
        })
    }
}
