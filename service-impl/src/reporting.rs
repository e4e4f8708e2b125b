use std::sync::Arc;

use async_trait::async_trait;
use dao::{monthly_balance::MonthlyBalanceDao, TransactionDao};
use service::{
    calendar::CalendarService,
    clock::ClockService,
    reporting::{DailyBreakdown, MonthlyBreakdown, OvertimeReport, ReportingService},
    time_store::TimeStoreService,
    user::UserService,
    ServiceError,
};
use time::{Date, Month};
use uuid::Uuid;

use crate::daily::compute_day;
use crate::gen_service_impl;

const TOLERANCE_HOURS: f64 = 0.01;

gen_service_impl! {
    struct ReportingServiceImpl: ReportingService = ReportingServiceDeps {
        UserService: UserService = user_service,
        CalendarService: CalendarService = calendar_service,
        TimeStoreService: TimeStoreService = time_store_service,
        MonthlyBalanceDao: MonthlyBalanceDao<Transaction = Self::Transaction> = monthly_balance_dao,
        ClockService: ClockService = clock_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn month_from_u8(month: u8) -> Result<Month, ServiceError> {
    Month::try_from(month).map_err(|_| ServiceError::InvalidInput("month must be within 1..=12".into()))
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

impl<Deps: ReportingServiceDeps> ReportingServiceImpl<Deps> {
    /// Live-recomputes one calendar month and cross-checks it against the
    /// monthly cache. Returns `None` if the month hasn't started yet
    /// (spec P6: a report never reaches beyond today).
    async fn live_month(
        &self,
        user: &service::user::User,
        year: u32,
        month: u8,
        today: Date,
        collect_daily: bool,
    ) -> Result<Option<(MonthlyBreakdown, Vec<DailyBreakdown>)>, ServiceError> {
        let month_enum = month_from_u8(month)?;
        let month_start = Date::from_calendar_date(year as i32, month_enum, 1)
            .map_err(|_| ServiceError::InvalidInput("invalid report month".into()))?;
        if month_start > today {
            return Ok(None);
        }
        let last_day = days_in_month(year as i32, month_enum);
        let month_end = Date::from_calendar_date(year as i32, month_enum, last_day)
            .map_err(|_| ServiceError::InvalidInput("invalid report month".into()))?
            .min(today);

        let mut target_hours = 0.0;
        let mut actual_hours = 0.0;
        let mut daily = Vec::new();
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
            if collect_daily {
                daily.push(DailyBreakdown {
                    date: cursor,
                    target: day.effective_target,
                    actual: day.actual,
                    overtime: day.overtime,
                });
            }
            if cursor >= month_end {
                break;
            }
            cursor = cursor
                .next_day()
                .ok_or_else(|| ServiceError::InvalidInput("date overflow while scanning a month".into()))?;
        }

        let tx = self.transaction_dao.use_transaction(None).await?;
        let cached = self.monthly_balance_dao.find(user.id, year, month, tx).await?;
        let (cached_target, cached_actual) = cached
            .map(|entity| (entity.target_hours as f64, entity.actual_hours as f64))
            .unwrap_or((0.0, 0.0));

        let live_overtime = actual_hours - target_hours;
        let cached_overtime = cached_actual - cached_target;
        if (live_overtime - cached_overtime).abs() > TOLERANCE_HOURS {
            tracing::error!(
                user_id = %user.id,
                year,
                month,
                cached = cached_overtime,
                live = live_overtime,
                daily = ?daily,
                "monthly overtime cache disagrees with a live recompute"
            );
            return Err(ServiceError::Inconsistent {
                user_id: user.id,
                year,
                month: month as u8,
                cached: cached_overtime,
                live: live_overtime,
            });
        }

        Ok(Some((
            MonthlyBreakdown {
                year,
                month,
                target: target_hours,
                actual: actual_hours,
                overtime: live_overtime,
            },
            daily,
        )))
    }
}

#[async_trait]
impl<Deps: ReportingServiceDeps> ReportingService for ReportingServiceImpl<Deps> {
    async fn overtime_report(
        &self,
        user_id: Uuid,
        year: u32,
        month: Option<u8>,
    ) -> Result<OvertimeReport, ServiceError> {
        let user = self
            .user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found").into()))?;
        let today = self.clock_service.today();

        let months: Vec<u8> = match month {
            Some(month) => vec![month],
            None => (1..=12).collect(),
        };

        let mut monthly = Vec::new();
        let mut daily = Vec::new();
        for candidate in months {
            if let Some((breakdown, days)) = self
                .live_month(&user, year, candidate, today, month.is_some())
                .await?
            {
                monthly.push(breakdown);
                daily.extend(days);
            }
        }

        let summary_overtime = monthly.iter().map(|entry| entry.overtime).sum();

        Ok(OvertimeReport {
            user_id,
            year,
            month,
            daily: Arc::from(daily),
            monthly: Arc::from(monthly),
            summary_overtime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::MockTransactionDao;
    use service::calendar::MockCalendarService;
    use service::clock::MockClockService;
    use service::time_store::MockTimeStoreService;
    use service::user::{MockUserService, Role, User};
    use time::macros::date;

    struct TestDeps;
    impl ReportingServiceDeps for TestDeps {
        type Transaction = dao::MockTransaction;
        type UserService = MockUserService;
        type CalendarService = MockCalendarService;
        type TimeStoreService = MockTimeStoreService;
        type MonthlyBalanceDao = dao::monthly_balance::MockMonthlyBalanceDao;
        type ClockService = MockClockService;
        type TransactionDao = MockTransactionDao;
    }

    fn build_user() -> User {
        User {
            id: Uuid::nil(),
            username: Arc::from("alice"),
            role: Role::Employee,
            weekly_hours: 40.0,
            work_schedule: None,
            hire_date: date!(2020 - 01 - 01),
            end_date: None,
            vacation_days_per_year: 25.0,
        }
    }

    #[tokio::test]
    async fn agreeing_cache_and_live_recompute_yields_a_clean_report() {
        let mut user_service = MockUserService::new();
        user_service.expect_find_by_id().returning(|_| Ok(Some(build_user())));
        let mut calendar_service = MockCalendarService::new();
        calendar_service.expect_daily_target_hours().returning(|_, _| Ok(8.0));
        let mut time_store_service = MockTimeStoreService::new();
        time_store_service.expect_worked().returning(|_, _| Ok(8.0));
        time_store_service
            .expect_active_absence_types()
            .returning(|_, _| Ok(Arc::from(vec![])));
        time_store_service.expect_corrections().returning(|_, _| Ok(Arc::from(vec![])));
        let mut clock_service = MockClockService::new();
        clock_service.expect_today().returning(|| date!(2024 - 05 - 31));
        let mut monthly_balance_dao = dao::monthly_balance::MockMonthlyBalanceDao::new();
        monthly_balance_dao.expect_find().returning(|_, _, _, _| {
            Ok(Some(dao::monthly_balance::MonthlyBalanceEntity {
                user_id: Uuid::nil(),
                year: 2024,
                month: 5,
                target_hours: 8.0 * 31.0,
                actual_hours: 8.0 * 31.0,
            }))
        });
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(dao::MockTransaction));

        let service = ReportingServiceImpl::<TestDeps> {
            user_service: Arc::new(user_service),
            calendar_service: Arc::new(calendar_service),
            time_store_service: Arc::new(time_store_service),
            monthly_balance_dao: Arc::new(monthly_balance_dao),
            clock_service: Arc::new(clock_service),
            transaction_dao: Arc::new(transaction_dao),
        };

        let report = service.overtime_report(Uuid::nil(), 2024, Some(5)).await.unwrap();
        assert_eq!(report.summary_overtime, 0.0);
        assert_eq!(report.daily.len(), 31);
    }

    #[tokio::test]
    async fn disagreeing_cache_surfaces_as_inconsistent() {
        let mut user_service = MockUserService::new();
        user_service.expect_find_by_id().returning(|_| Ok(Some(build_user())));
        let mut calendar_service = MockCalendarService::new();
        calendar_service.expect_daily_target_hours().returning(|_, _| Ok(8.0));
        let mut time_store_service = MockTimeStoreService::new();
        time_store_service.expect_worked().returning(|_, _| Ok(8.0));
        time_store_service
            .expect_active_absence_types()
            .returning(|_, _| Ok(Arc::from(vec![])));
        time_store_service.expect_corrections().returning(|_, _| Ok(Arc::from(vec![])));
        let mut clock_service = MockClockService::new();
        clock_service.expect_today().returning(|| date!(2024 - 05 - 31));
        let mut monthly_balance_dao = dao::monthly_balance::MockMonthlyBalanceDao::new();
        monthly_balance_dao.expect_find().returning(|_, _, _, _| {
            Ok(Some(dao::monthly_balance::MonthlyBalanceEntity {
                user_id: Uuid::nil(),
                year: 2024,
                month: 5,
                target_hours: 8.0 * 31.0,
                actual_hours: 8.0 * 31.0 + 5.0,
            }))
        });
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(dao::MockTransaction));

        let service = ReportingServiceImpl::<TestDeps> {
            user_service: Arc::new(user_service),
            calendar_service: Arc::new(calendar_service),
            time_store_service: Arc::new(time_store_service),
            monthly_balance_dao: Arc::new(monthly_balance_dao),
            clock_service: Arc::new(clock_service),
            transaction_dao: Arc::new(transaction_dao),
        };

        let result = service.overtime_report(Uuid::nil(), 2024, Some(5)).await;
        assert!(matches!(result, Err(ServiceError::Inconsistent { .. })));
    }
}
