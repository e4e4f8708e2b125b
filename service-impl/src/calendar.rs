use async_trait::async_trait;
use dao::holiday::HolidayDao;
use service::{calendar::CalendarService, user::User, ServiceError};
use time::Date;

use crate::gen_service_impl;

gen_service_impl! {
    struct CalendarServiceImpl: CalendarService = CalendarServiceDeps {
        HolidayDao: HolidayDao = holiday_dao,
    }
}

#[async_trait]
impl<Deps: CalendarServiceDeps> CalendarService for CalendarServiceImpl<Deps> {
    async fn is_holiday(&self, date: Date) -> Result<bool, ServiceError> {
        Ok(self.holiday_dao.find_by_date(date).await?.is_some())
    }

    fn is_weekend(&self, date: Date) -> bool {
        ledger_utils::weekday::DayOfWeek::from(date.weekday()).is_weekend()
    }

    async fn daily_target_hours(&self, user: &User, date: Date) -> Result<f64, ServiceError> {
        if !user.is_effective_on(date) {
            return Ok(0.0);
        }
        if self.is_holiday(date).await? {
            return Ok(0.0);
        }
        if let Some(schedule) = &user.work_schedule {
            let day = ledger_utils::weekday::DayOfWeek::from(date.weekday());
            return Ok(schedule.get(&day).copied().unwrap_or(0.0) as f64);
        }
        if self.is_weekend(date) {
            return Ok(0.0);
        }
        Ok(user.weekly_hours as f64 / 5.0)
    }

    async fn count_working_days(&self, user: &User, start: Date, end: Date) -> Result<u32, ServiceError> {
        let mut count = 0;
        let mut cursor = start;
        while cursor <= end {
            if self.daily_target_hours(user, cursor).await? > 0.0 {
                count += 1;
            }
            cursor = cursor
                .next_day()
                .ok_or_else(|| ServiceError::InvalidInput("date range overflows the calendar".into()))?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::holiday::MockHolidayDao;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use time::macros::date;
    use uuid::Uuid;

    struct TestDeps;
    impl CalendarServiceDeps for TestDeps {
        type Transaction = dao::MockTransaction;
        type HolidayDao = MockHolidayDao;
    }

    fn build_user() -> User {
        User {
            id: Uuid::nil(),
            username: Arc::from("alice"),
            role: service::user::Role::Employee,
            weekly_hours: 40.0,
            work_schedule: None,
            hire_date: date!(2020 - 01 - 01),
            end_date: None,
            vacation_days_per_year: 25.0,
        }
    }

    #[tokio::test]
    async fn holiday_overrides_a_scheduled_workday() {
        let mut holiday_dao = MockHolidayDao::new();
        holiday_dao.expect_find_by_date().returning(|_| {
            Ok(Some(dao::holiday::HolidayEntity {
                date: date!(2024 - 05 - 01),
                name: Arc::from("Labor Day"),
                scope: Arc::from("national"),
            }))
        });
        let service = CalendarServiceImpl::<TestDeps> {
            holiday_dao: Arc::new(holiday_dao),
        };
        let hours = service
            .daily_target_hours(&build_user(), date!(2024 - 05 - 01))
            .await
            .unwrap();
        assert_eq!(hours, 0.0);
    }

    #[tokio::test]
    async fn work_schedule_entry_overrides_weekly_hours_average() {
        let mut holiday_dao = MockHolidayDao::new();
        holiday_dao.expect_find_by_date().returning(|_| Ok(None));
        let mut user = build_user();
        let mut schedule = BTreeMap::new();
        schedule.insert(ledger_utils::weekday::DayOfWeek::Wednesday, 6.0);
        user.work_schedule = Some(schedule);
        let service = CalendarServiceImpl::<TestDeps> {
            holiday_dao: Arc::new(holiday_dao),
        };
        // 2024-05-01 is a Wednesday.
        let hours = service
            .daily_target_hours(&user, date!(2024 - 05 - 01))
            .await
            .unwrap();
        assert_eq!(hours, 6.0);
    }

    #[tokio::test]
    async fn outside_employment_window_is_always_zero() {
        let mut holiday_dao = MockHolidayDao::new();
        holiday_dao.expect_find_by_date().returning(|_| Ok(None));
        let mut user = build_user();
        user.hire_date = date!(2024 - 06 - 01);
        let service = CalendarServiceImpl::<TestDeps> {
            holiday_dao: Arc::new(holiday_dao),
        };
        let hours = service
            .daily_target_hours(&user, date!(2024 - 05 - 01))
            .await
            .unwrap();
        assert_eq!(hours, 0.0);
    }
}
