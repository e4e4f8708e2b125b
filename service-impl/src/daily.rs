use service::{calendar::CalendarService, time_store::TimeStoreService, user::User, ServiceError};
use time::Date;

/// Result of the pure per-day computation (spec's Daily Calculator). Broken
/// into the components the orchestrator turns into individual journal
/// entries rather than one net figure, so the ledger keeps `earned` /
/// `absence_credit` / `correction` visible separately. Unpaid leave has no
/// entry of its own; it is folded into `earned_delta` by reducing
/// `effective_target` to zero for the day.
/// `earned_delta + absence_credit + correction_total` always equals
/// `overtime`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayComputation {
    pub target: f64,
    pub effective_target: f64,
    pub worked: f64,
    pub earned_delta: f64,
    pub absence_credit: f64,
    pub correction_total: f64,
    pub actual: f64,
    pub overtime: f64,
}

/// Consults the calendar and time store for `(user, date)` and derives the
/// day's overtime breakdown. Unpaid leave always wins over a simultaneous
/// paid absence on the same day (spec P5): it zeroes the effective target
/// and grants no credit, regardless of what else is recorded that day.
pub async fn compute_day(
    time_store: &(impl TimeStoreService + ?Sized),
    calendar: &(impl CalendarService + ?Sized),
    user: &User,
    date: Date,
) -> Result<DayComputation, ServiceError> {
    let target = calendar.daily_target_hours(user, date).await?;
    let worked = time_store.worked(user.id, date).await?;
    let absences = time_store.active_absence_types(user.id, date).await?;
    let corrections = time_store.corrections(user.id, date).await?;
    let correction_total: f64 = corrections.iter().map(|correction| correction.hours as f64).sum();

    let has_unpaid = absences.iter().any(|absence_type| !absence_type.is_paid());
    let has_paid_credit = absences.iter().any(|absence_type| absence_type.is_paid());

    let effective_target = if has_unpaid { 0.0 } else { target };
    let absence_credit = if has_paid_credit && target > 0.0 && !has_unpaid {
        target
    } else {
        0.0
    };
    let earned_delta = worked - effective_target;
    let actual = worked + absence_credit + correction_total;
    let overtime = actual - effective_target;

    Ok(DayComputation {
        target,
        effective_target,
        worked,
        earned_delta,
        absence_credit,
        correction_total,
        actual,
        overtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::absence::AbsenceType;
    use service::calendar::MockCalendarService;
    use service::time_store::MockTimeStoreService;
    use std::sync::Arc;
    use time::macros::date;
    use uuid::Uuid;

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

    fn component_sum(day: &DayComputation) -> f64 {
        day.earned_delta + day.absence_credit + day.correction_total
    }

    #[tokio::test]
    async fn ordinary_workday_overtime_equals_worked_minus_target() {
        let mut time_store = MockTimeStoreService::new();
        time_store.expect_worked().returning(|_, _| Ok(9.0));
        time_store
            .expect_active_absence_types()
            .returning(|_, _| Ok(Arc::from(vec![])));
        time_store.expect_corrections().returning(|_, _| Ok(Arc::from(vec![])));
        let mut calendar = MockCalendarService::new();
        calendar.expect_daily_target_hours().returning(|_, _| Ok(8.0));

        let day = compute_day(&time_store, &calendar, &build_user(), date!(2024 - 05 - 01))
            .await
            .unwrap();
        assert_eq!(day.overtime, 1.0);
        assert_eq!(day.overtime, component_sum(&day));
    }

    #[tokio::test]
    async fn paid_absence_credits_exactly_the_scheduled_target() {
        let mut time_store = MockTimeStoreService::new();
        time_store.expect_worked().returning(|_, _| Ok(0.0));
        time_store
            .expect_active_absence_types()
            .returning(|_, _| Ok(Arc::from(vec![AbsenceType::Vacation])));
        time_store.expect_corrections().returning(|_, _| Ok(Arc::from(vec![])));
        let mut calendar = MockCalendarService::new();
        calendar.expect_daily_target_hours().returning(|_, _| Ok(8.0));

        let day = compute_day(&time_store, &calendar, &build_user(), date!(2024 - 05 - 01))
            .await
            .unwrap();
        assert_eq!(day.overtime, 0.0);
        assert_eq!(day.overtime, component_sum(&day));
    }

    #[tokio::test]
    async fn unpaid_leave_wins_over_a_simultaneous_paid_absence() {
        let mut time_store = MockTimeStoreService::new();
        time_store.expect_worked().returning(|_, _| Ok(0.0));
        time_store.expect_active_absence_types().returning(|_, _| {
            Ok(Arc::from(vec![AbsenceType::Unpaid, AbsenceType::Sick]))
        });
        time_store.expect_corrections().returning(|_, _| Ok(Arc::from(vec![])));
        let mut calendar = MockCalendarService::new();
        calendar.expect_daily_target_hours().returning(|_, _| Ok(8.0));

        let day = compute_day(&time_store, &calendar, &build_user(), date!(2024 - 05 - 01))
            .await
            .unwrap();
        assert_eq!(day.effective_target, 0.0);
        assert_eq!(day.absence_credit, 0.0);
        assert_eq!(day.overtime, 0.0);
        assert_eq!(day.overtime, component_sum(&day));
    }

    #[tokio::test]
    async fn corrections_apply_regardless_of_the_day_being_a_working_day() {
        let mut time_store = MockTimeStoreService::new();
        time_store.expect_worked().returning(|_, _| Ok(0.0));
        time_store
            .expect_active_absence_types()
            .returning(|_, _| Ok(Arc::from(vec![])));
        time_store.expect_corrections().returning(|_, _| {
            Ok(Arc::from(vec![service::time_store::Correction {
                id: Uuid::nil(),
                user_id: Uuid::nil(),
                date: date!(2024 - 05 - 04),
                hours: 1.5,
                reason: Arc::from("manual adjustment"),
                created_by: Arc::from("admin"),
                created_at: time::PrimitiveDateTime::new(
                    date!(2024 - 05 - 04),
                    time::Time::MIDNIGHT,
                ),
            }]))
        });
        let mut calendar = MockCalendarService::new();
        calendar.expect_daily_target_hours().returning(|_, _| Ok(0.0));

        let day = compute_day(&time_store, &calendar, &build_user(), date!(2024 - 05 - 04))
            .await
            .unwrap();
        assert_eq!(day.overtime, 1.5);
        assert_eq!(day.overtime, component_sum(&day));
    }
}
