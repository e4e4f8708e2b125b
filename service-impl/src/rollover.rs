use std::sync::Arc;

use async_trait::async_trait;
use dao::{rollover_lease::RolloverLeaseDao, vacation_balance::VacationBalanceDao, TransactionDao};
use service::{
    clock::ClockService,
    config::ConfigService,
    journal::{JournalService, NewTransaction, TransactionType},
    rollover::{RolloverOutcome, RolloverService},
    user::UserService,
    ServiceError,
};
use time::Date;
use uuid::Uuid;

use crate::gen_service_impl;

const ROLLOVER_PROCESS: &str = "rollover-service";

gen_service_impl! {
    struct RolloverServiceImpl: RolloverService = RolloverServiceDeps {
        UserService: UserService = user_service,
        JournalService: JournalService = journal_service,
        VacationBalanceDao: VacationBalanceDao<Transaction = Self::Transaction> = vacation_balance_dao,
        RolloverLeaseDao: RolloverLeaseDao = rollover_lease_dao,
        ConfigService: ConfigService = config_service,
        ClockService: ClockService = clock_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: RolloverServiceDeps> RolloverService for RolloverServiceImpl<Deps> {
    async fn run_for_year(&self, year: u32) -> Result<u32, ServiceError> {
        let lease = dao::rollover_lease::RolloverLeaseEntity {
            year,
            locked_at: self.clock_service.now(),
            locked_by: Arc::from(ROLLOVER_PROCESS),
        };
        if !self.rollover_lease_dao.try_acquire(&lease).await? {
            return Ok(0);
        }

        let dec_31 = Date::from_calendar_date(year as i32, time::Month::December, 31)
            .map_err(|_| ServiceError::InvalidInput("invalid rollover year".into()))?;

        let mut rolled = 0;
        for user in self.user_service.all().await?.iter() {
            if user.hire_date > dec_31 {
                continue;
            }
            let outcome = self.run_for_user(user.id, year).await?;
            if !outcome.already_done {
                rolled += 1;
            }
        }

        self.rollover_lease_dao.release(year).await?;
        Ok(rolled)
    }

    async fn run_for_user(&self, user_id: Uuid, year: u32) -> Result<RolloverOutcome, ServiceError> {
        let dec_31 = Date::from_calendar_date(year as i32, time::Month::December, 31)
            .map_err(|_| ServiceError::InvalidInput("invalid rollover year".into()))?;
        let jan_1_next = Date::from_calendar_date(year as i32 + 1, time::Month::January, 1)
            .map_err(|_| ServiceError::InvalidInput("invalid rollover year".into()))?;

        let already_done = self
            .journal_service
            .list(user_id, Some(jan_1_next), Some(jan_1_next))
            .await?
            .iter()
            .any(|entry| entry.tx_type == TransactionType::Carryover);
        if already_done {
            let end_of_year_balance = self.journal_service.balance_as_of(user_id, Some(dec_31)).await?;
            return Ok(RolloverOutcome {
                end_of_year_balance,
                vacation_carryover: 0.0,
                already_done: true,
            });
        }

        let user = self
            .user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id} not found").into()))?;

        let end_of_year_balance = self.journal_service.balance_as_of(user_id, Some(dec_31)).await?;

        // The chain already carries the balance forward; this entry exists only
        // as a resumability marker (spec §4.7 step 2).
        self.journal_service
            .append(NewTransaction {
                user_id,
                date: jan_1_next,
                tx_type: TransactionType::Carryover,
                hours: 0.0,
                reference_kind: Some(Arc::from("rollover")),
                reference_id: Some(Arc::from(year.to_string())),
                description: Arc::from(format!("year {year} closed with balance {end_of_year_balance:.2}h")),
                created_by: Some(Arc::from(ROLLOVER_PROCESS)),
            })
            .await?;

        let config = self.config_service.get_config().await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        let prior = self
            .vacation_balance_dao
            .find(user_id, year, tx.clone())
            .await?;
        let remaining = prior
            .map(|balance| balance.entitlement + balance.carryover - balance.taken - balance.pending)
            .unwrap_or(0.0);
        let mut vacation_carryover = remaining.max(0.0);
        if let Some(cap) = config.vacation_carryover_cap {
            vacation_carryover = vacation_carryover.min(cap);
        }

        self.vacation_balance_dao
            .upsert(
                &dao::vacation_balance::VacationBalanceEntity {
                    user_id,
                    year: year + 1,
                    entitlement: user.vacation_days_per_year,
                    carryover: vacation_carryover,
                    taken: 0.0,
                    pending: 0.0,
                },
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;

        Ok(RolloverOutcome {
            end_of_year_balance,
            vacation_carryover,
            already_done: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::rollover_lease::MockRolloverLeaseDao;
    use dao::vacation_balance::MockVacationBalanceDao;
    use service::journal::{MockJournalService, OvertimeTransaction};
    use service::user::{MockUserService, Role, User};
    use time::macros::{date, datetime};

    struct TestDeps;
    impl RolloverServiceDeps for TestDeps {
        type Transaction = dao::MockTransaction;
        type UserService = MockUserService;
        type JournalService = MockJournalService;
        type VacationBalanceDao = MockVacationBalanceDao;
        type RolloverLeaseDao = MockRolloverLeaseDao;
        type ConfigService = service::config::MockConfigService;
        type ClockService = service::clock::MockClockService;
        type TransactionDao = dao::MockTransactionDao;
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
    async fn run_for_user_skips_rewriting_an_already_present_carryover_marker() {
        let mut journal_service = MockJournalService::new();
        journal_service.expect_list().returning(|_, _, _| {
            Ok(Arc::from(vec![OvertimeTransaction {
                id: Uuid::nil(),
                user_id: Uuid::nil(),
                date: date!(2025 - 01 - 01),
                tx_type: TransactionType::Carryover,
                hours: 0.0,
                balance_before: 3.0,
                balance_after: 3.0,
                reference_kind: Some(Arc::from("rollover")),
                reference_id: Some(Arc::from("2024")),
                description: Arc::from("year 2024 closed with balance 3.00h"),
                created_by: Some(Arc::from(ROLLOVER_PROCESS)),
                created_at: datetime!(2025-01-01 00:05),
            }]))
        });
        journal_service.expect_balance_as_of().returning(|_, _| Ok(3.0));

        let service = RolloverServiceImpl::<TestDeps> {
            user_service: Arc::new(MockUserService::new()),
            journal_service: Arc::new(journal_service),
            vacation_balance_dao: Arc::new(MockVacationBalanceDao::new()),
            rollover_lease_dao: Arc::new(MockRolloverLeaseDao::new()),
            config_service: Arc::new(service::config::MockConfigService::new()),
            clock_service: Arc::new(service::clock::MockClockService::new()),
            transaction_dao: Arc::new(dao::MockTransactionDao::new()),
        };

        let outcome = service.run_for_user(Uuid::nil(), 2024).await.unwrap();
        assert!(outcome.already_done);
        assert_eq!(outcome.end_of_year_balance, 3.0);
    }

    #[tokio::test]
    async fn run_for_user_caps_vacation_carryover_at_the_configured_limit() {
        let mut journal_service = MockJournalService::new();
        journal_service.expect_list().returning(|_, _, _| Ok(Arc::from(vec![])));
        journal_service.expect_balance_as_of().returning(|_, _| Ok(6.5));
        journal_service.expect_append().returning(|new_tx| {
            Ok(OvertimeTransaction {
                id: Uuid::nil(),
                user_id: new_tx.user_id,
                date: new_tx.date,
                tx_type: new_tx.tx_type,
                hours: new_tx.hours,
                balance_before: 6.5,
                balance_after: 6.5,
                reference_kind: new_tx.reference_kind,
                reference_id: new_tx.reference_id,
                description: new_tx.description,
                created_by: new_tx.created_by,
                created_at: datetime!(2025-01-01 00:05),
            })
        });

        let mut user_service = MockUserService::new();
        user_service.expect_find_by_id().returning(|_| Ok(Some(build_user())));

        let mut vacation_balance_dao = MockVacationBalanceDao::new();
        vacation_balance_dao.expect_find().returning(|_, _, _| {
            Ok(Some(dao::vacation_balance::VacationBalanceEntity {
                user_id: Uuid::nil(),
                year: 2024,
                entitlement: 25.0,
                carryover: 0.0,
                taken: 10.0,
                pending: 0.0,
            }))
        });
        vacation_balance_dao.expect_upsert().returning(|_, _| Ok(()));

        let mut config_service = service::config::MockConfigService::new();
        config_service.expect_get_config().returning(|| {
            Ok(service::config::EngineConfig {
                timezone: Arc::from("UTC"),
                default_weekly_hours: 40.0,
                vacation_carryover_cap: Some(5.0),
            })
        });

        let mut transaction_dao = dao::MockTransactionDao::new();
        transaction_dao
            .expect_use_transaction()
            .returning(|_| Ok(dao::MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        let service = RolloverServiceImpl::<TestDeps> {
            user_service: Arc::new(user_service),
            journal_service: Arc::new(journal_service),
            vacation_balance_dao: Arc::new(vacation_balance_dao),
            rollover_lease_dao: Arc::new(MockRolloverLeaseDao::new()),
            config_service: Arc::new(config_service),
            clock_service: Arc::new(service::clock::MockClockService::new()),
            transaction_dao: Arc::new(transaction_dao),
        };

        let outcome = service.run_for_user(Uuid::nil(), 2024).await.unwrap();
        assert!(!outcome.already_done);
        // remaining = 25 + 0 - 10 - 0 = 15, capped to 5.
        assert_eq!(outcome.vacation_carryover, 5.0);
    }
}
