use std::sync::Arc;

use dao_sqlite::{
    absence_request::AbsenceRequestDaoImpl, correction::CorrectionDaoImpl, holiday::HolidayDaoImpl,
    monthly_balance::MonthlyBalanceDaoImpl, overtime_transaction::OvertimeTransactionDaoImpl,
    rollover_lease::RolloverLeaseDaoImpl, time_entry::TimeEntryDaoImpl, user::UserDaoImpl,
    vacation_balance::VacationBalanceDaoImpl, TransactionDaoImpl, TransactionImpl,
};
use service::scheduler::SchedulerService;
use tracing_subscriber::fmt::format::FmtSpan;

type Transaction = TransactionImpl;
type TransactionDao = TransactionDaoImpl;

type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;
type ConfigService = service_impl::config::ConfigServiceImpl;
type EventBusService = service_impl::event_bus::EventBusServiceImpl;

pub struct UserServiceDependencies;
impl service_impl::user::UserServiceDeps for UserServiceDependencies {
    type Transaction = Transaction;
    type UserDao = UserDaoImpl;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type UserService = service_impl::user::UserServiceImpl<UserServiceDependencies>;

pub struct CalendarServiceDependencies;
impl service_impl::calendar::CalendarServiceDeps for CalendarServiceDependencies {
    type Transaction = Transaction;
    type HolidayDao = HolidayDaoImpl;
}
type CalendarService = service_impl::calendar::CalendarServiceImpl<CalendarServiceDependencies>;

pub struct TimeStoreServiceDependencies;
impl service_impl::time_store::TimeStoreServiceDeps for TimeStoreServiceDependencies {
    type Transaction = Transaction;
    type TimeEntryDao = TimeEntryDaoImpl;
    type CorrectionDao = CorrectionDaoImpl;
    type AbsenceRequestDao = AbsenceRequestDaoImpl;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type UserService = UserService;
    type TransactionDao = TransactionDao;
}
type TimeStoreService = service_impl::time_store::TimeStoreServiceImpl<TimeStoreServiceDependencies>;

pub struct JournalServiceDependencies;
impl service_impl::journal::JournalServiceDeps for JournalServiceDependencies {
    type Transaction = Transaction;
    type OvertimeTransactionDao = OvertimeTransactionDaoImpl;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type JournalService = service_impl::journal::JournalServiceImpl<JournalServiceDependencies>;

pub struct VacationServiceDependencies;
impl service_impl::vacation::VacationServiceDeps for VacationServiceDependencies {
    type Transaction = Transaction;
    type VacationBalanceDao = VacationBalanceDaoImpl;
    type TransactionDao = TransactionDao;
}
type VacationService = service_impl::vacation::VacationServiceImpl<VacationServiceDependencies>;

pub struct OrchestratorServiceDependencies;
impl service_impl::orchestrator::OrchestratorServiceDeps for OrchestratorServiceDependencies {
    type Transaction = Transaction;
    type TimeStoreService = TimeStoreService;
    type JournalService = JournalService;
    type CalendarService = CalendarService;
    type EventBusService = EventBusService;
    type ClockService = ClockService;
    type UserService = UserService;
    type MonthlyBalanceDao = MonthlyBalanceDaoImpl;
    type TransactionDao = TransactionDao;
}
type OrchestratorService = service_impl::orchestrator::OrchestratorServiceImpl<OrchestratorServiceDependencies>;

pub struct AbsenceServiceDependencies;
impl service_impl::absence::AbsenceServiceDeps for AbsenceServiceDependencies {
    type Transaction = Transaction;
    type AbsenceRequestDao = AbsenceRequestDaoImpl;
    type CalendarService = CalendarService;
    type VacationService = VacationService;
    type JournalService = JournalService;
    type OrchestratorService = OrchestratorService;
    type UserService = UserService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type AbsenceService = service_impl::absence::AbsenceServiceImpl<AbsenceServiceDependencies>;

pub struct ReportingServiceDependencies;
impl service_impl::reporting::ReportingServiceDeps for ReportingServiceDependencies {
    type Transaction = Transaction;
    type UserService = UserService;
    type CalendarService = CalendarService;
    type TimeStoreService = TimeStoreService;
    type MonthlyBalanceDao = MonthlyBalanceDaoImpl;
    type ClockService = ClockService;
    type TransactionDao = TransactionDao;
}
type ReportingService = service_impl::reporting::ReportingServiceImpl<ReportingServiceDependencies>;

pub struct RolloverServiceDependencies;
impl service_impl::rollover::RolloverServiceDeps for RolloverServiceDependencies {
    type Transaction = Transaction;
    type UserService = UserService;
    type JournalService = JournalService;
    type VacationBalanceDao = VacationBalanceDaoImpl;
    type RolloverLeaseDao = RolloverLeaseDaoImpl;
    type ConfigService = ConfigService;
    type ClockService = ClockService;
    type TransactionDao = TransactionDao;
}
type RolloverService = service_impl::rollover::RolloverServiceImpl<RolloverServiceDependencies>;

pub struct SchedulerServiceDependencies;
impl service_impl::scheduler::SchedulerServiceDeps for SchedulerServiceDependencies {
    type Transaction = Transaction;
    type RolloverService = RolloverService;
}
type SchedulerServiceImpl = service_impl::scheduler::SchedulerServiceImpl<SchedulerServiceDependencies>;

#[derive(Clone)]
pub struct RestStateImpl {
    time_store_service: Arc<TimeStoreService>,
    absence_service: Arc<AbsenceService>,
    vacation_service: Arc<VacationService>,
    journal_service: Arc<JournalService>,
    reporting_service: Arc<ReportingService>,
    event_bus_service: Arc<EventBusService>,
}
impl rest::RestStateDef for RestStateImpl {
    type TimeStoreService = TimeStoreService;
    type AbsenceService = AbsenceService;
    type VacationService = VacationService;
    type JournalService = JournalService;
    type ReportingService = ReportingService;
    type EventBusService = EventBusService;

    fn time_store_service(&self) -> Arc<Self::TimeStoreService> {
        self.time_store_service.clone()
    }
    fn absence_service(&self) -> Arc<Self::AbsenceService> {
        self.absence_service.clone()
    }
    fn vacation_service(&self) -> Arc<Self::VacationService> {
        self.vacation_service.clone()
    }
    fn journal_service(&self) -> Arc<Self::JournalService> {
        self.journal_service.clone()
    }
    fn reporting_service(&self) -> Arc<Self::ReportingService> {
        self.reporting_service.clone()
    }
    fn event_bus_service(&self) -> Arc<Self::EventBusService> {
        self.event_bus_service.clone()
    }
}

struct Services {
    rest_state: RestStateImpl,
    scheduler_service: SchedulerServiceImpl,
}

fn wire(pool: Arc<sqlx::SqlitePool>) -> Services {
    let transaction_dao = Arc::new(TransactionDao::new(pool.clone()));
    let clock_service = Arc::new(ClockService::new(
        &std::env::var("TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
    ));
    let uuid_service = Arc::new(service_impl::uuid_service::UuidServiceImpl);
    let config_service = Arc::new(service_impl::config::ConfigServiceImpl);
    let event_bus_service = Arc::new(EventBusService::new());

    let user_dao = Arc::new(UserDaoImpl::new(pool.clone()));
    let holiday_dao = Arc::new(HolidayDaoImpl::new(pool.clone()));
    let time_entry_dao = Arc::new(TimeEntryDaoImpl::new(pool.clone()));
    let correction_dao = Arc::new(CorrectionDaoImpl::new(pool.clone()));
    let absence_request_dao = Arc::new(AbsenceRequestDaoImpl::new(pool.clone()));
    let overtime_transaction_dao = Arc::new(OvertimeTransactionDaoImpl::new(pool.clone()));
    let monthly_balance_dao = Arc::new(MonthlyBalanceDaoImpl::new(pool.clone()));
    let vacation_balance_dao = Arc::new(VacationBalanceDaoImpl::new(pool.clone()));
    let rollover_lease_dao = Arc::new(RolloverLeaseDaoImpl::new(pool.clone()));

    let user_service = Arc::new(UserService {
        user_dao,
        clock_service: clock_service.clone(),
        uuid_service: uuid_service.clone(),
        transaction_dao: transaction_dao.clone(),
    });
    let calendar_service = Arc::new(CalendarService { holiday_dao });
    let time_store_service = Arc::new(TimeStoreService {
        time_entry_dao,
        correction_dao,
        absence_request_dao: absence_request_dao.clone(),
        clock_service: clock_service.clone(),
        uuid_service: uuid_service.clone(),
        user_service: user_service.clone(),
        transaction_dao: transaction_dao.clone(),
    });
    let journal_service = Arc::new(JournalService {
        overtime_transaction_dao,
        clock_service: clock_service.clone(),
        uuid_service: uuid_service.clone(),
        transaction_dao: transaction_dao.clone(),
    });
    let vacation_service = Arc::new(VacationService {
        vacation_balance_dao: vacation_balance_dao.clone(),
        transaction_dao: transaction_dao.clone(),
    });
    let orchestrator_service = Arc::new(OrchestratorService {
        time_store_service: time_store_service.clone(),
        journal_service: journal_service.clone(),
        calendar_service: calendar_service.clone(),
        event_bus_service: event_bus_service.clone(),
        clock_service: clock_service.clone(),
        user_service: user_service.clone(),
        monthly_balance_dao: monthly_balance_dao.clone(),
        transaction_dao: transaction_dao.clone(),
        user_locks: Arc::new(service_impl::orchestrator::UserLocks::new()),
    });
    let absence_service = Arc::new(AbsenceService {
        absence_request_dao,
        calendar_service: calendar_service.clone(),
        vacation_service: vacation_service.clone(),
        journal_service: journal_service.clone(),
        orchestrator_service: orchestrator_service.clone(),
        user_service: user_service.clone(),
        clock_service: clock_service.clone(),
        uuid_service: uuid_service.clone(),
        transaction_dao: transaction_dao.clone(),
    });
    let reporting_service = Arc::new(ReportingService {
        user_service: user_service.clone(),
        calendar_service: calendar_service.clone(),
        time_store_service: time_store_service.clone(),
        monthly_balance_dao,
        clock_service: clock_service.clone(),
        transaction_dao: transaction_dao.clone(),
    });
    let rollover_service = Arc::new(RolloverService {
        user_service: user_service.clone(),
        journal_service: journal_service.clone(),
        vacation_balance_dao,
        rollover_lease_dao,
        config_service,
        clock_service,
        transaction_dao,
    });
    let scheduler_service = SchedulerServiceImpl::new(rollover_service);

    Services {
        rest_state: RestStateImpl {
            time_store_service,
            absence_service,
            vacation_service,
            journal_service,
            reporting_service,
            event_bus_service,
        },
        scheduler_service,
    }
}

#[cfg(feature = "json_logging")]
fn init_logging() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

#[cfg(not(feature = "json_logging"))]
fn init_logging() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_span_events(FmtSpan::CLOSE)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

#[tokio::main]
async fn main() {
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    tracing::info!(version, "starting overtime accounting engine");

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./ledger.sqlite3".to_string());
    let pool = Arc::new(
        dao_sqlite::connect(&database_url)
            .await
            .expect("could not open the ledger database"),
    );

    let services = wire(pool);

    services
        .scheduler_service
        .start()
        .await
        .expect("could not start the year-end rollover scheduler");

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    rest::start_server(services.rest_state, &bind_addr).await;
}
