use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Local};
use service::{rollover::RolloverService, scheduler::SchedulerService, ServiceError};
use tokio::sync::Mutex;
use tokio_cron::{Job, Scheduler};
use tracing::{error, info};

use crate::gen_service_impl;

/// 00:05 on January 1st, local civil time (spec §4.7 trigger).
const ROLLOVER_CRON: &str = "0 5 0 1 1 *";

gen_service_impl! {
    struct SchedulerServiceImpl: SchedulerService = SchedulerServiceDeps {
        RolloverService: RolloverService = rollover_service,
    }
    ; custom_fields {
        scheduler: Arc<Mutex<Scheduler<Local>>> = scheduler,
    }
}

impl<Deps: SchedulerServiceDeps> SchedulerServiceImpl<Deps> {
    pub fn new(rollover_service: Arc<Deps::RolloverService>) -> Self {
        Self {
            rollover_service,
            scheduler: Arc::new(Mutex::new(Scheduler::local())),
        }
    }
}

#[async_trait]
impl<Deps: SchedulerServiceDeps> SchedulerService for SchedulerServiceImpl<Deps>
where
    Deps::RolloverService: 'static,
{
    async fn start(&self) -> Result<(), ServiceError> {
        let rollover_service = self.rollover_service.clone();
        {
            let mut scheduler = self.scheduler.lock().await;
            scheduler.add(Job::new(ROLLOVER_CRON, move || {
                let rollover_service = rollover_service.clone();
                async move {
                    let completed_year = Local::now().year() as u32 - 1;
                    match rollover_service.run_for_year(completed_year).await {
                        Ok(count) => info!(year = completed_year, rolled = count, "year-end rollover completed"),
                        Err(error) => error!(year = completed_year, %error, "year-end rollover failed"),
                    }
                }
            }));
        }
        info!(cron = ROLLOVER_CRON, "scheduled year-end rollover job");

        Ok(())
    }
}
