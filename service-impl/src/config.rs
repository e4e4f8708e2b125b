use std::{env, sync::Arc};

use async_trait::async_trait;
use service::{
    config::{ConfigService, EngineConfig},
    ServiceError,
};

pub struct ConfigServiceImpl;

#[async_trait]
impl ConfigService for ConfigServiceImpl {
    async fn get_config(&self) -> Result<EngineConfig, ServiceError> {
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let default_weekly_hours = env::var("DEFAULT_WEEKLY_HOURS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(40.0);
        let vacation_carryover_cap = env::var("VACATION_CARRYOVER_CAP")
            .ok()
            .and_then(|value| value.parse().ok());

        Ok(EngineConfig {
            timezone: Arc::from(timezone),
            default_weekly_hours,
            vacation_carryover_cap,
        })
    }
}
