use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Immutable, created once at startup and threaded through everywhere a
/// component needs it. Hot-reload is not required.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub timezone: Arc<str>,
    /// Default weekly hours used when seeding a user with no explicit
    /// schedule; the per-user `weekly_hours` value set on the entity always
    /// takes precedence once the user exists.
    pub default_weekly_hours: f32,
    /// Cap applied to vacation-day carryover at year-end rollover. `None`
    /// means uncapped.
    pub vacation_carryover_cap: Option<f32>,
}

#[automock]
#[async_trait]
pub trait ConfigService {
    async fn get_config(&self) -> Result<EngineConfig, ServiceError>;
}
