use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyBreakdown {
    pub date: Date,
    pub target: f64,
    pub actual: f64,
    pub overtime: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthlyBreakdown {
    pub year: u32,
    pub month: u8,
    pub target: f64,
    pub actual: f64,
    pub overtime: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OvertimeReport {
    pub user_id: Uuid,
    pub year: u32,
    pub month: Option<u8>,
    pub daily: Arc<[DailyBreakdown]>,
    pub monthly: Arc<[MonthlyBreakdown]>,
    pub summary_overtime: f64,
}

/// Computed live from raw inputs and cross-checked against the monthly
/// cache (spec §6 `GET /reports/overtime`). Returns
/// `ServiceError::Inconsistent` rather than stale data when the two
/// disagree by more than 0.01h, so a caller never silently serves a wrong
/// balance.
#[automock]
#[async_trait]
pub trait ReportingService {
    async fn overtime_report(
        &self,
        user_id: Uuid,
        year: u32,
        month: Option<u8>,
    ) -> Result<OvertimeReport, ServiceError>;
}
