use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;
use utoipa::ToSchema;

#[cfg(feature = "service-impl")]
use service::{
    absence::{AbsenceDecision, AbsenceRequest, AbsenceStatus, AbsenceType},
    journal::{OvertimeTransaction, TransactionType},
    reporting::{DailyBreakdown, MonthlyBreakdown, OvertimeReport},
    time_store::{Correction, TimeEntry},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeEntryTO {
    #[serde(default)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub hours: f32,
}
#[cfg(feature = "service-impl")]
impl From<&TimeEntry> for TimeEntryTO {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            date: entry.date,
            hours: entry.hours,
        }
    }
}

/// Response to `POST /time-entries`: the stored entry plus the user's
/// monthly overtime immediately after the mutation (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeEntryResultTO {
    pub entry: TimeEntryTO,
    pub month_overtime_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceTypeTO {
    Vacation,
    Sick,
    OvertimeComp,
    Special,
    Unpaid,
}
#[cfg(feature = "service-impl")]
impl From<AbsenceType> for AbsenceTypeTO {
    fn from(value: AbsenceType) -> Self {
        match value {
            AbsenceType::Vacation => Self::Vacation,
            AbsenceType::Sick => Self::Sick,
            AbsenceType::OvertimeComp => Self::OvertimeComp,
            AbsenceType::Special => Self::Special,
            AbsenceType::Unpaid => Self::Unpaid,
        }
    }
}
#[cfg(feature = "service-impl")]
impl From<AbsenceTypeTO> for AbsenceType {
    fn from(value: AbsenceTypeTO) -> Self {
        match value {
            AbsenceTypeTO::Vacation => Self::Vacation,
            AbsenceTypeTO::Sick => Self::Sick,
            AbsenceTypeTO::OvertimeComp => Self::OvertimeComp,
            AbsenceTypeTO::Special => Self::Special,
            AbsenceTypeTO::Unpaid => Self::Unpaid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatusTO {
    Pending,
    Approved,
    Rejected,
}
#[cfg(feature = "service-impl")]
impl From<AbsenceStatus> for AbsenceStatusTO {
    fn from(value: AbsenceStatus) -> Self {
        match value {
            AbsenceStatus::Pending => Self::Pending,
            AbsenceStatus::Approved => Self::Approved,
            AbsenceStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AbsenceRequestTO {
    #[serde(default)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub absence_type: AbsenceTypeTO,
    pub start_date: Date,
    pub end_date: Date,
    pub status: AbsenceStatusTO,
    pub decided_by: Option<Arc<str>>,
    #[serde(default)]
    pub decided_at: Option<PrimitiveDateTime>,
    pub reason: Option<Arc<str>>,
}
#[cfg(feature = "service-impl")]
impl From<&AbsenceRequest> for AbsenceRequestTO {
    fn from(request: &AbsenceRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            absence_type: request.absence_type.into(),
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status.into(),
            decided_by: request.decided_by.clone(),
            decided_at: request.decided_at,
            reason: request.reason.clone(),
        }
    }
}

/// Body of `POST /absences`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewAbsenceRequestTO {
    pub user_id: Uuid,
    pub absence_type: AbsenceTypeTO,
    pub start_date: Date,
    pub end_date: Date,
    pub reason: Option<Arc<str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceDecisionActionTO {
    Approve,
    Reject,
    Reset,
}
#[cfg(feature = "service-impl")]
impl From<AbsenceDecisionActionTO> for AbsenceDecision {
    fn from(value: AbsenceDecisionActionTO) -> Self {
        match value {
            AbsenceDecisionActionTO::Approve => Self::Approve,
            AbsenceDecisionActionTO::Reject => Self::Reject,
            AbsenceDecisionActionTO::Reset => Self::Reset,
        }
    }
}

/// Body of `POST /absences/{id}/decision`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AbsenceDecisionTO {
    pub action: AbsenceDecisionActionTO,
    #[serde(default)]
    pub note: Option<Arc<str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionTypeTO {
    Earned,
    AbsenceCredit,
    UnpaidAdjust,
    Compensation,
    Correction,
    Carryover,
}
#[cfg(feature = "service-impl")]
impl From<TransactionType> for TransactionTypeTO {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Earned => Self::Earned,
            TransactionType::AbsenceCredit => Self::AbsenceCredit,
            TransactionType::UnpaidAdjust => Self::UnpaidAdjust,
            TransactionType::Compensation => Self::Compensation,
            TransactionType::Correction => Self::Correction,
            TransactionType::Carryover => Self::Carryover,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OvertimeTransactionTO {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub tx_type: TransactionTypeTO,
    pub hours: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub description: Arc<str>,
}
#[cfg(feature = "service-impl")]
impl From<&OvertimeTransaction> for OvertimeTransactionTO {
    fn from(tx: &OvertimeTransaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            date: tx.date,
            tx_type: tx.tx_type.into(),
            hours: tx.hours,
            balance_before: tx.balance_before,
            balance_after: tx.balance_after,
            description: tx.description.clone(),
        }
    }
}

/// Body of `POST /overtime-corrections`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCorrectionTO {
    pub user_id: Uuid,
    pub date: Date,
    pub hours: f32,
    pub reason: Arc<str>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorrectionTO {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub hours: f32,
    pub reason: Arc<str>,
    pub created_by: Arc<str>,
}
#[cfg(feature = "service-impl")]
impl From<&Correction> for CorrectionTO {
    fn from(correction: &Correction) -> Self {
        Self {
            id: correction.id,
            user_id: correction.user_id,
            date: correction.date,
            hours: correction.hours,
            reason: correction.reason.clone(),
            created_by: correction.created_by.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct DailyBreakdownTO {
    pub date: Date,
    pub target: f64,
    pub actual: f64,
    pub overtime: f64,
}
#[cfg(feature = "service-impl")]
impl From<&DailyBreakdown> for DailyBreakdownTO {
    fn from(daily: &DailyBreakdown) -> Self {
        Self {
            date: daily.date,
            target: daily.target,
            actual: daily.actual,
            overtime: daily.overtime,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct MonthlyBreakdownTO {
    pub year: u32,
    pub month: u8,
    pub target: f64,
    pub actual: f64,
    pub overtime: f64,
}
#[cfg(feature = "service-impl")]
impl From<&MonthlyBreakdown> for MonthlyBreakdownTO {
    fn from(monthly: &MonthlyBreakdown) -> Self {
        Self {
            year: monthly.year,
            month: monthly.month,
            target: monthly.target,
            actual: monthly.actual,
            overtime: monthly.overtime,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OvertimeReportTO {
    pub user_id: Uuid,
    pub year: u32,
    pub month: Option<u8>,
    pub daily: Arc<[DailyBreakdownTO]>,
    pub monthly: Arc<[MonthlyBreakdownTO]>,
    pub summary_overtime: f64,
}
#[cfg(feature = "service-impl")]
impl From<&OvertimeReport> for OvertimeReportTO {
    fn from(report: &OvertimeReport) -> Self {
        Self {
            user_id: report.user_id,
            year: report.year,
            month: report.month,
            daily: report.daily.iter().map(DailyBreakdownTO::from).collect(),
            monthly: report.monthly.iter().map(MonthlyBreakdownTO::from).collect(),
            summary_overtime: report.summary_overtime,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReportQueryTO {
    pub user: Uuid,
    pub year: u32,
    pub month: Option<u8>,
}

/// Query-parameter deserialization target for `GET /reports/overtime`.
/// `axum::extract::Query` always decodes into owned `String`s first, so
/// plain `u32`/`u8` fields here are fine - the numeric parse happens in
/// serde, not the handler.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessageTO {
    #[serde(rename = "auth:success")]
    AuthSuccess,
    Event {
        kind: Arc<str>,
        user_id: Uuid,
        data: Arc<str>,
        timestamp: PrimitiveDateTime,
    },
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessageTO {
    Auth { user_id: Uuid },
}
