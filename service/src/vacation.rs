use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VacationBalance {
    pub user_id: Uuid,
    pub year: u32,
    pub entitlement: f32,
    pub carryover: f32,
    pub taken: f32,
    pub pending: f32,
}
impl VacationBalance {
    pub fn remaining(&self) -> f32 {
        self.entitlement + self.carryover - self.taken - self.pending
    }
}
impl From<&dao::vacation_balance::VacationBalanceEntity> for VacationBalance {
    fn from(entity: &dao::vacation_balance::VacationBalanceEntity) -> Self {
        Self {
            user_id: entity.user_id,
            year: entity.year,
            entitlement: entity.entitlement,
            carryover: entity.carryover,
            taken: entity.taken,
            pending: entity.pending,
        }
    }
}
ledger_utils::derive_from_reference!(dao::vacation_balance::VacationBalanceEntity, VacationBalance);

/// `taken`/`pending` are counted in vacation days, not hours, and only
/// `vacation`-type absences move them - `overtime_comp`, `sick`, `special`
/// and `unpaid` never touch this balance.
#[automock]
#[async_trait]
pub trait VacationService {
    async fn get(&self, user_id: Uuid, year: u32) -> Result<VacationBalance, ServiceError>;

    async fn on_vacation_requested(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError>;
    async fn on_vacation_approved(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError>;
    async fn on_vacation_rejected(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError>;
    async fn on_vacation_revoked(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError>;
}
