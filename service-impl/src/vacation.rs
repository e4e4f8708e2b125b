use async_trait::async_trait;
use dao::{vacation_balance::VacationBalanceDao, TransactionDao};
use service::{
    vacation::{VacationBalance, VacationService},
    ServiceError,
};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct VacationServiceImpl: VacationService = VacationServiceDeps {
        VacationBalanceDao: VacationBalanceDao<Transaction = Self::Transaction> = vacation_balance_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

impl<Deps: VacationServiceDeps> VacationServiceImpl<Deps> {
    async fn adjust(&self, user_id: Uuid, year: u32, f: impl FnOnce(&mut dao::vacation_balance::VacationBalanceEntity)) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let mut entity = self
            .vacation_balance_dao
            .find(user_id, year, tx.clone())
            .await?
            .unwrap_or(dao::vacation_balance::VacationBalanceEntity {
                user_id,
                year,
                entitlement: 0.0,
                carryover: 0.0,
                taken: 0.0,
                pending: 0.0,
            });
        f(&mut entity);
        self.vacation_balance_dao.upsert(&entity, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}

#[async_trait]
impl<Deps: VacationServiceDeps> VacationService for VacationServiceImpl<Deps> {
    async fn get(&self, user_id: Uuid, year: u32) -> Result<VacationBalance, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let entity = self
            .vacation_balance_dao
            .find(user_id, year, tx.clone())
            .await?
            .unwrap_or(dao::vacation_balance::VacationBalanceEntity {
                user_id,
                year,
                entitlement: 0.0,
                carryover: 0.0,
                taken: 0.0,
                pending: 0.0,
            });
        self.transaction_dao.commit(tx).await?;
        Ok(VacationBalance::from(&entity))
    }

    async fn on_vacation_requested(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError> {
        self.adjust(user_id, year, |entity| entity.pending += days).await
    }

    async fn on_vacation_approved(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError> {
        self.adjust(user_id, year, |entity| {
            entity.pending = (entity.pending - days).max(0.0);
            entity.taken += days;
        })
        .await
    }

    async fn on_vacation_rejected(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError> {
        self.adjust(user_id, year, |entity| entity.pending = (entity.pending - days).max(0.0))
            .await
    }

    async fn on_vacation_revoked(&self, user_id: Uuid, year: u32, days: f32) -> Result<(), ServiceError> {
        self.adjust(user_id, year, |entity| entity.taken = (entity.taken - days).max(0.0))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::vacation_balance::MockVacationBalanceDao;
    use dao::MockTransactionDao;

    struct TestDeps;
    impl VacationServiceDeps for TestDeps {
        type Transaction = dao::MockTransaction;
        type VacationBalanceDao = MockVacationBalanceDao;
        type TransactionDao = MockTransactionDao;
    }

    #[tokio::test]
    async fn approving_moves_days_from_pending_to_taken() {
        let mut vacation_balance_dao = MockVacationBalanceDao::new();
        vacation_balance_dao.expect_find().returning(|user_id, year, _| {
            Ok(Some(dao::vacation_balance::VacationBalanceEntity {
                user_id,
                year,
                entitlement: 25.0,
                carryover: 0.0,
                taken: 0.0,
                pending: 3.0,
            }))
        });
        vacation_balance_dao.expect_upsert().withf(|entity, _| {
            entity.pending == 0.0 && entity.taken == 3.0
        }).returning(|_, _| Ok(()));

        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao.expect_use_transaction().returning(|_| Ok(dao::MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));

        let service = VacationServiceImpl::<TestDeps> {
            vacation_balance_dao: std::sync::Arc::new(vacation_balance_dao),
            transaction_dao: std::sync::Arc::new(transaction_dao),
        };
        service.on_vacation_approved(Uuid::nil(), 2024, 3.0).await.unwrap();
    }
}
