use std::sync::Arc;

use async_trait::async_trait;
use dao::{overtime_transaction::OvertimeTransactionDao, TransactionDao};
use service::{
    clock::ClockService,
    journal::{JournalService, NewTransaction, OvertimeTransaction, RECOMPUTE_OWNED_TYPES},
    uuid_service::UuidService,
    ServiceError,
};
use time::Date;
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct JournalServiceImpl: JournalService = JournalServiceDeps {
        OvertimeTransactionDao: OvertimeTransactionDao<Transaction = Self::Transaction> = overtime_transaction_dao,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

impl<Deps: JournalServiceDeps> JournalServiceImpl<Deps> {
    /// Recomputes `balance_before`/`balance_after` for every entry of
    /// `user_id` from `from_date` onward, seeded by the balance of the last
    /// entry strictly before it. Entries are assumed to come back from the
    /// dao already ordered by `(date, created_at, id)` (spec P1).
    async fn rechain(
        &self,
        user_id: Uuid,
        from_date: Date,
        tx: Deps::Transaction,
    ) -> Result<f64, ServiceError> {
        let preceding = self
            .overtime_transaction_dao
            .find_all_for_user(user_id, tx.clone())
            .await?;
        let mut running = preceding
            .iter()
            .filter(|entry| entry.date < from_date)
            .next_back()
            .map(|entry| entry.balance_after as f64)
            .unwrap_or(0.0);

        let tail = self
            .overtime_transaction_dao
            .find_from_date(user_id, from_date, tx.clone())
            .await?;
        let mut updates = Vec::with_capacity(tail.len());
        for entry in tail.iter() {
            let balance_before = running;
            running += entry.hours as f64;
            updates.push((entry.id, balance_before as f32, running as f32));
        }
        self.overtime_transaction_dao
            .update_balances(&updates, tx.clone())
            .await?;
        Ok(running)
    }
}

#[async_trait]
impl<Deps: JournalServiceDeps> JournalService for JournalServiceImpl<Deps> {
    async fn append(&self, new_tx: NewTransaction) -> Result<OvertimeTransaction, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let id = self.uuid_service.new_uuid("journal_service::append");
        let entity = dao::overtime_transaction::OvertimeTransactionEntity {
            id,
            user_id: new_tx.user_id,
            date: new_tx.date,
            tx_type: new_tx.tx_type.into(),
            hours: new_tx.hours as f32,
            balance_before: 0.0,
            balance_after: 0.0,
            reference_kind: new_tx.reference_kind,
            reference_id: new_tx.reference_id,
            description: new_tx.description,
            created_by: new_tx.created_by,
            created_at: self.clock_service.now(),
        };
        self.overtime_transaction_dao
            .insert(&entity, tx.clone())
            .await?;
        self.rechain(new_tx.user_id, new_tx.date, tx.clone()).await?;

        let stored = self
            .overtime_transaction_dao
            .find_by_user_and_date(new_tx.user_id, new_tx.date, tx.clone())
            .await?
            .iter()
            .find(|candidate| candidate.id == id)
            .cloned()
            .ok_or(ServiceError::Transient)?;
        self.transaction_dao.commit(tx).await?;
        Ok(OvertimeTransaction::from(&stored))
    }

    async fn delete_and_rechain(&self, user_id: Uuid, date: Date) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let owned_types: Vec<_> = RECOMPUTE_OWNED_TYPES.into_iter().map(Into::into).collect();
        self.overtime_transaction_dao
            .delete_by_user_date_and_types(user_id, date, &owned_types, tx.clone())
            .await?;
        self.rechain(user_id, date, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn delete_by_reference(&self, user_id: Uuid, reference_id: &str) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        if let Some(date) = self
            .overtime_transaction_dao
            .delete_by_reference_id(user_id, reference_id, tx.clone())
            .await?
        {
            self.rechain(user_id, date, tx.clone()).await?;
        }
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn balance_as_of(&self, user_id: Uuid, date: Option<Date>) -> Result<f64, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let all = self.overtime_transaction_dao.find_all_for_user(user_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        let balance = match date {
            Some(date) => all
                .iter()
                .filter(|entry| entry.date <= date)
                .next_back()
                .map(|entry| entry.balance_after as f64)
                .unwrap_or(0.0),
            None => all
                .iter()
                .next_back()
                .map(|entry| entry.balance_after as f64)
                .unwrap_or(0.0),
        };
        Ok(balance)
    }

    async fn list(
        &self,
        user_id: Uuid,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<Arc<[OvertimeTransaction]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(None).await?;
        let all = self.overtime_transaction_dao.find_all_for_user(user_id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(all
            .iter()
            .filter(|entry| from.map_or(true, |from| entry.date >= from) && to.map_or(true, |to| entry.date <= to))
            .map(OvertimeTransaction::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::overtime_transaction::{MockOvertimeTransactionDao, OvertimeTransactionEntity, OvertimeTransactionTypeEntity};
    use dao::{MockTransactionDao, MockTransaction};
    use service::clock::MockClockService;
    use service::uuid_service::MockUuidService;
    use time::macros::{date, datetime};

    struct TestDeps;
    impl JournalServiceDeps for TestDeps {
        type Transaction = MockTransaction;
        type OvertimeTransactionDao = MockOvertimeTransactionDao;
        type ClockService = MockClockService;
        type UuidService = MockUuidService;
        type TransactionDao = MockTransactionDao;
    }

    fn build_transaction_dao() -> MockTransactionDao {
        let mut transaction_dao = MockTransactionDao::new();
        transaction_dao
            .expect_use_transaction()
            .returning(|_| Ok(MockTransaction));
        transaction_dao.expect_commit().returning(|_| Ok(()));
        transaction_dao
    }

    #[tokio::test]
    async fn append_chains_onto_the_prior_balance() {
        let mut overtime_transaction_dao = MockOvertimeTransactionDao::new();
        overtime_transaction_dao.expect_insert().returning(|_, _| Ok(()));
        overtime_transaction_dao
            .expect_find_all_for_user()
            .returning(|_, _| {
                Ok(std::sync::Arc::from(vec![OvertimeTransactionEntity {
                    id: Uuid::from_u128(1),
                    user_id: Uuid::nil(),
                    date: date!(2024 - 01 - 01),
                    tx_type: OvertimeTransactionTypeEntity::Earned,
                    hours: 2.0,
                    balance_before: 0.0,
                    balance_after: 2.0,
                    reference_kind: None,
                    reference_id: None,
                    description: Arc::from(""),
                    created_by: None,
                    created_at: datetime!(2024-01-01 08:00),
                }]))
            });
        let inserted_id = Uuid::from_u128(2);
        overtime_transaction_dao
            .expect_find_from_date()
            .returning(move |_, _, _| {
                Ok(std::sync::Arc::from(vec![OvertimeTransactionEntity {
                    id: inserted_id,
                    user_id: Uuid::nil(),
                    date: date!(2024 - 01 - 02),
                    tx_type: OvertimeTransactionTypeEntity::Earned,
                    hours: 3.0,
                    balance_before: 0.0,
                    balance_after: 0.0,
                    reference_kind: None,
                    reference_id: None,
                    description: Arc::from(""),
                    created_by: None,
                    created_at: datetime!(2024-01-02 08:00),
                }]))
            });
        overtime_transaction_dao
            .expect_update_balances()
            .withf(move |updates, _| updates.len() == 1 && updates[0] == (inserted_id, 2.0, 5.0))
            .returning(|_, _| Ok(()));
        overtime_transaction_dao
            .expect_find_by_user_and_date()
            .returning(move |_, _, _| {
                Ok(std::sync::Arc::from(vec![OvertimeTransactionEntity {
                    id: inserted_id,
                    user_id: Uuid::nil(),
                    date: date!(2024 - 01 - 02),
                    tx_type: OvertimeTransactionTypeEntity::Earned,
                    hours: 3.0,
                    balance_before: 2.0,
                    balance_after: 5.0,
                    reference_kind: None,
                    reference_id: None,
                    description: Arc::from(""),
                    created_by: None,
                    created_at: datetime!(2024-01-02 08:00),
                }]))
            });

        let mut uuid_service = MockUuidService::new();
        uuid_service.expect_new_uuid().return_const(inserted_id);
        let mut clock_service = MockClockService::new();
        clock_service.expect_now().returning(|| datetime!(2024-01-02 08:00));

        let service = JournalServiceImpl::<TestDeps> {
            overtime_transaction_dao: Arc::new(overtime_transaction_dao),
            clock_service: Arc::new(clock_service),
            uuid_service: Arc::new(uuid_service),
            transaction_dao: Arc::new(build_transaction_dao()),
        };

        let result = service
            .append(NewTransaction {
                user_id: Uuid::nil(),
                date: date!(2024 - 01 - 02),
                tx_type: service::journal::TransactionType::Earned,
                hours: 3.0,
                reference_kind: None,
                reference_id: None,
                description: Arc::from(""),
                created_by: None,
            })
            .await
            .unwrap();
        assert_eq!(result.balance_before, 2.0);
        assert_eq!(result.balance_after, 5.0);
    }
}
