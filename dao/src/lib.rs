use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod absence_request;
pub mod correction;
pub mod holiday;
pub mod monthly_balance;
pub mod overtime_transaction;
pub mod rollover_lease;
pub mod time_entry;
pub mod user;
pub mod vacation_balance;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Marker trait for a unit-of-work handle. `dao-sqlite` implements it as a
/// wrapper around a live `sqlx::Transaction`; tests use the zero-sized
/// `MockTransaction`. Every DAO method takes one so that a mutation spanning
/// several tables (delete-then-reinsert-then-re-chain) commits atomically.
pub trait Transaction: Send + Sync {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao {
    type Transaction: Transaction + Send + Sync + Clone + std::fmt::Debug + 'static;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError>;

    /// Returns `tx` unchanged if already `Some`, otherwise opens a new one.
    /// Lets callers compose several DAO calls into one transaction without
    /// every call site having to branch on whether it was handed one.
    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;

    async fn commit(&self, tx: Self::Transaction) -> Result<(), DaoError>;
}
