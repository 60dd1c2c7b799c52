//! Server-side transactions.
//!
//! A transaction is opened with
//! [`RdfRepositoryClient::begin_transaction`](crate::repository::RdfRepositoryClient::begin_transaction),
//! which returns a [`TransactionalRepositoryClient`] bound to the URL the server
//! issued. Its lifecycle:
//!
//! ```text
//! begin_transaction ──► Active ──commit()───► Committed
//!                          │
//!                          └──rollback()──► Aborted
//! ```
//!
//! Once committed or rolled back, every operation fails with
//! [`GraphDbError::InvalidTransactionState`](crate::error::GraphDbError::InvalidTransactionState)
//! before anything is sent. A failed commit or rollback leaves the transaction
//! active so the caller can retry or roll back.
//!
//! Server-side transactions do not tolerate concurrent writers: operations on one
//! transaction must be issued one after another.

mod client;
mod isolation;

pub use client::TransactionalRepositoryClient;
pub use isolation::TransactionIsolationLevel;

use std::fmt;

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    /// Open, operations allowed
    Active,
    /// Committed, closed on the server
    Committed,
    /// Rolled back, closed on the server
    Aborted,
}

impl TransactionStatus {
    /// Whether operations are still allowed.
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionStatus::Active)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Active => "active",
            TransactionStatus::Committed => "committed",
            TransactionStatus::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
