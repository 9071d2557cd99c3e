use thiserror::Error;

use crate::domain::ClientId;

/// Rejections surfaced to whoever drives the ledger. None of them leave
/// partial state behind.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Invalid loan category '{0}'. Valid categories: ordinary, credit_line_10, credit_line_20")]
    InvalidCategory(String),

    #[error("Invalid loan action '{0}'. Valid actions: renew, increase")]
    InvalidAction(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Database error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// True for request validation failures, false for store failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}
