// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDateTime;
use loanbook::application::{LoanLedger, OriginationRequest};
use loanbook::domain::{Client, LoanCategory, parse_timestamp};
use loanbook::storage::{MemoryStore, SqliteStore};
use tempfile::TempDir;

/// Helper to create a ledger over a temporary on-disk database
pub async fn test_ledger() -> Result<(LoanLedger<SqliteStore>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let ledger = LoanLedger::open(db_path.to_str().unwrap()).await?;
    Ok((ledger, temp_dir))
}

/// Helper to create a ledger over the in-memory fake
pub fn memory_ledger() -> LoanLedger<MemoryStore> {
    LoanLedger::new(MemoryStore::new())
}

/// Helper to parse a "YYYY-MM-DD HH:MM:SS" timestamp
pub fn at(s: &str) -> NaiveDateTime {
    parse_timestamp(s).unwrap()
}

/// Test fixture: commonly used clients
pub struct StandardClients;

impl StandardClients {
    /// Ordinary loan of 1000.00 (Scenario A)
    pub async fn ordinary_1000<S: loanbook::LedgerStore>(ledger: &LoanLedger<S>) -> Result<Client> {
        let request = OriginationRequest::new("Maria Lopez", LoanCategory::Ordinary)
            .with_address("Calle 5 #12")
            .with_phone("555-0101")
            .with_amount(100_000);
        Ok(ledger.originate_loan(request).await?)
    }

    /// Fixed 20,000 credit line (Scenario C)
    pub async fn credit_line_20<S: loanbook::LedgerStore>(ledger: &LoanLedger<S>) -> Result<Client> {
        let request = OriginationRequest::new("Jorge Diaz", LoanCategory::CreditLine20);
        Ok(ledger.originate_loan(request).await?)
    }
}
