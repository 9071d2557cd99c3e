use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Client};

/// Snapshot of every loan on the books with running totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub generated_at: NaiveDateTime,
    pub clients: Vec<Client>,
    pub total_balance: Cents,
    pub total_interest: Cents,
}

impl PortfolioReport {
    /// Sum balances and interest. Returns `None` if a total overflows.
    pub fn from_clients(clients: Vec<Client>, generated_at: NaiveDateTime) -> Option<Self> {
        let total_balance = clients
            .iter()
            .try_fold(0 as Cents, |total, c| total.checked_add(c.balance))?;
        let total_interest = clients
            .iter()
            .try_fold(0 as Cents, |total, c| total.checked_add(c.interest))?;
        Some(Self {
            generated_at,
            clients,
            total_balance,
            total_interest,
        })
    }
}
