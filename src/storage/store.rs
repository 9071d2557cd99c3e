use anyhow::Result;

use crate::domain::{AuditRecord, Client, ClientId, LoanHistoryEntry, NewClient, Payment};

/// Persistence seam for the loan ledger.
///
/// Every write pairs a client change with exactly one audit row, and
/// implementations must apply the pair atomically: either both are stored or
/// neither is.
#[allow(async_fn_in_trait)]
pub trait LedgerStore {
    /// Look up a client by id.
    async fn find_client(&self, id: ClientId) -> Result<Option<Client>>;

    /// All clients, ordered by id.
    async fn list_clients(&self) -> Result<Vec<Client>>;

    /// Insert a new client together with its origination audit row.
    async fn create_client(&self, client: &NewClient, origination: &AuditRecord) -> Result<Client>;

    /// Overwrite an existing client's balance and interest and append `record`.
    /// Fails, storing nothing, if the client does not exist.
    async fn save_client(&self, client: &Client, record: &AuditRecord) -> Result<()>;

    /// Payments for a client, most recent first.
    async fn list_payments(&self, client_id: ClientId) -> Result<Vec<Payment>>;

    /// Loan history for a client, most recent first.
    async fn list_history(&self, client_id: ClientId) -> Result<Vec<LoanHistoryEntry>>;
}
