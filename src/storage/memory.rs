use anyhow::{Result, bail};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{AuditRecord, Client, ClientId, LoanHistoryEntry, NewClient, Payment};

use super::LedgerStore;

#[derive(Default)]
struct MemoryState {
    clients: Vec<Client>,
    payments: Vec<Payment>,
    history: Vec<LoanHistoryEntry>,
}

impl MemoryState {
    fn append(&mut self, client_id: ClientId, record: &AuditRecord) {
        match record {
            AuditRecord::Payment { amount, at } => {
                let id = self.payments.len() as i64 + 1;
                self.payments.push(Payment {
                    id,
                    client_id,
                    amount: *amount,
                    paid_at: *at,
                });
            }
            AuditRecord::History { action, amount, at } => {
                let id = self.history.len() as i64 + 1;
                self.history.push(LoanHistoryEntry {
                    id,
                    client_id,
                    action: *action,
                    amount: *amount,
                    recorded_at: *at,
                });
            }
        }
    }
}

/// In-memory [`LedgerStore`] for exercising ledger logic without a database.
///
/// Writes happen under a single lock, so each client change and its audit row
/// land together.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a client directly, bypassing origination. No audit row is written.
    pub fn insert_client(&self, client: NewClient) -> Client {
        let mut state = self.lock();
        let client = client.with_id(state.clients.len() as i64 + 1);
        state.clients.push(client.clone());
        client
    }

    pub fn payment_count(&self) -> usize {
        self.lock().payments.len()
    }

    pub fn history_count(&self) -> usize {
        self.lock().history.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LedgerStore for MemoryStore {
    async fn find_client(&self, id: ClientId) -> Result<Option<Client>> {
        Ok(self.lock().clients.iter().find(|c| c.id == id).cloned())
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        Ok(self.lock().clients.clone())
    }

    async fn create_client(&self, client: &NewClient, origination: &AuditRecord) -> Result<Client> {
        let mut state = self.lock();
        let client = client.clone().with_id(state.clients.len() as i64 + 1);
        state.clients.push(client.clone());
        state.append(client.id, origination);
        Ok(client)
    }

    async fn save_client(&self, client: &Client, record: &AuditRecord) -> Result<()> {
        let mut state = self.lock();
        let Some(stored) = state.clients.iter_mut().find(|c| c.id == client.id) else {
            bail!("Client {} does not exist", client.id);
        };
        stored.balance = client.balance;
        stored.interest = client.interest;
        state.append(client.id, record);
        Ok(())
    }

    async fn list_payments(&self, client_id: ClientId) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .lock()
            .payments
            .iter()
            .filter(|p| p.client_id == client_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at).then(b.id.cmp(&a.id)));
        Ok(payments)
    }

    async fn list_history(&self, client_id: ClientId) -> Result<Vec<LoanHistoryEntry>> {
        let mut history: Vec<LoanHistoryEntry> = self
            .lock()
            .history
            .iter()
            .filter(|h| h.client_id == client_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(history)
    }
}
