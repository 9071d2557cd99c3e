use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::domain::{
    AuditRecord, Cents, Client, ClientId, ClientLabel, HistoryAction, LoanAction, LoanBalance,
    LoanCategory, LoanHistoryEntry, NewClient, Payment, PaymentAllocation, allocate_payment,
    apply_increase, local_now, originate_principal,
};
use crate::storage::{LedgerStore, SqliteStore};

use super::{
    LedgerError, LoanActionRequest, OriginationRequest, PaymentRequest, PortfolioReport,
};

/// The loan ledger: owns client balances and the audit trail around them.
/// This is the interface every front end (CLI, forms, tests) drives.
pub struct LoanLedger<S> {
    store: S,
    clock: fn() -> NaiveDateTime,
}

/// Outcome of a recorded payment
#[derive(Debug, Clone)]
pub struct PaymentResult {
    pub client: Client,
    pub allocation: PaymentAllocation,
}

/// Both audit logs for one client, most recent first
#[derive(Debug, Clone)]
pub struct ClientHistory {
    pub client: Client,
    pub payments: Vec<Payment>,
    pub loan_history: Vec<LoanHistoryEntry>,
}

impl LoanLedger<SqliteStore> {
    /// Open (creating if needed) the ledger database at the given path.
    pub async fn open(database_path: &str) -> Result<Self, LedgerError> {
        let store = SqliteStore::open(database_path).await?;
        Ok(Self::new(store))
    }
}

impl<S: LedgerStore> LoanLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: local_now,
        }
    }

    /// Replace the clock used to timestamp payments and history entries.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================
    // Transitions
    // ========================

    /// Open a loan for a new client and log its origination.
    pub async fn originate_loan(&self, request: OriginationRequest) -> Result<Client, LedgerError> {
        let requested = match (request.category, request.requested_amount) {
            (LoanCategory::Ordinary, Some(amount)) if amount > 0 => amount,
            (LoanCategory::Ordinary, Some(amount)) => {
                warn!(amount, "origination rejected: non-positive amount");
                return Err(LedgerError::InvalidAmount(
                    "Ordinary loan amount must be positive".to_string(),
                ));
            }
            (LoanCategory::Ordinary, None) => {
                warn!("origination rejected: missing amount");
                return Err(LedgerError::InvalidAmount(
                    "Ordinary loans require an amount".to_string(),
                ));
            }
            (_, requested) => requested.unwrap_or(0),
        };

        let opened = originate_principal(request.category, requested);
        let new_client = NewClient {
            name: request.name,
            address: request.address,
            phone: request.phone,
            category: request.category,
            balance: opened.principal,
            interest: opened.interest,
        };
        let origination = AuditRecord::History {
            action: HistoryAction::Origination,
            amount: opened.principal,
            at: (self.clock)(),
        };

        let client = self.store.create_client(&new_client, &origination).await?;
        info!(
            client = client.id,
            category = %client.category,
            principal = client.balance,
            interest = client.interest,
            "loan originated"
        );
        Ok(client)
    }

    /// Record a payment: interest is paid first, the rest reduces principal,
    /// then interest is recomputed on what is left.
    pub async fn apply_payment(&self, request: PaymentRequest) -> Result<PaymentResult, LedgerError> {
        if request.amount <= 0 {
            warn!(client = request.client_id, amount = request.amount, "payment rejected");
            return Err(LedgerError::InvalidAmount(
                "Payment must be positive".to_string(),
            ));
        }

        let mut client = self.get_client(request.client_id).await?;
        let allocation = allocate_payment(client.category, balance_of(&client), request.amount);

        client.balance = allocation.result.principal;
        client.interest = allocation.result.interest;

        let record = AuditRecord::Payment {
            amount: request.amount,
            at: (self.clock)(),
        };
        self.store.save_client(&client, &record).await?;

        info!(
            client = client.id,
            amount = request.amount,
            to_interest = allocation.to_interest,
            to_principal = allocation.to_principal,
            unapplied = allocation.unapplied,
            "payment applied"
        );
        Ok(PaymentResult { client, allocation })
    }

    /// Renew (audit only) or increase an existing loan.
    pub async fn apply_loan_action(&self, request: LoanActionRequest) -> Result<Client, LedgerError> {
        validate_action_amount(request.action, request.amount).inspect_err(|e| {
            warn!(client = request.client_id, action = %request.action, reason = %e, "loan action rejected");
        })?;

        let mut client = self.get_client(request.client_id).await?;

        if request.action == LoanAction::Increase {
            let Some(updated) = apply_increase(client.category, balance_of(&client), request.amount)
            else {
                warn!(client = client.id, amount = request.amount, "increase rejected: overflow");
                return Err(LedgerError::InvalidAmount(
                    "Increase amount too large".to_string(),
                ));
            };
            client.balance = updated.principal;
            client.interest = updated.interest;
        }

        let record = AuditRecord::History {
            action: request.action.history_action(),
            amount: request.amount,
            at: (self.clock)(),
        };
        self.store.save_client(&client, &record).await?;

        info!(
            client = client.id,
            action = %request.action,
            amount = request.amount,
            principal = client.balance,
            interest = client.interest,
            "loan action applied"
        );
        Ok(client)
    }

    // ========================
    // Queries
    // ========================

    pub async fn get_client(&self, id: ClientId) -> Result<Client, LedgerError> {
        match self.store.find_client(id).await? {
            Some(client) => Ok(client),
            None => {
                warn!(client = id, "client not found");
                Err(LedgerError::ClientNotFound(id))
            }
        }
    }

    /// All clients, ordered by id.
    pub async fn list_clients(&self) -> Result<Vec<Client>, LedgerError> {
        Ok(self.store.list_clients().await?)
    }

    /// "id - name" labels for choosing a client.
    pub async fn client_directory(&self) -> Result<Vec<ClientLabel>, LedgerError> {
        let clients = self.store.list_clients().await?;
        Ok(clients.iter().map(ClientLabel::from).collect())
    }

    /// Payments and loan history for one client, each most recent first.
    pub async fn client_history(&self, id: ClientId) -> Result<ClientHistory, LedgerError> {
        let client = self.get_client(id).await?;
        let payments = self.store.list_payments(id).await?;
        let loan_history = self.store.list_history(id).await?;

        Ok(ClientHistory {
            client,
            payments,
            loan_history,
        })
    }

    /// Every client with summed balance and interest.
    pub async fn portfolio_report(&self) -> Result<PortfolioReport, LedgerError> {
        let clients = self.store.list_clients().await?;
        PortfolioReport::from_clients(clients, (self.clock)()).ok_or_else(|| {
            LedgerError::InvalidAmount("Portfolio totals exceed the supported range".to_string())
        })
    }
}

fn balance_of(client: &Client) -> LoanBalance {
    LoanBalance {
        principal: client.balance,
        interest: client.interest,
    }
}

fn validate_action_amount(action: LoanAction, amount: Cents) -> Result<(), LedgerError> {
    match action {
        LoanAction::Increase if amount <= 0 => Err(LedgerError::InvalidAmount(
            "Increase amount must be positive".to_string(),
        )),
        LoanAction::Renew if amount < 0 => Err(LedgerError::InvalidAmount(
            "Renewal amount must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}
