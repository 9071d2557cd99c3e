use anyhow::{Context, Result, bail};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use tracing::debug;

use crate::domain::{
    AuditRecord, Client, ClientId, HistoryAction, LoanCategory, LoanHistoryEntry, NewClient,
    Payment, format_timestamp, parse_timestamp,
};

use super::{LedgerStore, MIGRATION_001_INITIAL};

/// SQLite-backed store for clients, payments and loan history.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store over the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    ///
    /// The ledger is single-user, so the pool holds exactly one connection and
    /// never recycles it (an in-memory database lives only as long as it does).
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the schema if it does not exist yet. Existing data is kept.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        Self::init(&format!("sqlite:{}?mode=rwc", path)).await
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::init("sqlite::memory:").await
    }

    /// Count rows in the payment log for a client.
    pub async fn count_payments(&self, client_id: ClientId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM payments WHERE client_id = ?")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count payments")?;
        Ok(row.get("count"))
    }

    /// Count rows in the loan history for a client.
    pub async fn count_history(&self, client_id: ClientId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM loan_history WHERE client_id = ?")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count loan history")?;
        Ok(row.get("count"))
    }

    async fn append_record(
        tx: &mut Transaction<'_, Sqlite>,
        client_id: ClientId,
        record: &AuditRecord,
    ) -> Result<()> {
        match record {
            AuditRecord::Payment { amount, at } => {
                sqlx::query(
                    "INSERT INTO payments (client_id, amount, payment_date) VALUES (?, ?, ?)",
                )
                .bind(client_id)
                .bind(*amount)
                .bind(format_timestamp(*at))
                .execute(&mut **tx)
                .await
                .context("Failed to append payment")?;
            }
            AuditRecord::History { action, amount, at } => {
                sqlx::query(
                    "INSERT INTO loan_history (client_id, action, amount, date) VALUES (?, ?, ?, ?)",
                )
                .bind(client_id)
                .bind(action.as_str())
                .bind(*amount)
                .bind(format_timestamp(*at))
                .execute(&mut **tx)
                .await
                .context("Failed to append loan history")?;
            }
        }
        Ok(())
    }

    fn row_to_client(row: &SqliteRow) -> Result<Client> {
        let loan_type: String = row.get("loan_type");

        Ok(Client {
            id: row.get("id"),
            name: row.get("name"),
            address: row.get("address"),
            phone: row.get("phone"),
            category: LoanCategory::from_str(&loan_type)
                .ok_or_else(|| anyhow::anyhow!("Invalid loan type: {}", loan_type))?,
            balance: row.get("balance"),
            interest: row.get("interest"),
        })
    }

    fn row_to_payment(row: &SqliteRow) -> Result<Payment> {
        let paid_at: String = row.get("payment_date");

        Ok(Payment {
            id: row.get("id"),
            client_id: row.get("client_id"),
            amount: row.get("amount"),
            paid_at: parse_timestamp(&paid_at).context("Invalid payment_date timestamp")?,
        })
    }

    fn row_to_history(row: &SqliteRow) -> Result<LoanHistoryEntry> {
        let action: String = row.get("action");
        let date: String = row.get("date");

        Ok(LoanHistoryEntry {
            id: row.get("id"),
            client_id: row.get("client_id"),
            action: HistoryAction::from_str(&action)
                .ok_or_else(|| anyhow::anyhow!("Invalid history action: {}", action))?,
            amount: row.get("amount"),
            recorded_at: parse_timestamp(&date).context("Invalid loan history date")?,
        })
    }
}

impl LedgerStore for SqliteStore {
    async fn find_client(&self, id: ClientId) -> Result<Option<Client>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, address, phone, loan_type, balance, interest
            FROM clients
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch client")?;

        row.as_ref().map(Self::row_to_client).transpose()
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query(
            "SELECT id, name, address, phone, loan_type, balance, interest FROM clients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list clients")?;

        rows.iter().map(Self::row_to_client).collect()
    }

    async fn create_client(&self, client: &NewClient, origination: &AuditRecord) -> Result<Client> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, address, phone, loan_type, balance, interest)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.name)
        .bind(&client.address)
        .bind(&client.phone)
        .bind(client.category.as_str())
        .bind(client.balance)
        .bind(client.interest)
        .execute(&mut *tx)
        .await
        .context("Failed to save client")?;

        let id = result.last_insert_rowid();
        Self::append_record(&mut tx, id, origination).await?;
        tx.commit().await.context("Failed to commit client")?;

        debug!(client = id, "client row inserted");
        Ok(client.clone().with_id(id))
    }

    async fn save_client(&self, client: &Client, record: &AuditRecord) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query("UPDATE clients SET balance = ?, interest = ? WHERE id = ?")
            .bind(client.balance)
            .bind(client.interest)
            .bind(client.id)
            .execute(&mut *tx)
            .await
            .context("Failed to update client")?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            bail!("Client {} does not exist", client.id);
        }

        Self::append_record(&mut tx, client.id, record).await?;
        tx.commit().await.context("Failed to commit client update")?;

        debug!(client = client.id, "client row updated");
        Ok(())
    }

    async fn list_payments(&self, client_id: ClientId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, amount, payment_date
            FROM payments
            WHERE client_id = ?
            ORDER BY payment_date DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    async fn list_history(&self, client_id: ClientId) -> Result<Vec<LoanHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, action, amount, date
            FROM loan_history
            WHERE client_id = ?
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list loan history")?;

        rows.iter().map(Self::row_to_history).collect()
    }
}
