use anyhow::Result;
use std::io::Write;

use crate::application::{LoanLedger, PortfolioReport};
use crate::domain::format_cents;
use crate::storage::LedgerStore;

/// Writes the loan portfolio out as a spreadsheet (CSV) or JSON document.
pub struct Exporter<'a, S> {
    ledger: &'a LoanLedger<S>,
}

impl<'a, S: LedgerStore> Exporter<'a, S> {
    pub fn new(ledger: &'a LoanLedger<S>) -> Self {
        Self { ledger }
    }

    /// One row per client followed by a totals row. Returns the client count.
    pub async fn export_portfolio_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.ledger.portfolio_report().await?;
        write_portfolio_csv(&report, writer)?;
        Ok(report.clients.len())
    }

    /// The full report as pretty-printed JSON.
    pub async fn export_portfolio_json<W: Write>(&self, mut writer: W) -> Result<PortfolioReport> {
        let report = self.ledger.portfolio_report().await?;
        let json = serde_json::to_string_pretty(&report)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(report)
    }
}

pub fn write_portfolio_csv<W: Write>(report: &PortfolioReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "name",
        "address",
        "phone",
        "loan_type",
        "balance",
        "interest",
    ])?;

    for client in &report.clients {
        csv_writer.write_record([
            client.id.to_string(),
            client.name.clone(),
            client.address.clone(),
            client.phone.clone(),
            client.category.as_str().to_string(),
            format_cents(client.balance),
            format_cents(client.interest),
        ])?;
    }

    csv_writer.write_record([
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        "Totals".to_string(),
        format_cents(report.total_balance),
        format_cents(report.total_interest),
    ])?;

    csv_writer.flush()?;
    Ok(())
}
