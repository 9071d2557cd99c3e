use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{
    LedgerError, LoanActionRequest, LoanLedger, OriginationRequest, PaymentRequest,
    parse_amount, parse_category, parse_non_negative,
};
use crate::domain::{Client, ClientId, LoanAction, format_cents, format_timestamp};
use crate::storage::SqliteStore;

/// Loanbook - small-loan ledger
#[derive(Parser)]
#[command(name = "loanbook")]
#[command(about = "Track clients, loan balances, interest and payments")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "LOANBOOK_DB", default_value = "loans.db", global = true)]
    pub database: String,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to listing clients
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Client management commands
    #[command(subcommand)]
    Client(ClientCommands),

    /// Record a payment against a client's loan
    Pay {
        /// Client ID
        client_id: ClientId,

        /// Amount paid (e.g., "150.00" or "150")
        amount: String,
    },

    /// Renew or increase an existing loan
    #[command(subcommand)]
    Loan(LoanCommands),

    /// Show payments and loan history for a client
    History {
        /// Client ID
        client_id: ClientId,
    },

    /// Export the portfolio with balance and interest totals
    Report {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Register a client and open their loan
    Add {
        /// Client name
        name: String,

        /// Loan category: ordinary, credit_line_10, credit_line_20
        #[arg(short = 't', long = "type", default_value = "ordinary")]
        category: String,

        /// Loan amount (ordinary loans only; credit lines use their fixed amount)
        #[arg(short, long)]
        amount: Option<String>,

        /// Street address
        #[arg(long, default_value = "")]
        address: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,
    },

    /// List all clients with balances
    List,

    /// List clients as "id - name"
    Directory,
}

#[derive(Subcommand)]
pub enum LoanCommands {
    /// Record a renewal (balance is left unchanged)
    Renew {
        /// Client ID
        client_id: ClientId,

        /// Amount recorded with the renewal
        #[arg(default_value = "0")]
        amount: String,
    },

    /// Increase the principal of an existing loan
    Increase {
        /// Client ID
        client_id: ClientId,

        /// Amount to add
        amount: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let ledger = LoanLedger::open(&self.database).await?;

        match self.command {
            None | Some(Commands::Client(ClientCommands::List)) => {
                run_list_command(&ledger).await?;
            }

            Some(Commands::Client(client_cmd)) => {
                run_client_command(&ledger, client_cmd).await?;
            }

            Some(Commands::Pay { client_id, amount }) => {
                let request = PaymentRequest::parse(client_id, &amount)?;
                let result = ledger.apply_payment(request).await?;
                let allocation = &result.allocation;

                println!(
                    "Recorded payment of {} for client {}",
                    format_cents(request.amount),
                    client_id
                );
                println!(
                    "  Interest paid:  {}",
                    format_cents(allocation.to_interest)
                );
                println!(
                    "  Principal paid: {}",
                    format_cents(allocation.to_principal)
                );
                if allocation.unapplied > 0 {
                    println!(
                        "  Unapplied:      {} (exceeds balance)",
                        format_cents(allocation.unapplied)
                    );
                }
                print_position(&result.client);
            }

            Some(Commands::Loan(loan_cmd)) => {
                let request = match loan_cmd {
                    LoanCommands::Renew { client_id, amount } => {
                        LoanActionRequest::renew(client_id, parse_non_negative(&amount)?)
                    }
                    LoanCommands::Increase { client_id, amount } => {
                        LoanActionRequest::increase(client_id, parse_amount(&amount)?)
                    }
                };
                let client = ledger.apply_loan_action(request).await?;

                match request.action {
                    LoanAction::Renew => println!("Renewed loan for client {}", client.id),
                    LoanAction::Increase => println!(
                        "Increased loan for client {} by {}",
                        client.id,
                        format_cents(request.amount)
                    ),
                }
                print_position(&client);
            }

            Some(Commands::History { client_id }) => {
                run_history_command(&ledger, client_id).await?;
            }

            Some(Commands::Report { output, format }) => {
                run_report_command(&ledger, output.as_deref(), &format).await?;
            }
        }

        Ok(())
    }
}

async fn run_client_command(ledger: &LoanLedger<SqliteStore>, cmd: ClientCommands) -> Result<()> {
    match cmd {
        ClientCommands::Add {
            name,
            category,
            amount,
            address,
            phone,
        } => {
            let category = parse_category(&category)?;
            let mut request = OriginationRequest::new(name, category)
                .with_address(address)
                .with_phone(phone);
            if let Some(amount) = amount {
                // Credit lines ignore the amount
                if category.fixed_principal().is_none() {
                    request = request.with_amount(parse_amount(&amount)?);
                }
            }

            let client = ledger.originate_loan(request).await?;
            println!(
                "Added client {} ({}) with an initial loan of {}",
                client.name,
                client.id,
                format_cents(client.balance)
            );
            print_position(&client);
        }

        ClientCommands::List => run_list_command(ledger).await?,

        ClientCommands::Directory => {
            for label in ledger.client_directory().await? {
                println!("{}", label);
            }
        }
    }
    Ok(())
}

async fn run_list_command(ledger: &LoanLedger<SqliteStore>) -> Result<()> {
    let clients = ledger.list_clients().await?;
    if clients.is_empty() {
        println!("No clients found.");
        return Ok(());
    }

    println!(
        "{:<5} {:<20} {:<20} {:<14} {:<15} {:>12} {:>10}",
        "ID", "NAME", "ADDRESS", "PHONE", "TYPE", "BALANCE", "INTEREST"
    );
    println!("{}", "-".repeat(102));
    for client in clients {
        println!(
            "{:<5} {:<20} {:<20} {:<14} {:<15} {:>12} {:>10}",
            client.id,
            truncate(&client.name, 20),
            truncate(&client.address, 20),
            truncate(&client.phone, 14),
            client.category.as_str(),
            format_cents(client.balance),
            format_cents(client.interest)
        );
    }
    Ok(())
}

async fn run_history_command(ledger: &LoanLedger<SqliteStore>, client_id: ClientId) -> Result<()> {
    let history = ledger.client_history(client_id).await?;

    println!("History for client: {} ({})", history.client.name, history.client.id);
    print_position(&history.client);

    println!();
    println!("Payments:");
    if history.payments.is_empty() {
        println!("  (none)");
    } else {
        println!("  {:>12}  {:<19}", "AMOUNT", "DATE");
        for payment in &history.payments {
            println!(
                "  {:>12}  {:<19}",
                format_cents(payment.amount),
                format_timestamp(payment.paid_at)
            );
        }
    }

    println!();
    println!("Loan history:");
    println!("  {:<12} {:>12}  {:<19}", "ACTION", "AMOUNT", "DATE");
    for entry in &history.loan_history {
        println!(
            "  {:<12} {:>12}  {:<19}",
            entry.action.as_str(),
            format_cents(entry.amount),
            format_timestamp(entry.recorded_at)
        );
    }
    Ok(())
}

async fn run_report_command(
    ledger: &LoanLedger<SqliteStore>,
    output: Option<&str>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(ledger);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_portfolio_csv(writer).await?;
            if let Some(path) = output {
                eprintln!("Exported {} clients to {}", count, path);
            }
        }
        "json" => {
            let report = exporter.export_portfolio_json(writer).await?;
            if let Some(path) = output {
                eprintln!("Exported {} clients to {}", report.clients.len(), path);
            }
        }
        _ => {
            anyhow::bail!("Invalid report format '{}'. Valid formats: csv, json", format);
        }
    }

    Ok(())
}

fn print_position(client: &Client) {
    println!("  Balance:  {}", format_cents(client.balance));
    println!("  Interest: {}", format_cents(client.interest));
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Map ledger rejections to a one-line message for the terminal.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<LedgerError>() {
        Some(ledger_err) if ledger_err.is_rejection() => ledger_err.to_string(),
        _ => format!("{:#}", err),
    }
}
