use serde::{Deserialize, Serialize};

use super::Cents;

/// Clients are keyed by the store's autoincrement row id.
pub type ClientId = i64;

/// The three loan products a client can hold. Each has a fixed rate applied
/// once per transaction (not pro-rated by elapsed time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCategory {
    /// Caller-chosen principal at 10%
    Ordinary,
    /// Fixed 10,000 principal at 5%
    #[serde(rename = "credit_line_10")]
    CreditLine10,
    /// Fixed 20,000 principal at 3.25%
    #[serde(rename = "credit_line_20")]
    CreditLine20,
}

impl LoanCategory {
    pub const ALL: [LoanCategory; 3] = [
        LoanCategory::Ordinary,
        LoanCategory::CreditLine10,
        LoanCategory::CreditLine20,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanCategory::Ordinary => "ordinary",
            LoanCategory::CreditLine10 => "credit_line_10",
            LoanCategory::CreditLine20 => "credit_line_20",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ordinary" => Some(LoanCategory::Ordinary),
            "credit_line_10" => Some(LoanCategory::CreditLine10),
            "credit_line_20" => Some(LoanCategory::CreditLine20),
            _ => None,
        }
    }

    /// Rate in basis points (1/100 of a percent).
    pub fn rate_bp(&self) -> i64 {
        match self {
            LoanCategory::Ordinary => 1000,
            LoanCategory::CreditLine10 => 500,
            LoanCategory::CreditLine20 => 325,
        }
    }

    /// Principal a credit line is always opened with, regardless of the request.
    pub fn fixed_principal(&self) -> Option<Cents> {
        match self {
            LoanCategory::Ordinary => None,
            LoanCategory::CreditLine10 => Some(1_000_000),
            LoanCategory::CreditLine20 => Some(2_000_000),
        }
    }

    /// Interest owed on `principal` for one period, rounded half-up to the cent.
    pub fn interest_on(&self, principal: Cents) -> Cents {
        let scaled = principal as i128 * self.rate_bp() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5_000) / 10_000
        } else {
            (scaled - 5_000) / 10_000
        };
        rounded as Cents
    }
}

impl std::fmt::Display for LoanCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: LoanCategory,
    /// Outstanding principal, never negative
    pub balance: Cents,
    /// Accrued interest, never negative
    pub interest: Cents,
}

/// A client that has not been assigned an id by the store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: LoanCategory,
    pub balance: Cents,
    pub interest: Cents,
}

impl NewClient {
    pub fn with_id(self, id: ClientId) -> Client {
        Client {
            id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            category: self.category,
            balance: self.balance,
            interest: self.interest,
        }
    }
}

/// Short "id - name" label for picking a client from a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLabel {
    pub id: ClientId,
    pub name: String,
}

impl std::fmt::Display for ClientLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

impl From<&Client> for ClientLabel {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
        }
    }
}
