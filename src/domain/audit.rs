use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{Cents, ClientId};

/// Wall-clock format used for every stored timestamp (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds, matching the stored precision.
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
}

/// A recorded payment. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub client_id: ClientId,
    /// Amount as tendered, before allocation to interest and principal
    pub amount: Cents,
    pub paid_at: NaiveDateTime,
}

/// What a loan history row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Origination,
    Renewal,
    Increase,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Origination => "origination",
            HistoryAction::Renewal => "renewal",
            HistoryAction::Increase => "increase",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "origination" => Some(HistoryAction::Origination),
            "renewal" => Some(HistoryAction::Renewal),
            "increase" => Some(HistoryAction::Increase),
            _ => None,
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A loan lifecycle event. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanHistoryEntry {
    pub id: i64,
    pub client_id: ClientId,
    pub action: HistoryAction,
    pub amount: Cents,
    pub recorded_at: NaiveDateTime,
}

/// Actions a caller may request on an existing loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanAction {
    /// Audit-only: balance and interest stay as they are
    Renew,
    /// Adds to principal and accrues interest on the added amount
    Increase,
}

impl LoanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanAction::Renew => "renew",
            LoanAction::Increase => "increase",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "renew" => Some(LoanAction::Renew),
            "increase" => Some(LoanAction::Increase),
            _ => None,
        }
    }

    /// The history tag this action is logged under.
    pub fn history_action(&self) -> HistoryAction {
        match self {
            LoanAction::Renew => HistoryAction::Renewal,
            LoanAction::Increase => HistoryAction::Increase,
        }
    }
}

impl std::fmt::Display for LoanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The audit row that accompanies a client write. A client update and its
/// audit row are always persisted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditRecord {
    Payment {
        amount: Cents,
        at: NaiveDateTime,
    },
    History {
        action: HistoryAction,
        amount: Cents,
        at: NaiveDateTime,
    },
}
