use crate::domain::{Cents, ClientId, LoanAction, LoanCategory, parse_cents};

use super::LedgerError;

/// Parse user input as a strictly positive amount.
pub fn parse_amount(input: &str) -> Result<Cents, LedgerError> {
    let cents = parse_cents(input)
        .map_err(|e| LedgerError::InvalidAmount(format!("'{}': {}", input.trim(), e)))?;
    if cents <= 0 {
        return Err(LedgerError::InvalidAmount(format!(
            "'{}': must be positive",
            input.trim()
        )));
    }
    Ok(cents)
}

/// Parse user input as an amount that may be zero but not negative.
pub fn parse_non_negative(input: &str) -> Result<Cents, LedgerError> {
    let cents = parse_cents(input)
        .map_err(|e| LedgerError::InvalidAmount(format!("'{}': {}", input.trim(), e)))?;
    if cents < 0 {
        return Err(LedgerError::InvalidAmount(format!(
            "'{}': must not be negative",
            input.trim()
        )));
    }
    Ok(cents)
}

/// Parse a loan category name.
pub fn parse_category(input: &str) -> Result<LoanCategory, LedgerError> {
    LoanCategory::from_str(input).ok_or_else(|| LedgerError::InvalidCategory(input.to_string()))
}

/// Parse a loan action name.
pub fn parse_action(input: &str) -> Result<LoanAction, LedgerError> {
    LoanAction::from_str(input).ok_or_else(|| LedgerError::InvalidAction(input.to_string()))
}

/// Open a new loan for a new client.
#[derive(Debug, Clone)]
pub struct OriginationRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: LoanCategory,
    /// Required for ordinary loans; ignored by credit lines
    pub requested_amount: Option<Cents>,
}

impl OriginationRequest {
    pub fn new(name: impl Into<String>, category: LoanCategory) -> Self {
        Self {
            name: name.into(),
            address: String::new(),
            phone: String::new(),
            category,
            requested_amount: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_amount(mut self, amount: Cents) -> Self {
        self.requested_amount = Some(amount);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaymentRequest {
    pub client_id: ClientId,
    pub amount: Cents,
}

impl PaymentRequest {
    pub fn new(client_id: ClientId, amount: Cents) -> Self {
        Self { client_id, amount }
    }

    /// Build a request from raw form input.
    pub fn parse(client_id: ClientId, amount: &str) -> Result<Self, LedgerError> {
        Ok(Self::new(client_id, parse_amount(amount)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoanActionRequest {
    pub client_id: ClientId,
    pub action: LoanAction,
    /// Added to principal on increase; recorded for audit only on renew
    pub amount: Cents,
}

impl LoanActionRequest {
    pub fn new(client_id: ClientId, action: LoanAction, amount: Cents) -> Self {
        Self {
            client_id,
            action,
            amount,
        }
    }

    pub fn renew(client_id: ClientId, amount: Cents) -> Self {
        Self::new(client_id, LoanAction::Renew, amount)
    }

    pub fn increase(client_id: ClientId, amount: Cents) -> Self {
        Self::new(client_id, LoanAction::Increase, amount)
    }

    /// Build a request from raw form input.
    pub fn parse(client_id: ClientId, action: &str, amount: &str) -> Result<Self, LedgerError> {
        let action = parse_action(action)?;
        let amount = match action {
            LoanAction::Increase => parse_amount(amount)?,
            LoanAction::Renew => parse_non_negative(amount)?,
        };
        Ok(Self::new(client_id, action, amount))
    }
}
