//! Balance and interest arithmetic for the three ledger transitions.
//!
//! Interest is never edited on its own: every change to the principal is
//! followed by recomputing interest from the client's category rate.

use super::{Cents, LoanCategory};

/// Principal and interest after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanBalance {
    pub principal: Cents,
    pub interest: Cents,
}

/// How a payment was split between interest and principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentAllocation {
    pub to_interest: Cents,
    pub to_principal: Cents,
    /// Part of the payment that exceeded interest plus principal; absorbed
    pub unapplied: Cents,
    /// Interest left unpaid and carried into the new interest figure
    pub interest_carried: Cents,
    pub result: LoanBalance,
}

/// Opening balance for a new loan.
///
/// Credit lines ignore `requested` and use their fixed principal; ordinary
/// loans use `requested` as is. Callers validate that an ordinary request is
/// positive.
pub fn originate_principal(category: LoanCategory, requested: Cents) -> LoanBalance {
    let principal = category.fixed_principal().unwrap_or(requested);
    LoanBalance {
        principal,
        interest: category.interest_on(principal),
    }
}

/// Apply a payment: interest first, then principal.
pub fn allocate_payment(
    category: LoanCategory,
    current: LoanBalance,
    payment: Cents,
) -> PaymentAllocation {
    let (to_interest, remaining, interest_carried) = if payment >= current.interest {
        (current.interest, payment - current.interest, 0)
    } else {
        (payment, 0, current.interest - payment)
    };

    let to_principal = remaining.min(current.principal);
    let principal = (current.principal - remaining).max(0);

    PaymentAllocation {
        to_interest,
        to_principal,
        unapplied: remaining - to_principal,
        interest_carried,
        result: LoanBalance {
            principal,
            interest: interest_carried + category.interest_on(principal),
        },
    }
}

/// Add `amount` to the principal and accrue interest on the added part only.
///
/// Returns `None` if either figure would overflow.
pub fn apply_increase(
    category: LoanCategory,
    current: LoanBalance,
    amount: Cents,
) -> Option<LoanBalance> {
    Some(LoanBalance {
        principal: current.principal.checked_add(amount)?,
        interest: current.interest.checked_add(category.interest_on(amount))?,
    })
}
