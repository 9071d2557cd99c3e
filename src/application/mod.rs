// Application layer - ledger use cases over a pluggable store.
// Front ends build request objects and call `LoanLedger`; they never touch
// the store directly.

pub mod error;
pub mod reporting;
pub mod requests;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use requests::*;
pub use service::*;
