//! Ledger domain records and calendar arithmetic.

pub mod account;
pub mod calendar;
pub mod goal;
pub mod overrides;
pub mod recurring;
pub mod transaction;

pub use account::{Account, AccountKind, LoanTerms, PropertyCosts};
pub use calendar::{Frequency, WeekendPolicy};
pub use goal::Goal;
pub use overrides::{
    BillDirection, BillPayment, BillStatus, LoanPaymentOverride, OccurrenceOverride, OverrideSet,
};
pub use recurring::{RecurrenceRule, RuleKind, MAX_EXPANSION_STEPS};
pub use transaction::{Transaction, TransactionKind};
