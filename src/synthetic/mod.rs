//! Synthetic obligation derivers.
//!
//! Loans, credit cards, and properties carry obligations the user never
//! entered as recurrence rules. Each deriver is a stateless pure function
//! over current account state: re-deriving at any time yields the same
//! schedule, and nothing here is ever persisted.

pub mod credit_card;
pub mod loan;
pub mod property;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{BillPayment, RecurrenceRule};

pub use loan::ScheduledPayment;

/// Any dated cash-flow item the simulator consumes, regardless of origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Obligation {
    /// A user-entered recurrence rule.
    Explicit(RecurrenceRule),
    /// A schedule computed from account metadata.
    Synthetic(DerivedSchedule),
    /// A non-recurring bill or deposit.
    OneOff(BillPayment),
}

/// Concrete dated amounts produced by a deriver, posting against one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedSchedule {
    /// Account the entries settle against (a loan's or card's settlement
    /// account, a property's own account).
    pub account_id: Uuid,
    /// Account the schedule was derived from.
    pub derived_from: Uuid,
    pub source: SyntheticSource,
    pub currency: String,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticSource {
    LoanPayment,
    CreditCardPayment,
    PropertyTax,
    PropertyInsurance,
    PropertyHoa,
    RentalIncome,
}

/// One dated, signed amount inside a derived schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub amount: f64,
}
