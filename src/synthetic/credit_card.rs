//! Credit-card statement payment derivation.

use chrono::{Duration, NaiveDate};

use super::{DerivedSchedule, ScheduleEntry, SyntheticSource};
use crate::ledger::{Account, AccountKind, Transaction};
use crate::statement;
use crate::utils::round_cents;

/// Derives the payment obligation for the card's current statement cycle:
/// the statement balance, net of payments already posted inside the cycle,
/// falling due on the cycle's payment date. The amount is computed, never
/// stored; cards without both cycle anchors derive nothing.
pub fn derive(
    account: &Account,
    transactions: &[Transaction],
    today: NaiveDate,
) -> Option<DerivedSchedule> {
    if account.kind != AccountKind::CreditCard {
        return None;
    }
    let (statement_start_day, payment_day) = account.statement_anchors()?;
    let periods = statement::periods(statement_start_day, payment_day, today);
    let cycle = periods.current;
    let details = statement::statement_details(
        account,
        cycle.start,
        cycle.end + Duration::days(1),
        transactions,
    );

    let due = round_cents(details.balance - details.payments);
    if due <= 0.0 {
        return None;
    }

    Some(DerivedSchedule {
        account_id: account.settlement_account(),
        derived_from: account.id,
        source: SyntheticSource::CreditCardPayment,
        currency: account.currency.clone(),
        entries: vec![ScheduleEntry {
            date: cycle.payment_due,
            amount: -due,
        }],
    })
}
