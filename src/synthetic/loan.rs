//! Loan amortization.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{DerivedSchedule, ScheduleEntry, SyntheticSource};
use crate::errors::ForecastError;
use crate::ledger::calendar::{self, Frequency};
use crate::ledger::{Account, LoanPaymentOverride};
use crate::utils::round_cents;

/// A derived, never-persisted schedule entry: one loan installment. Feeds
/// both the account-detail schedule view and the simulator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScheduledPayment {
    pub installment: u32,
    pub date: NaiveDate,
    pub amount: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
}

/// Computes the fixed-payment amortization schedule for a loan account,
/// applying any per-installment overrides before the entry is exposed.
/// Accounts without loan terms produce an empty schedule.
///
/// Interest is outstanding-balance times the periodic rate; the principal
/// portion is the fixed payment minus interest, and an overridden principal
/// flows into every later installment through the recomputed balance.
pub fn amortization_schedule(
    account: &Account,
    overrides: &[LoanPaymentOverride],
) -> Result<Vec<ScheduledPayment>, ForecastError> {
    let terms = match &account.loan_terms {
        Some(terms) => terms,
        None => return Ok(Vec::new()),
    };
    if terms.term_months == 0 || terms.principal <= 0.0 {
        return Ok(Vec::new());
    }

    let periodic_rate = terms.annual_rate / 12.0;
    let fixed_payment = fixed_payment(terms.principal, periodic_rate, terms.term_months);
    let pinned = terms
        .payment_day
        .unwrap_or_else(|| terms.first_payment_date.day());

    let mut schedule = Vec::with_capacity(terms.term_months as usize);
    let mut balance = terms.principal;
    let mut date = terms.first_payment_date;

    for installment in 0..terms.term_months {
        let interest = round_cents(balance * periodic_rate);
        let principal = if installment + 1 == terms.term_months {
            // Final installment clears whatever balance rounding left behind.
            round_cents(balance)
        } else {
            round_cents((fixed_payment - interest).min(balance))
        };

        let mut entry = ScheduledPayment {
            installment,
            date,
            amount: 0.0,
            principal,
            interest,
            remaining_balance: 0.0,
        };
        if let Some(o) = overrides
            .iter()
            .find(|o| o.account_id == account.id && o.installment_index == installment)
        {
            if let Some(date) = o.date {
                entry.date = date;
            }
            if let Some(principal) = o.principal {
                entry.principal = round_cents(principal.abs().min(balance));
            }
            if let Some(interest) = o.interest {
                entry.interest = round_cents(interest.abs());
            }
        }
        balance = round_cents(balance - entry.principal);
        entry.amount = round_cents(entry.principal + entry.interest);
        entry.remaining_balance = balance;
        schedule.push(entry);

        date = calendar::step(date, Frequency::Monthly, 1, Some(pinned));
        if balance <= 0.0 {
            break;
        }
    }

    Ok(schedule)
}

/// Exposes the amortization schedule as an obligation stream posting against
/// the loan's settlement account.
pub fn derive(
    account: &Account,
    overrides: &[LoanPaymentOverride],
) -> Result<Option<DerivedSchedule>, ForecastError> {
    let schedule = amortization_schedule(account, overrides)?;
    if schedule.is_empty() {
        return Ok(None);
    }
    Ok(Some(DerivedSchedule {
        account_id: account.settlement_account(),
        derived_from: account.id,
        source: SyntheticSource::LoanPayment,
        currency: account.currency.clone(),
        entries: schedule
            .iter()
            .map(|payment| ScheduleEntry {
                date: payment.date,
                amount: -payment.amount,
            })
            .collect(),
    }))
}

fn fixed_payment(principal: f64, periodic_rate: f64, term_months: u32) -> f64 {
    if periodic_rate.abs() < f64::EPSILON {
        return principal / term_months as f64;
    }
    let factor = (1.0 + periodic_rate).powi(term_months as i32);
    principal * periodic_rate * factor / (factor - 1.0)
}
