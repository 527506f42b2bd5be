//! Billing-cycle windows for revolving-credit accounts.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::calendar;
use crate::ledger::{Account, Transaction};
use crate::utils::round_cents;

/// One billing cycle. `start` and `end` are inclusive; cycles are contiguous,
/// so `end` is always the day before the next cycle's start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub payment_due: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementPeriods {
    pub previous: StatementCycle,
    pub current: StatementCycle,
    pub future: StatementCycle,
}

/// Computes the previous, current, and future billing cycles around
/// `reference` for the given day-of-month anchors. Month lengths are handled
/// by clamping, so a cycle anchored to the 31st opens on Feb 28/29.
pub fn periods(statement_start_day: u32, payment_day: u32, reference: NaiveDate) -> StatementPeriods {
    let current_start = cycle_start_on_or_before(statement_start_day, reference);
    StatementPeriods {
        previous: cycle_from_start(
            start_in_adjacent_month(current_start, statement_start_day, -1),
            statement_start_day,
            payment_day,
        ),
        current: cycle_from_start(current_start, statement_start_day, payment_day),
        future: cycle_from_start(
            start_in_adjacent_month(current_start, statement_start_day, 1),
            statement_start_day,
            payment_day,
        ),
    }
}

/// Posted activity of one cycle, summed over the half-open `[start, end)`
/// window: `balance` totals the outflow postings, `payments` the inflows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatementDetails {
    pub balance: f64,
    pub payments: f64,
}

/// Sums the account's posted transactions with `start <= date < end`. Only
/// actually-posted facts count; projected occurrences never enter a
/// statement balance.
pub fn statement_details(
    account: &Account,
    start: NaiveDate,
    end: NaiveDate,
    transactions: &[Transaction],
) -> StatementDetails {
    let mut balance = 0.0;
    let mut payments = 0.0;
    for transaction in transactions {
        if transaction.account_id != account.id {
            continue;
        }
        if transaction.date < start || transaction.date >= end {
            continue;
        }
        if transaction.is_inflow() {
            payments += transaction.amount;
        } else {
            balance += transaction.amount;
        }
    }
    StatementDetails {
        balance: round_cents(balance),
        payments: round_cents(payments),
    }
}

fn cycle_start_on_or_before(statement_start_day: u32, reference: NaiveDate) -> NaiveDate {
    let candidate = calendar::clamp_day(reference.year(), reference.month(), statement_start_day);
    if candidate <= reference {
        candidate
    } else {
        start_in_adjacent_month(candidate, statement_start_day, -1)
    }
}

fn start_in_adjacent_month(start: NaiveDate, statement_start_day: u32, months: i32) -> NaiveDate {
    calendar::shift_months(start, months, statement_start_day)
}

fn cycle_from_start(start: NaiveDate, statement_start_day: u32, payment_day: u32) -> StatementCycle {
    let next_start = start_in_adjacent_month(start, statement_start_day, 1);
    let end = next_start - Duration::days(1);
    StatementCycle {
        start,
        end,
        payment_due: payment_due_for(end, statement_start_day, payment_day),
    }
}

// Billing commonly precedes payment into the next calendar month: when the
// payment day falls before the statement-open day it belongs to the month
// after the cycle ends, otherwise to the cycle-end month itself. The same
// rule applies to all three windows.
fn payment_due_for(cycle_end: NaiveDate, statement_start_day: u32, payment_day: u32) -> NaiveDate {
    if payment_day < statement_start_day {
        calendar::shift_months(cycle_end, 1, payment_day)
    } else {
        calendar::clamp_day(cycle_end.year(), cycle_end.month(), payment_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cycles_are_contiguous_and_non_overlapping() {
        let periods = periods(15, 5, ymd(2025, 3, 20));
        assert_eq!(periods.current.start, ymd(2025, 3, 15));
        assert_eq!(periods.current.end, ymd(2025, 4, 14));
        assert_eq!(
            periods.previous.end + Duration::days(1),
            periods.current.start
        );
        assert_eq!(periods.current.end + Duration::days(1), periods.future.start);
    }

    #[test]
    fn payment_before_statement_day_lands_next_month() {
        // Cycle 15 Mar - 14 Apr, payment day 5 < start day 15 -> due 5 May.
        let periods = periods(15, 5, ymd(2025, 3, 20));
        assert_eq!(periods.current.payment_due, ymd(2025, 5, 5));
        assert_eq!(periods.previous.payment_due, ymd(2025, 4, 5));
    }

    #[test]
    fn payment_after_statement_day_stays_in_cycle_end_month() {
        // Cycle 5 Mar - 4 Apr, payment day 20 >= start day 5 -> due 20 Apr.
        let periods = periods(5, 20, ymd(2025, 3, 10));
        assert_eq!(periods.current.end, ymd(2025, 4, 4));
        assert_eq!(periods.current.payment_due, ymd(2025, 4, 20));
    }

    #[test]
    fn reference_before_anchor_falls_into_prior_cycle() {
        let periods = periods(15, 5, ymd(2025, 3, 10));
        assert_eq!(periods.current.start, ymd(2025, 2, 15));
        assert_eq!(periods.current.end, ymd(2025, 3, 14));
    }

    #[test]
    fn day_31_anchor_clamps_in_short_months() {
        let periods = periods(31, 15, ymd(2025, 2, 10));
        assert_eq!(periods.current.start, ymd(2025, 1, 31));
        // February's open clamps to the 28th, so January's cycle runs to the 27th.
        assert_eq!(periods.current.end, ymd(2025, 2, 27));
        assert_eq!(periods.future.start, ymd(2025, 2, 28));
        assert_eq!(periods.future.end, ymd(2025, 3, 30));
    }
}
