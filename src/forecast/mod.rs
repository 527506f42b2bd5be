//! Cash-flow simulation.
//!
//! `forecast` merges every explicit, synthetic, and one-off obligation inside
//! the horizon into one chronologically sorted event stream, converts it to a
//! base currency, and walks it per account to find each trajectory and its
//! worst-case liquidity point. A single bad rule is excluded and reported; it
//! never aborts the simulation for unrelated accounts.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::ConversionTable;
use crate::errors::ForecastError;
use crate::ledger::calendar;
use crate::ledger::{
    Account, AccountKind, BillPayment, Goal, LoanPaymentOverride, OverrideSet, RecurrenceRule,
    Transaction,
};
use crate::schedule::{self, DateWindow};
use crate::synthetic::{credit_card, loan, property, Obligation};
use crate::utils::round_cents;

/// Everything the simulator consumes. All inputs are already loaded; the
/// engine performs no I/O and never reads the system clock.
#[derive(Debug, Clone)]
pub struct ForecastInput<'a> {
    pub accounts: &'a [Account],
    pub rules: &'a [RecurrenceRule],
    pub overrides: &'a OverrideSet,
    pub loan_overrides: &'a [LoanPaymentOverride],
    pub bills: &'a [BillPayment],
    pub goals: &'a [Goal],
    pub transactions: &'a [Transaction],
    pub rates: &'a ConversionTable,
    pub today: NaiveDate,
    pub horizon_end: NaiveDate,
}

/// One applied event in the merged stream, in base currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashEvent {
    pub date: NaiveDate,
    pub account_id: Uuid,
    pub amount: f64,
    pub source: EventSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventSource {
    Rule { rule_id: Uuid },
    Synthetic { derived_from: Uuid },
    Bill { bill_id: Uuid },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryPoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// The minimum value reached by a projected trajectory, and where it occurs.
/// `account_id` is `None` for the combined portfolio trajectory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LowestPoint {
    pub date: NaiveDate,
    pub balance: f64,
    pub account_id: Option<Uuid>,
}

/// A rule excluded from the event stream, surfaced for the caller to report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleIssue {
    pub rule_id: Uuid,
    pub error: ForecastError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountProjection {
    pub account_id: Uuid,
    pub starting_balance: f64,
    pub ending_balance: f64,
    pub lowest: LowestPoint,
    pub trajectory: Vec<TrajectoryPoint>,
}

/// Projected horizon-end balance of a goal's linked account against its
/// target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProjection {
    pub goal_id: Uuid,
    pub target_amount: f64,
    pub projected_balance: f64,
    pub attainable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastReport {
    pub today: NaiveDate,
    pub horizon_end: NaiveDate,
    pub base_currency: String,
    pub accounts: Vec<AccountProjection>,
    /// Combined total across accounts, one point per event date.
    pub combined: Vec<TrajectoryPoint>,
    pub lowest: LowestPoint,
    pub goals: Vec<GoalProjection>,
    pub rule_issues: Vec<RuleIssue>,
}

/// Simulates the balance trajectory of every account over
/// `[today, horizon_end]`.
///
/// Fails only when an account's own balance cannot be normalized (the table
/// is unusable for the portfolio); per-rule failures land in `rule_issues`.
pub fn forecast(input: &ForecastInput) -> Result<ForecastReport, ForecastError> {
    let window = DateWindow::new(input.today, input.horizon_end);
    let mut issues = Vec::new();

    let obligations = collect_obligations(input, window, &mut issues);
    let mut events = Vec::new();
    for obligation in &obligations {
        append_events(obligation, input, window, &mut events, &mut issues);
    }
    events.sort_by_key(|event: &CashEvent| (event.date, event.account_id));

    let report = walk(input, window, events, issues)?;
    for issue in &report.rule_issues {
        tracing::warn!(rule = %issue.rule_id, error = %issue.error, "rule excluded from forecast");
    }
    Ok(report)
}

/// Gathers every obligation inside the horizon into the uniform union the
/// walker consumes, regardless of whether it was entered by the user or
/// derived from account metadata.
fn collect_obligations(
    input: &ForecastInput,
    window: DateWindow,
    issues: &mut Vec<RuleIssue>,
) -> Vec<Obligation> {
    let mut obligations: Vec<Obligation> = input
        .rules
        .iter()
        .cloned()
        .map(Obligation::Explicit)
        .collect();

    for account in input.accounts {
        match account.kind {
            AccountKind::Loan => match loan::derive(account, input.loan_overrides) {
                Ok(Some(schedule)) => obligations.push(Obligation::Synthetic(schedule)),
                Ok(None) => {}
                Err(error) => issues.push(RuleIssue {
                    rule_id: account.id,
                    error,
                }),
            },
            AccountKind::CreditCard => {
                if let Some(schedule) =
                    credit_card::derive(account, input.transactions, input.today)
                {
                    obligations.push(Obligation::Synthetic(schedule));
                }
            }
            AccountKind::Property => match property::derive(account, window) {
                Ok(derived) => {
                    obligations.extend(derived.into_iter().map(Obligation::Synthetic))
                }
                Err(error) => issues.push(RuleIssue {
                    rule_id: account.id,
                    error,
                }),
            },
            _ => {}
        }
    }

    obligations.extend(
        input
            .bills
            .iter()
            .filter(|bill| bill.is_unpaid() && window.contains(bill.due_date))
            .cloned()
            .map(Obligation::OneOff),
    );
    obligations
}

fn append_events(
    obligation: &Obligation,
    input: &ForecastInput,
    window: DateWindow,
    events: &mut Vec<CashEvent>,
    issues: &mut Vec<RuleIssue>,
) {
    match obligation {
        Obligation::Explicit(rule) => {
            let occurrences = match schedule::expand_resolved(rule, window, input.overrides) {
                Ok(occurrences) => occurrences,
                Err(error) => {
                    issues.push(RuleIssue {
                        rule_id: rule.id,
                        error,
                    });
                    return;
                }
            };
            let rate = match input.rates.rate(&rule.currency) {
                Ok(rate) => rate,
                Err(error) => {
                    issues.push(RuleIssue {
                        rule_id: rule.id,
                        error,
                    });
                    return;
                }
            };
            for occurrence in occurrences {
                // The weekend shift touches only the settlement date used
                // here; the rule's own cadence cursor is never moved, so
                // later occurrences cannot drift.
                let settled = calendar::adjust_for_weekend(occurrence.date, rule.weekend_policy);
                events.push(CashEvent {
                    date: settled,
                    account_id: occurrence.account_id,
                    amount: occurrence.amount * rate,
                    source: EventSource::Rule { rule_id: rule.id },
                });
            }
        }
        Obligation::Synthetic(schedule) => {
            let rate = match input.rates.rate(&schedule.currency) {
                Ok(rate) => rate,
                Err(error) => {
                    issues.push(RuleIssue {
                        rule_id: schedule.derived_from,
                        error,
                    });
                    return;
                }
            };
            for entry in &schedule.entries {
                if !window.contains(entry.date) {
                    continue;
                }
                events.push(CashEvent {
                    date: entry.date,
                    account_id: schedule.account_id,
                    amount: entry.amount * rate,
                    source: EventSource::Synthetic {
                        derived_from: schedule.derived_from,
                    },
                });
            }
        }
        Obligation::OneOff(bill) => {
            let currency = bill.currency.as_deref().unwrap_or(input.rates.base());
            match input.rates.to_base(bill.signed_amount(), currency) {
                Ok(amount) => events.push(CashEvent {
                    date: bill.due_date,
                    account_id: bill.account_id,
                    amount,
                    source: EventSource::Bill { bill_id: bill.id },
                }),
                Err(error) => issues.push(RuleIssue {
                    rule_id: bill.id,
                    error,
                }),
            }
        }
    }
}

fn walk(
    input: &ForecastInput,
    window: DateWindow,
    events: Vec<CashEvent>,
    issues: Vec<RuleIssue>,
) -> Result<ForecastReport, ForecastError> {
    let mut balances: HashMap<Uuid, f64> = HashMap::new();
    let mut projections: HashMap<Uuid, AccountProjection> = HashMap::new();
    let mut combined_total = 0.0;

    for account in input.accounts {
        let starting = input.rates.to_base(account.balance, &account.currency)?;
        balances.insert(account.id, starting);
        combined_total += starting;
        projections.insert(
            account.id,
            AccountProjection {
                account_id: account.id,
                starting_balance: round_cents(starting),
                ending_balance: round_cents(starting),
                lowest: LowestPoint {
                    date: window.start,
                    balance: round_cents(starting),
                    account_id: Some(account.id),
                },
                trajectory: vec![TrajectoryPoint {
                    date: window.start,
                    balance: round_cents(starting),
                }],
            },
        );
    }

    let mut combined = vec![TrajectoryPoint {
        date: window.start,
        balance: round_cents(combined_total),
    }];
    let mut lowest = LowestPoint {
        date: window.start,
        balance: round_cents(combined_total),
        account_id: None,
    };

    for event in &events {
        let balance = balances.entry(event.account_id).or_insert(0.0);
        *balance += event.amount;
        combined_total += event.amount;
        let balance = round_cents(*balance);
        let total = round_cents(combined_total);

        if let Some(projection) = projections.get_mut(&event.account_id) {
            projection.ending_balance = balance;
            push_point(&mut projection.trajectory, event.date, balance);
            if balance < projection.lowest.balance {
                projection.lowest = LowestPoint {
                    date: event.date,
                    balance,
                    account_id: Some(event.account_id),
                };
            }
        }

        push_point(&mut combined, event.date, total);
        if total < lowest.balance {
            lowest = LowestPoint {
                date: event.date,
                balance: total,
                account_id: Some(event.account_id),
            };
        }
    }

    let goals = project_goals(input, &projections);

    let mut accounts: Vec<AccountProjection> = projections.into_values().collect();
    accounts.sort_by_key(|projection| projection.account_id);

    Ok(ForecastReport {
        today: input.today,
        horizon_end: input.horizon_end,
        base_currency: input.rates.base().to_string(),
        accounts,
        combined,
        lowest,
        goals,
        rule_issues: issues,
    })
}

// Successive events on the same date collapse into one chart point.
fn push_point(trajectory: &mut Vec<TrajectoryPoint>, date: NaiveDate, balance: f64) {
    match trajectory.last_mut() {
        Some(last) if last.date == date => last.balance = balance,
        _ => trajectory.push(TrajectoryPoint { date, balance }),
    }
}

fn project_goals(
    input: &ForecastInput,
    projections: &HashMap<Uuid, AccountProjection>,
) -> Vec<GoalProjection> {
    input
        .goals
        .iter()
        .filter_map(|goal| {
            let account_id = goal.linked_account_id?;
            let projection = projections.get(&account_id)?;
            Some(GoalProjection {
                goal_id: goal.id,
                target_amount: goal.target_amount,
                projected_balance: projection.ending_balance,
                attainable: projection.ending_balance >= goal.target_amount,
            })
        })
        .collect()
}
