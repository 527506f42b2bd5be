//! Recurrence expansion and exception resolution.
//!
//! `expand` turns one rule into the ordered occurrences inside a window;
//! `resolve` applies per-occurrence overrides on top. Both are pure and
//! restartable: the same inputs always reproduce the same sequence, so UI
//! call sites can recompute freely instead of caching date arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ForecastError;
use crate::ledger::calendar;
use crate::ledger::{OverrideSet, RecurrenceRule, RuleKind, MAX_EXPANSION_STEPS};

/// Inclusive date window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One concrete dated instance of a rule. `original_date` is the cadence date
/// the occurrence was emitted on; it survives a rescheduling override so the
/// occurrence stays addressable by its natural key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Occurrence {
    pub rule_id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub original_date: NaiveDate,
    /// Signed amount: income positive, expense negative.
    pub amount: f64,
    pub currency: String,
}

/// Expands `rule` into its ordered occurrences within `window`.
///
/// The cursor starts from `next_due_date` when the window lies at or beyond
/// it, otherwise from `start_date`, and is fast-forwarded to the window on
/// the rule's cadence grid. Transfers emit as a paired expense-at-source and
/// income-at-destination so consumers never special-case transfer semantics.
pub fn expand(rule: &RecurrenceRule, window: DateWindow) -> Result<Vec<Occurrence>, ForecastError> {
    rule.validate()?;

    let pinned = Some(rule.anchor_day());
    let mut cursor = if window.start < rule.next_due_date {
        rule.start_date
    } else {
        rule.next_due_date
    };

    let mut steps = 0usize;
    while cursor < window.start {
        cursor = calendar::step(cursor, rule.frequency, rule.interval, pinned);
        steps += 1;
        if steps > MAX_EXPANSION_STEPS {
            return Err(ForecastError::UnboundedExpansion { rule_id: rule.id });
        }
    }

    let mut occurrences = Vec::new();
    while cursor <= window.end {
        if let Some(end) = rule.end_date {
            if cursor > end {
                break;
            }
        }
        emit(rule, cursor, &mut occurrences);
        cursor = calendar::step(cursor, rule.frequency, rule.interval, pinned);
        steps += 1;
        if steps > MAX_EXPANSION_STEPS {
            return Err(ForecastError::UnboundedExpansion { rule_id: rule.id });
        }
    }

    tracing::debug!(
        rule = %rule.id,
        occurrences = occurrences.len(),
        steps,
        "expanded recurrence rule"
    );
    Ok(occurrences)
}

fn emit(rule: &RecurrenceRule, date: NaiveDate, out: &mut Vec<Occurrence>) {
    match rule.kind {
        RuleKind::Transfer => {
            let destination = rule
                .destination_account_id
                .expect("validated transfer rule has a destination");
            out.push(Occurrence {
                rule_id: rule.id,
                account_id: rule.source_account_id,
                date,
                original_date: date,
                amount: -rule.amount,
                currency: rule.currency.clone(),
            });
            out.push(Occurrence {
                rule_id: rule.id,
                account_id: destination,
                date,
                original_date: date,
                amount: rule.amount,
                currency: rule.currency.clone(),
            });
        }
        _ => out.push(Occurrence {
            rule_id: rule.id,
            account_id: rule.source_account_id,
            date,
            original_date: date,
            amount: rule.signed_amount(),
            currency: rule.currency.clone(),
        }),
    }
}

/// Applies overrides to expanded occurrences. Skips drop the occurrence;
/// replacement fields merge in while `original_date` keeps the override key,
/// so re-resolving the same expansion with the same set is idempotent and
/// removing an override restores the generic occurrence exactly.
pub fn resolve(occurrences: Vec<Occurrence>, overrides: &OverrideSet) -> Vec<Occurrence> {
    let mut resolved: Vec<Occurrence> = occurrences
        .into_iter()
        .filter_map(|mut occurrence| {
            match overrides.get(occurrence.rule_id, occurrence.original_date) {
                Some(entry) if entry.skip => None,
                Some(entry) => {
                    if let Some(date) = entry.date {
                        occurrence.date = date;
                    }
                    if let Some(amount) = entry.amount {
                        occurrence.amount = amount.abs() * occurrence.amount.signum();
                    }
                    Some(occurrence)
                }
                None => Some(occurrence),
            }
        })
        .collect();
    resolved.sort_by_key(|occurrence| occurrence.date);
    resolved
}

/// Convenience: expand then resolve in one call.
pub fn expand_resolved(
    rule: &RecurrenceRule,
    window: DateWindow,
    overrides: &OverrideSet,
) -> Result<Vec<Occurrence>, ForecastError> {
    Ok(resolve(expand(rule, window)?, overrides))
}
