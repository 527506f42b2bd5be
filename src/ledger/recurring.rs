use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::{self, Frequency, WeekendPolicy};
use crate::errors::ForecastError;

/// Hard cap on stepping loops. Protects against pathological rules; a rule
/// that needs more steps than this over one window is reported as
/// [`ForecastError::UnboundedExpansion`], never looped on forever.
pub const MAX_EXPANSION_STEPS: usize = 4096;

/// A declarative recurrence: "1500 EUR out of checking, monthly on the 31st".
/// Amounts are positive magnitudes; `kind` carries the direction. Synthetic
/// derivers build these in memory as well, so a rule is not necessarily a
/// persisted record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrenceRule {
    pub id: Uuid,
    pub name: String,
    pub source_account_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<Uuid>,
    pub amount: f64,
    pub kind: RuleKind,
    pub currency: String,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Cursor to the next unmaterialized occurrence. Always >= `start_date`
    /// and on the rule's cadence grid.
    pub next_due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_day: Option<u32>,
    #[serde(default)]
    pub weekend_policy: WeekendPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleKind {
    Income,
    Expense,
    Transfer,
}

impl RecurrenceRule {
    /// Creates a validated rule with the cursor at `start_date`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        source_account_id: Uuid,
        amount: f64,
        kind: RuleKind,
        currency: impl Into<String>,
        frequency: Frequency,
        interval: u32,
        start_date: NaiveDate,
    ) -> Result<Self, ForecastError> {
        let rule = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            source_account_id,
            destination_account_id: None,
            amount: amount.abs(),
            kind,
            currency: currency.into(),
            frequency,
            interval,
            start_date,
            end_date: None,
            next_due_date: start_date,
            pinned_day: None,
            weekend_policy: WeekendPolicy::default(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Creates a validated transfer rule between two accounts.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        name: impl Into<String>,
        source_account_id: Uuid,
        destination_account_id: Uuid,
        amount: f64,
        currency: impl Into<String>,
        frequency: Frequency,
        interval: u32,
        start_date: NaiveDate,
    ) -> Result<Self, ForecastError> {
        let mut rule = Self::new(
            name,
            source_account_id,
            amount,
            RuleKind::Expense,
            currency,
            frequency,
            interval,
            start_date,
        )?;
        rule.kind = RuleKind::Transfer;
        rule.destination_account_id = Some(destination_account_id);
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_pinned_day(mut self, day: u32) -> Self {
        self.pinned_day = Some(day);
        self
    }

    pub fn with_weekend_policy(mut self, policy: WeekendPolicy) -> Self {
        self.weekend_policy = policy;
        self
    }

    /// Validates the structural invariants. Called at construction and again
    /// before expansion so a hand-built or deserialized rule cannot send the
    /// expander into a silent infinite loop.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.interval < 1 {
            return Err(self.invalid("interval must be at least 1"));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(self.invalid("end date precedes start date"));
            }
        }
        if let Some(day) = self.pinned_day {
            if !(1..=31).contains(&day) {
                return Err(self.invalid("pinned day must be within 1-31"));
            }
        }
        if self.next_due_date < self.start_date {
            return Err(self.invalid("next due date precedes start date"));
        }
        if self.kind == RuleKind::Transfer && self.destination_account_id.is_none() {
            return Err(self.invalid("transfer rule has no destination account"));
        }
        if !self.amount.is_finite() {
            return Err(self.invalid("amount is not a finite number"));
        }
        Ok(())
    }

    /// Day-of-month anchor used for monthly/yearly stepping.
    pub fn anchor_day(&self) -> u32 {
        self.pinned_day.unwrap_or_else(|| self.start_date.day())
    }

    /// Amount signed by kind, from the source account's point of view.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            RuleKind::Income => self.amount,
            RuleKind::Expense | RuleKind::Transfer => -self.amount,
        }
    }

    /// Recomputes the cursor after occurrences up to `reference` have been
    /// materialized into the ledger: the first cadence date strictly after
    /// `reference`, or `None` once the rule has ended.
    pub fn next_due_after(&self, reference: NaiveDate) -> Result<Option<NaiveDate>, ForecastError> {
        self.validate()?;
        let pinned = Some(self.anchor_day());
        let mut candidate = self.start_date;
        let mut steps = 0usize;
        while candidate <= reference {
            candidate = calendar::step(candidate, self.frequency, self.interval, pinned);
            steps += 1;
            if steps > MAX_EXPANSION_STEPS {
                return Err(ForecastError::UnboundedExpansion { rule_id: self.id });
            }
        }
        match self.end_date {
            Some(end) if candidate > end => Ok(None),
            _ => Ok(Some(candidate)),
        }
    }

    fn invalid(&self, reason: &str) -> ForecastError {
        ForecastError::InvalidRule {
            rule_id: self.id,
            reason: reason.to_string(),
        }
    }
}
