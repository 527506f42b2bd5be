//! Property carrying-cost derivation.

use chrono::NaiveDate;

use super::{DerivedSchedule, ScheduleEntry, SyntheticSource};
use crate::errors::ForecastError;
use crate::ledger::{Account, AccountKind, Frequency, RecurrenceRule, RuleKind};
use crate::schedule::{self, DateWindow};

/// Derives the recurring carrying-cost obligations (tax, insurance, HOA) of a
/// property account over `window`, plus an offsetting rental income when the
/// account is marked as a rental. Each figure becomes an in-memory rule fed
/// through the shared expander, so cadence semantics match explicit rules
/// exactly.
pub fn derive(
    account: &Account,
    window: DateWindow,
) -> Result<Vec<DerivedSchedule>, ForecastError> {
    if account.kind != AccountKind::Property {
        return Ok(Vec::new());
    }
    let costs = match &account.property_costs {
        Some(costs) => costs,
        None => return Ok(Vec::new()),
    };

    let components = [
        (costs.tax, SyntheticSource::PropertyTax, RuleKind::Expense),
        (
            costs.insurance,
            SyntheticSource::PropertyInsurance,
            RuleKind::Expense,
        ),
        (costs.hoa, SyntheticSource::PropertyHoa, RuleKind::Expense),
        (
            costs.rental_income,
            SyntheticSource::RentalIncome,
            RuleKind::Income,
        ),
    ];

    let mut schedules = Vec::new();
    for (amount, source, kind) in components {
        let amount = match amount {
            Some(amount) if amount > 0.0 => amount,
            _ => continue,
        };
        let rule = carrying_cost_rule(account, amount, kind, costs.frequency, costs.first_due_date)?;
        let entries: Vec<ScheduleEntry> = schedule::expand(&rule, window)?
            .into_iter()
            .map(|occurrence| ScheduleEntry {
                date: occurrence.date,
                amount: occurrence.amount,
            })
            .collect();
        if entries.is_empty() {
            continue;
        }
        schedules.push(DerivedSchedule {
            account_id: account.settlement_account(),
            derived_from: account.id,
            source,
            currency: account.currency.clone(),
            entries,
        });
    }
    Ok(schedules)
}

fn carrying_cost_rule(
    account: &Account,
    amount: f64,
    kind: RuleKind,
    frequency: Frequency,
    first_due_date: NaiveDate,
) -> Result<RecurrenceRule, ForecastError> {
    RecurrenceRule::new(
        format!("{} carrying cost", account.name),
        account.settlement_account(),
        amount,
        kind,
        account.currency.clone(),
        frequency,
        1,
        first_due_date,
    )
}
