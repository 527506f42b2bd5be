use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-occurrence exception to a recurrence rule, keyed by the rule and the
/// occurrence's *original* cadence date — a natural key, not a synthetic id.
/// Replacement fields are merged onto the occurrence; `skip` drops it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccurrenceOverride {
    pub rule_id: Uuid,
    pub original_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Replacement magnitude; the occurrence keeps its original direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub skip: bool,
}

impl OccurrenceOverride {
    pub fn skip(rule_id: Uuid, original_date: NaiveDate) -> Self {
        Self {
            rule_id,
            original_date,
            date: None,
            amount: None,
            skip: true,
        }
    }

    pub fn reschedule(rule_id: Uuid, original_date: NaiveDate, date: NaiveDate) -> Self {
        Self {
            rule_id,
            original_date,
            date: Some(date),
            amount: None,
            skip: false,
        }
    }

    pub fn amount(rule_id: Uuid, original_date: NaiveDate, amount: f64) -> Self {
        Self {
            rule_id,
            original_date,
            date: None,
            amount: Some(amount.abs()),
            skip: false,
        }
    }

    pub fn has_effect(&self) -> bool {
        self.skip || self.date.is_some() || self.amount.is_some()
    }
}

/// Keyed collection of occurrence overrides. At most one override exists per
/// (rule, original date) pair; inserting a duplicate key replaces the earlier
/// entry. Serializes as a plain list so the natural key never leaks into the
/// storage format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Vec<OccurrenceOverride>", into = "Vec<OccurrenceOverride>")]
pub struct OverrideSet {
    entries: HashMap<(Uuid, NaiveDate), OccurrenceOverride>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: OccurrenceOverride) {
        self.entries
            .insert((entry.rule_id, entry.original_date), entry);
    }

    pub fn remove(&mut self, rule_id: Uuid, original_date: NaiveDate) -> Option<OccurrenceOverride> {
        self.entries.remove(&(rule_id, original_date))
    }

    pub fn get(&self, rule_id: Uuid, original_date: NaiveDate) -> Option<&OccurrenceOverride> {
        self.entries.get(&(rule_id, original_date))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<OccurrenceOverride>> for OverrideSet {
    fn from(entries: Vec<OccurrenceOverride>) -> Self {
        let mut set = OverrideSet::new();
        for entry in entries {
            set.insert(entry);
        }
        set
    }
}

impl From<OverrideSet> for Vec<OccurrenceOverride> {
    fn from(set: OverrideSet) -> Self {
        let mut entries: Vec<OccurrenceOverride> = set.entries.into_values().collect();
        entries.sort_by_key(|entry| (entry.rule_id, entry.original_date));
        entries
    }
}

impl FromIterator<OccurrenceOverride> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = OccurrenceOverride>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

/// Partial override of one computed loan installment, keyed by the stable
/// installment index rather than the date: the index survives a recomputed
/// amortization schedule while the date can shift when earlier installments
/// are edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanPaymentOverride {
    pub account_id: Uuid,
    pub installment_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<f64>,
}

/// A non-recurring dated obligation. Once paid it becomes a historical ledger
/// fact and drops out of forecasting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillPayment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub direction: BillDirection,
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl BillPayment {
    pub fn new(
        account_id: Uuid,
        name: impl Into<String>,
        due_date: NaiveDate,
        amount: f64,
        direction: BillDirection,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            due_date,
            amount: amount.abs(),
            direction,
            status: BillStatus::Unpaid,
            currency: None,
        }
    }

    pub fn signed_amount(&self) -> f64 {
        match self.direction {
            BillDirection::Deposit => self.amount,
            BillDirection::Payment => -self.amount,
        }
    }

    pub fn is_unpaid(&self) -> bool {
        self.status == BillStatus::Unpaid
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BillDirection {
    Payment,
    Deposit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BillStatus {
    Unpaid,
    Paid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duplicate_key_replaces_earlier_entry() {
        let rule_id = Uuid::new_v4();
        let date = ymd(2025, 3, 1);
        let mut set = OverrideSet::new();
        set.insert(OccurrenceOverride::amount(rule_id, date, 100.0));
        set.insert(OccurrenceOverride::skip(rule_id, date));
        assert_eq!(set.len(), 1);
        assert!(set.get(rule_id, date).unwrap().skip);
    }

    #[test]
    fn serializes_as_sorted_list() {
        let rule_id = Uuid::new_v4();
        let mut set = OverrideSet::new();
        set.insert(OccurrenceOverride::skip(rule_id, ymd(2025, 5, 1)));
        set.insert(OccurrenceOverride::skip(rule_id, ymd(2025, 4, 1)));
        let json = serde_json::to_string(&set).unwrap();
        let restored: OverrideSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, set);
        let list: Vec<OccurrenceOverride> = set.into();
        assert_eq!(list[0].original_date, ymd(2025, 4, 1));
    }
}
