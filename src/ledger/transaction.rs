use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A posted ledger fact. Amounts are stored as positive magnitudes with a
/// kind tag; `signed_amount` resolves the direction. The engine consumes
/// these read-only, e.g. to total a card's statement cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    pub fn new(account_id: Uuid, date: NaiveDate, amount: f64, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            date,
            amount: amount.abs(),
            kind,
            currency: None,
            category: None,
            notes: None,
        }
    }

    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income | TransactionKind::TransferIn => self.amount,
            TransactionKind::Expense | TransactionKind::TransferOut => -self.amount,
        }
    }

    pub fn is_inflow(&self) -> bool {
        matches!(
            self.kind,
            TransactionKind::Income | TransactionKind::TransferIn
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
    TransferIn,
    TransferOut,
}
