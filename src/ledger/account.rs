use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::Frequency;

/// Represents a financial account tracked within the ledger. The forecasting
/// engine only reads accounts; balances are mutated by ledger postings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    /// Day of month (1-31) on which a revolving-credit statement cycle opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_start_day: Option<u32>,
    /// Day of month (1-31) on which the statement payment falls due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_loan_id: Option<Uuid>,
    /// Account that loan or card payments are drawn from. Falls back to the
    /// account itself when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_terms: Option<LoanTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_costs: Option<PropertyCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind, currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            balance: 0.0,
            currency: currency.into(),
            interest_rate: None,
            credit_limit: None,
            statement_start_day: None,
            payment_day: None,
            linked_loan_id: None,
            settlement_account_id: None,
            loan_terms: None,
            property_costs: None,
            notes: None,
        }
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_statement_days(mut self, statement_start_day: u32, payment_day: u32) -> Self {
        self.statement_start_day = Some(statement_start_day);
        self.payment_day = Some(payment_day);
        self
    }

    pub fn with_settlement_account(mut self, account_id: Uuid) -> Self {
        self.settlement_account_id = Some(account_id);
        self
    }

    pub fn with_loan_terms(mut self, terms: LoanTerms) -> Self {
        self.loan_terms = Some(terms);
        self
    }

    pub fn with_property_costs(mut self, costs: PropertyCosts) -> Self {
        self.property_costs = Some(costs);
        self
    }

    /// Account that outgoing payments for this account settle against.
    pub fn settlement_account(&self) -> Uuid {
        self.settlement_account_id.unwrap_or(self.id)
    }

    /// Both cycle anchors, when the account is configured for statements.
    pub fn statement_anchors(&self) -> Option<(u32, u32)> {
        match (self.statement_start_day, self.payment_day) {
            (Some(start), Some(payment)) => Some((start, payment)),
            _ => None,
        }
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Loan,
    Investment,
    Property,
    Other,
}

/// Metadata the loan deriver amortizes into a payment schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    /// Annual nominal rate as a fraction (0.05 for 5%).
    pub annual_rate: f64,
    pub term_months: u32,
    pub first_payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_day: Option<u32>,
}

/// Per-period carrying-cost figures for a property account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyCosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoa: Option<f64>,
    pub frequency: Frequency,
    pub first_due_date: NaiveDate,
    /// Set when the property is rented out; emitted as an offsetting income.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_income: Option<f64>,
}
