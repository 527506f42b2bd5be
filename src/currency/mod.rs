use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ForecastError;

/// Static conversion table: currency code to multiplier into the base
/// currency. Rates are supplied by the caller as already-loaded inputs; the
/// engine performs no rate sourcing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionTable {
    base: String,
    rates: HashMap<String, f64>,
}

impl ConversionTable {
    pub fn new(base: impl Into<String>) -> Self {
        let base = normalize(base.into());
        let mut rates = HashMap::new();
        rates.insert(base.clone(), 1.0);
        Self { base, rates }
    }

    pub fn with_rate(mut self, code: impl Into<String>, multiplier: f64) -> Self {
        self.insert(code, multiplier);
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, multiplier: f64) {
        self.rates.insert(normalize(code.into()), multiplier);
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Multiplier from `code` into the base currency. The base itself always
    /// resolves to parity.
    pub fn rate(&self, code: &str) -> Result<f64, ForecastError> {
        let code = normalize(code.to_string());
        if code == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(&code)
            .copied()
            .ok_or(ForecastError::MissingConversionRate { currency: code })
    }

    /// Converts an amount in `code` into the base currency.
    pub fn to_base(&self, amount: f64, code: &str) -> Result<f64, ForecastError> {
        Ok(amount * self.rate(code)?)
    }
}

fn normalize(code: String) -> String {
    code.trim().to_ascii_uppercase()
}
