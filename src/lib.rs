#![doc(test(attr(deny(warnings))))]

//! Cashflow Core turns declarative recurrence rules and account metadata into
//! concrete future cash events: it expands recurrences, applies per-occurrence
//! overrides, derives implicit obligations (loan amortization, credit-card
//! statements, property carrying costs), and simulates the resulting
//! multi-account balance trajectory to find worst-case liquidity points.

pub mod currency;
pub mod errors;
pub mod forecast;
pub mod ledger;
pub mod schedule;
pub mod statement;
pub mod synthetic;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Cashflow Core tracing initialized.");
    });
}
