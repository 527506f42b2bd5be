use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("cashflow_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Rounds a monetary value to cents. Used at reporting boundaries so that
/// statement and amortization totals are exact to the cent.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
