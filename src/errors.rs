use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type that captures the recoverable projection failures. A failing
/// rule is excluded from the event stream and reported alongside the result;
/// it never aborts the forecast for unrelated accounts.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastError {
    #[error("Invalid recurrence rule {rule_id}: {reason}")]
    InvalidRule { rule_id: Uuid, reason: String },
    #[error("Recurrence rule {rule_id} exceeded the expansion step cap")]
    UnboundedExpansion { rule_id: Uuid },
    #[error("No conversion rate for currency {currency}")]
    MissingConversionRate { currency: String },
}
