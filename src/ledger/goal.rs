use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A savings goal. Goals carry no cadence of their own; the forecast treats
/// one as funded by whatever rules or synthetic schedules already post to its
/// linked account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Goal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            linked_account_id: None,
            notes: None,
        }
    }

    pub fn with_linked_account(mut self, account_id: Uuid) -> Self {
        self.linked_account_id = Some(account_id);
        self
    }
}
