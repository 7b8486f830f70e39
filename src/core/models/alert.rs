use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AlertSetting {
    pub id: String,
    pub user_id: String,
    pub category: String,
    /// Percentage of the budget (1-100) at which a threshold alert fires.
    pub threshold_percentage: u8,
    pub email_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Alert payload attached to an expense-creation response.
///
/// `exceeded` and `threshold_reached` are mutually exclusive; an exceeded
/// budget never also reports the threshold.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BudgetAlert {
    pub category: String,
    pub spent_amount: Decimal,
    pub budget_amount: Decimal,
    pub percentage_used: Decimal,
    pub exceeded: bool,
    pub threshold_reached: bool,
    pub threshold: u8,
}
