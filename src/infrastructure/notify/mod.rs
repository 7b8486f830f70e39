pub mod in_memory;

use crate::core::errors::SpendwiseError;
use crate::core::models::alert::BudgetAlert;
use crate::core::models::user::User;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlertNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl AlertNotification {
    pub fn for_alert(user: &User, alert: &BudgetAlert) -> Self {
        let verdict = if alert.exceeded {
            "You have exceeded your budget!".to_string()
        } else {
            format!("You have reached {}% of your budget!", alert.threshold)
        };
        let body = format!(
            "Hi {},\n\nThis is an alert regarding your {} budget:\n\n\
             Budget Amount: ${:.2}\nAmount Spent: ${:.2}\nPercentage Used: {:.2}%\n\n\
             {}\n\nPlease review your expenses.\n",
            user.name, alert.category, alert.budget_amount, alert.spent_amount, alert.percentage_used, verdict
        );
        AlertNotification {
            recipient: user.email.clone(),
            subject: format!("Budget Alert: {}", alert.category),
            body,
            created_at: Utc::now(),
        }
    }
}

/// Delivery channel for budget alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send(&self, notification: AlertNotification) -> Result<(), SpendwiseError>;
}
