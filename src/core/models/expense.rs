use super::budget::Period;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A personal expense. Never mutated once recorded.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn period(&self) -> Period {
        Period::of(&self.date)
    }
}

/// Optional filters for expense listings. The month filter applies only
/// when both `month` and `year` are present.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(ref user_id) = self.user_id {
            if expense.user_id != *user_id {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if expense.category != *category {
                return false;
            }
        }
        if let (Some(month), Some(year)) = (self.month, self.year) {
            if !(Period { month, year }).contains(&expense.date) {
                return false;
            }
        }
        true
    }
}
