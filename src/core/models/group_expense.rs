use crate::core::errors::SpendwiseError;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Total divided evenly across every member, leftover cents handed out
    /// in member order.
    Equal,
    /// Caller supplies each member's amount explicitly.
    Exact,
}

impl SplitType {
    pub fn parse(value: &str) -> Result<Self, SpendwiseError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "exact" => Ok(SplitType::Exact),
            other => Err(SpendwiseError::InvalidSplit(format!("unknown split type `{}`", other))),
        }
    }
}

impl std::fmt::Display for SplitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SplitType::Equal => "equal",
            SplitType::Exact => "exact",
        };
        write!(f, "{}", s)
    }
}

/// One member's obligation towards a group expense.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Share {
    pub user_id: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupExpense {
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub total_amount: Decimal,
    pub category: String,
    pub paid_by: String,
    pub payer_name: String,
    pub split_type: SplitType,
    pub date: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    /// Frozen when the expense is recorded; always sums to `total_amount`.
    #[serde(skip)]
    pub shares: Vec<Share>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_parse() {
        assert_eq!(SplitType::parse("equal").unwrap(), SplitType::Equal);
        assert_eq!(SplitType::parse(" EXACT ").unwrap(), SplitType::Exact);
        assert!(matches!(SplitType::parse("weighted"), Err(SpendwiseError::InvalidSplit(_))));
        assert_eq!(SplitType::Equal.to_string(), "equal");
    }
}
