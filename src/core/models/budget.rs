use crate::core::errors::SpendwiseError;
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A calendar month used to scope budgets and summaries.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, SpendwiseError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(SpendwiseError::InvalidPeriod { month, year });
        }
        Ok(Period { month, year })
    }

    pub fn of(date: &NaiveDateTime) -> Self {
        Period {
            month: date.month(),
            year: date.year(),
        }
    }

    pub fn contains(&self, date: &NaiveDateTime) -> bool {
        date.month() == self.month && date.year() == self.year
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn period(&self) -> Period {
        Period {
            month: self.month,
            year: self.year,
        }
    }

    /// True when this row occupies the unique (user, category, period) slot.
    pub fn is_slot(&self, user_id: &str, category: &str, period: Period) -> bool {
        self.user_id == user_id && self.category == category && self.period() == period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_period_rejects_out_of_range_month() {
        assert!(matches!(
            Period::new(13, 2024),
            Err(SpendwiseError::InvalidPeriod { month: 13, year: 2024 })
        ));
        assert!(Period::new(0, 2024).is_err());
        assert!(Period::new(12, 2024).is_ok());
    }

    #[test]
    fn test_period_contains_only_its_month() {
        let period = Period::new(3, 2024).unwrap();
        let inside = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(23, 59, 59).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let last_year = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert!(period.contains(&inside));
        assert!(!period.contains(&next));
        assert!(!period.contains(&last_year));
        assert_eq!(Period::of(&inside), period);
        assert_eq!(period.to_string(), "2024-03");
    }
}
