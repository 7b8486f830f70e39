//! Monthly spend-versus-budget report for a single user.

use crate::core::models::budget::{Budget, Period};
use crate::core::models::expense::Expense;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryComparison {
    pub category: String,
    pub spent: Decimal,
    pub budget: Decimal,
    /// `budget - spent`; negative when over budget.
    pub difference: Decimal,
    /// `spent / budget * 100` to two places, 0 without a budget.
    pub percentage: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlySummary {
    pub user_id: String,
    pub month: u32,
    pub year: i32,
    pub total_spending: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
    pub comparison: Vec<CategoryComparison>,
}

/// Builds the report for `user_id` in `period`.
///
/// Only categories with an expense or a budget in the period are listed.
/// They follow `category_order`; anything outside it comes last,
/// alphabetically.
pub fn summarize_month(
    user_id: &str,
    period: Period,
    expenses: &[Expense],
    budgets: &[Budget],
    category_order: &[String],
) -> MonthlySummary {
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for expense in expenses
        .iter()
        .filter(|e| e.user_id == user_id && period.contains(&e.date))
    {
        *by_category.entry(expense.category.clone()).or_insert(Decimal::ZERO) += expense.amount;
    }

    let budget_by_category: BTreeMap<&str, Decimal> = budgets
        .iter()
        .filter(|b| b.user_id == user_id && b.period() == period)
        .map(|b| (b.category.as_str(), b.amount))
        .collect();

    let mut seen: BTreeSet<&str> = by_category.keys().map(String::as_str).collect();
    seen.extend(budget_by_category.keys().copied());

    let mut ordered: Vec<&str> = category_order
        .iter()
        .map(String::as_str)
        .filter(|c| seen.contains(c))
        .collect();
    ordered.extend(seen.iter().copied().filter(|c| !category_order.iter().any(|o| o.as_str() == *c)));

    let comparison = ordered
        .into_iter()
        .map(|category| {
            let spent = by_category.get(category).copied().unwrap_or(Decimal::ZERO);
            let budget = budget_by_category.get(category).copied().unwrap_or(Decimal::ZERO);
            let percentage = if budget > Decimal::ZERO {
                (spent / budget * Decimal::ONE_HUNDRED).round_dp(2)
            } else {
                Decimal::ZERO
            };
            CategoryComparison {
                category: category.to_string(),
                spent,
                budget,
                difference: budget - spent,
                percentage,
            }
        })
        .collect();

    MonthlySummary {
        user_id: user_id.to_string(),
        month: period.month,
        year: period.year,
        total_spending: by_category.values().copied().sum(),
        by_category,
        comparison,
    }
}
