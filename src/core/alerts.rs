//! Budget alert evaluation on personal-expense writes.

use crate::core::models::alert::{AlertSetting, BudgetAlert};
use crate::core::models::budget::{Budget, Period};
use crate::core::models::expense::Expense;
use rust_decimal::Decimal;

/// Total a user spent in `category` during `period`.
pub fn category_spend(expenses: &[Expense], user_id: &str, category: &str, period: Period) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.user_id == user_id && e.category == category && period.contains(&e.date))
        .map(|e| e.amount)
        .sum()
}

/// Decides whether `spent` against `budget` warrants an alert.
///
/// Returns `None` when there is no budget for the period, or when spend is
/// below the threshold. `setting` overrides `default_threshold`.
pub fn evaluate_budget_alert(
    category: &str,
    spent: Decimal,
    budget: Option<&Budget>,
    setting: Option<&AlertSetting>,
    default_threshold: u8,
) -> Option<BudgetAlert> {
    let budget = budget?;
    let threshold = setting.map(|s| s.threshold_percentage).unwrap_or(default_threshold);

    let ratio = if budget.amount > Decimal::ZERO {
        spent / budget.amount * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let exceeded = spent > budget.amount;
    let threshold_reached = !exceeded && budget.amount > Decimal::ZERO && ratio >= Decimal::from(threshold);

    if !exceeded && !threshold_reached {
        return None;
    }

    Some(BudgetAlert {
        category: category.to_string(),
        spent_amount: spent,
        budget_amount: budget.amount,
        percentage_used: ratio.round_dp(2),
        exceeded,
        threshold_reached,
        threshold,
    })
}
