//! Net position of every group member across the group's expenses.

use crate::core::models::group::Group;
use crate::core::models::group_expense::GroupExpense;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    IsOwed,
    Owes,
    Settled,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MemberBalance {
    pub user_id: String,
    pub user_name: String,
    /// Paid minus owed. Positive means the group owes this member.
    pub balance: Decimal,
    pub status: BalanceStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupBalance {
    pub group_id: String,
    pub total_expenses: Decimal,
    pub balances: Vec<MemberBalance>,
}

/// Reduces `expenses` into one balance per member of `group`.
///
/// Pure and order-independent: the result depends only on the set of
/// expenses. Members with no activity report zero. Expenses from other
/// groups are ignored.
pub fn aggregate_balances(group: &Group, expenses: &[GroupExpense]) -> GroupBalance {
    let mut net: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut total_expenses = Decimal::ZERO;

    for expense in expenses.iter().filter(|e| e.group_id == group.id) {
        total_expenses += expense.total_amount;
        *net.entry(expense.paid_by.as_str()).or_insert(Decimal::ZERO) += expense.total_amount;
        for share in &expense.shares {
            *net.entry(share.user_id.as_str()).or_insert(Decimal::ZERO) -= share.amount;
        }
    }

    let mut balances: Vec<MemberBalance> = group
        .members
        .iter()
        .map(|member| member_balance(&member.user_id, &member.user_name, net.remove(member.user_id.as_str())))
        .collect();

    // Anyone left in `net` has since left the group; keep them so the
    // balances still sum to zero.
    balances.extend(
        net.into_iter()
            .map(|(user_id, amount)| member_balance(user_id, user_id, Some(amount))),
    );

    GroupBalance {
        group_id: group.id.clone(),
        total_expenses,
        balances,
    }
}

fn member_balance(user_id: &str, user_name: &str, amount: Option<Decimal>) -> MemberBalance {
    let balance = amount.unwrap_or(Decimal::ZERO).normalize();
    let status = if balance > Decimal::ZERO {
        BalanceStatus::IsOwed
    } else if balance < Decimal::ZERO {
        BalanceStatus::Owes
    } else {
        BalanceStatus::Settled
    };
    MemberBalance {
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        balance,
        status,
    }
}
