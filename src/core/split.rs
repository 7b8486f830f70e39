//! Division of a group expense into per-member shares.
//!
//! Arithmetic happens in minor currency units (cents) so the shares of an
//! expense always add back up to its total.

use crate::core::errors::SpendwiseError;
use crate::core::models::group_expense::{Share, SplitType};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;

/// Decimal places of the ledger currency.
pub const CURRENCY_SCALE: u32 = 2;

/// Splits `total` across `member_ids` (in group order) under `split_type`.
///
/// `exact_amounts` is only consulted for [`SplitType::Exact`].
pub fn split_expense(
    total: Decimal,
    member_ids: &[String],
    split_type: SplitType,
    exact_amounts: Option<&HashMap<String, Decimal>>,
) -> Result<Vec<Share>, SpendwiseError> {
    match split_type {
        SplitType::Equal => split_equal(total, member_ids),
        SplitType::Exact => {
            let amounts = exact_amounts
                .ok_or_else(|| SpendwiseError::InvalidSplit("exact split requires per-member amounts".to_string()))?;
            split_exact(total, member_ids, amounts)
        }
    }
}

/// Equal split. Every member gets `floor(total / n)` cents and the first
/// `remainder` members in the given order get one extra cent.
pub fn split_equal(total: Decimal, member_ids: &[String]) -> Result<Vec<Share>, SpendwiseError> {
    if member_ids.is_empty() {
        return Err(SpendwiseError::InvalidSplit("no members to split between".to_string()));
    }
    let total_units = to_minor_units(total)?;
    if total_units <= 0 {
        return Err(SpendwiseError::InvalidSplit("total amount must be positive".to_string()));
    }

    let count = member_ids.len() as i64;
    let base = total_units / count;
    let remainder = total_units % count;

    Ok(member_ids
        .iter()
        .enumerate()
        .map(|(idx, user_id)| {
            let units = if (idx as i64) < remainder { base + 1 } else { base };
            Share {
                user_id: user_id.clone(),
                amount: from_minor_units(units),
            }
        })
        .collect())
}

/// Exact split. Amounts must name group members only and add up to `total`
/// to the cent. Shares come back in group order.
pub fn split_exact(
    total: Decimal,
    member_ids: &[String],
    amounts: &HashMap<String, Decimal>,
) -> Result<Vec<Share>, SpendwiseError> {
    let total_units = to_minor_units(total)?;
    if total_units <= 0 {
        return Err(SpendwiseError::InvalidSplit("total amount must be positive".to_string()));
    }
    if amounts.is_empty() {
        return Err(SpendwiseError::InvalidSplit("exact split requires per-member amounts".to_string()));
    }
    if let Some(outsider) = amounts.keys().find(|id| !member_ids.contains(id)) {
        return Err(SpendwiseError::NotAMember(outsider.clone()));
    }

    let mut assigned = 0i64;
    let mut shares = Vec::with_capacity(amounts.len());
    for user_id in member_ids {
        if let Some(amount) = amounts.get(user_id) {
            let units = to_minor_units(*amount)?;
            if units < 0 {
                return Err(SpendwiseError::InvalidSplit(format!("negative share for {}", user_id)));
            }
            assigned = assigned
                .checked_add(units)
                .ok_or_else(|| SpendwiseError::InvalidSplit("shares are out of range".to_string()))?;
            shares.push(Share {
                user_id: user_id.clone(),
                amount: from_minor_units(units),
            });
        }
    }

    if assigned != total_units {
        return Err(SpendwiseError::InvalidSplit(format!(
            "shares add up to {} but the total is {}",
            from_minor_units(assigned),
            from_minor_units(total_units)
        )));
    }
    Ok(shares)
}

/// Converts an amount to cents, rejecting sub-cent precision.
pub fn to_minor_units(amount: Decimal) -> Result<i64, SpendwiseError> {
    let out_of_range = || SpendwiseError::InvalidSplit(format!("{} is out of range", amount));
    let scaled = amount
        .checked_mul(Decimal::from(10i64.pow(CURRENCY_SCALE)))
        .ok_or_else(out_of_range)?;
    if !scaled.fract().is_zero() {
        return Err(SpendwiseError::InvalidSplit(format!(
            "{} has more than {} decimal places",
            amount, CURRENCY_SCALE
        )));
    }
    scaled.to_i64().ok_or_else(out_of_range)
}

fn from_minor_units(units: i64) -> Decimal {
    Decimal::new(units, CURRENCY_SCALE)
}
