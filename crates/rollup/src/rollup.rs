//! Per-group financial figures: debt, weighted costs, profit.

use crate::config::DebtPolicy;
use crate::model::{CostBatch, TransactionGroup};

/// Financial figures for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    pub total_due: f64,
    pub total_paid: f64,
    pub total_debt: f64,
    /// Weighted average unit cost per merged item, parallel to `group.items`.
    pub item_unit_costs: Vec<Option<f64>>,
    pub total_cost: Option<f64>,
    pub total_sell_amount: Option<f64>,
    /// `total_sell_amount - total_cost`, only when both are known. May be negative.
    pub profit: Option<f64>,
    pub margin_percent: Option<f64>,
}

/// `Σ(cost × amount) / Σ amount`, or 0 when nothing was bought.
///
/// Amounts that cancel out up to rounding count as zero.
pub fn weighted_average_cost(batches: &[CostBatch]) -> f64 {
    let (weighted, amount, abs_amount) = batches.iter().fold((0.0, 0.0, 0.0), |(w, a, abs), b| {
        (w + b.cost * b.amount, a + b.amount, abs + b.amount.abs())
    });
    if amount.abs() <= f64::EPSILON * abs_amount * 4.0 {
        return 0.0;
    }
    let avg = weighted / amount;
    if avg.is_finite() {
        avg
    } else {
        0.0
    }
}

/// Debt for a group. A derived debt is never negative; a source debt passes through.
pub fn resolve_debt(group: &TransactionGroup, policy: DebtPolicy) -> f64 {
    let derived = (group.total_due - group.total_paid).max(0.0);
    match policy {
        DebtPolicy::Auto => group.source_debt.unwrap_or(derived),
        DebtPolicy::Derive => derived,
        DebtPolicy::Source => group.source_debt.unwrap_or(0.0),
    }
}

pub fn compute(group: &TransactionGroup, policy: DebtPolicy) -> Rollup {
    let item_unit_costs = group
        .items
        .iter()
        .map(|m| {
            if m.cost_batches.is_empty() {
                None
            } else {
                Some(weighted_average_cost(&m.cost_batches))
            }
        })
        .collect();

    let profit = match (group.total_sell_amount, group.total_cost) {
        (Some(sell), Some(cost)) => Some(sell - cost),
        _ => None,
    };
    let margin_percent = match (profit, group.total_sell_amount) {
        (Some(p), Some(sell)) if sell != 0.0 => Some(p / sell * 100.0),
        _ => None,
    };

    Rollup {
        total_due: group.total_due,
        total_paid: group.total_paid,
        total_debt: resolve_debt(group, policy),
        item_unit_costs,
        total_cost: group.total_cost,
        total_sell_amount: group.total_sell_amount,
        profit,
        margin_percent,
    }
}
