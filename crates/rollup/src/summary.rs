use std::collections::BTreeMap;

use crate::model::{Row, RollupSummary};

/// Compute KPI aggregates from projected rows.
pub fn compute_summary(rows: &[Row]) -> RollupSummary {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_amount = 0.0;
    let mut total_due = 0.0;
    let mut total_paid = 0.0;
    let mut total_debt = 0.0;
    let mut total_profit: Option<f64> = None;

    for r in rows {
        *status_counts.entry(r.status.to_string()).or_insert(0) += 1;
        total_amount += r.total_amount;
        total_due += r.total_due;
        total_paid += r.total_paid;
        total_debt += r.total_debt;
        if let Some(p) = r.profit {
            total_profit = Some(total_profit.unwrap_or(0.0) + p);
        }
    }

    RollupSummary {
        group_count: rows.len(),
        total_amount,
        total_due,
        total_paid,
        total_debt,
        total_profit,
        status_counts,
    }
}
