use crate::due_date::DueDate;
use crate::model::{PaymentStatus, Row, RowItem, TransactionGroup};
use crate::rollup::Rollup;

/// Reshape a group and its computed figures into a display row.
///
/// Structural only: every number comes from `group` or `rollup` unchanged.
pub fn project(
    group: &TransactionGroup,
    rollup: &Rollup,
    should_pay_date: Option<DueDate>,
    status: PaymentStatus,
) -> Row {
    let items = group
        .items
        .iter()
        .enumerate()
        .map(|(i, m)| RowItem {
            kind: m.item.kind(),
            id: m.item.id().to_string(),
            name: m.name.clone(),
            warehouse_name: m.warehouse_name.clone(),
            amount: m.amount,
            avg_unit_cost: rollup.item_unit_costs.get(i).copied().flatten(),
        })
        .collect();

    Row {
        key: group.key.clone(),
        items,
        line_count: group.line_count,
        total_amount: group.total_amount,
        total_due: rollup.total_due,
        total_paid: rollup.total_paid,
        total_debt: rollup.total_debt,
        should_pay_date,
        status,
        total_cost: rollup.total_cost,
        total_sell_amount: rollup.total_sell_amount,
        profit: rollup.profit,
        margin_percent: rollup.margin_percent,
        counterparty_name: group.counterparty_name.clone(),
        created_at: group.created_at.clone(),
    }
}
