use std::collections::HashMap;

use crate::config::GroupBy;
use crate::model::{CostBatch, LineRecord, MergedItem, TransactionGroup};

/// Fold state for [`group_lines`]. Groups keep first-occurrence order.
#[derive(Debug, Default)]
pub struct GroupSet {
    mode: GroupBy,
    groups: Vec<TransactionGroup>,
    index: HashMap<String, usize>,
}

impl GroupSet {
    pub fn new(mode: GroupBy) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Fold one line in, returning the grown set.
    pub fn absorb(mut self, line: &LineRecord) -> Self {
        let key = match self.mode {
            GroupBy::Transaction => line.transaction_id.clone(),
            GroupBy::Item => line.item.to_string(),
        };

        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.groups.push(TransactionGroup::empty(key.clone()));
                let idx = self.groups.len() - 1;
                self.index.insert(key, idx);
                idx
            }
        };

        self.groups[idx].add_line(line);
        self
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<TransactionGroup> {
        self.groups
    }
}

/// Group lines by transaction (or by item), merging repeated item references.
pub fn group_lines(lines: &[LineRecord], mode: GroupBy) -> Vec<TransactionGroup> {
    lines
        .iter()
        .fold(GroupSet::new(mode), GroupSet::absorb)
        .into_groups()
}

impl TransactionGroup {
    pub fn empty(key: String) -> Self {
        Self {
            key,
            items: Vec::new(),
            line_count: 0,
            total_amount: 0.0,
            total_due: 0.0,
            total_paid: 0.0,
            source_debt: None,
            total_cost: None,
            total_sell_amount: None,
            due_date_candidates: Vec::new(),
            counterparty_name: None,
            created_at: None,
        }
    }

    fn add_line(&mut self, line: &LineRecord) {
        self.line_count += 1;

        let pos = match self.items.iter().position(|m| m.item == line.item) {
            Some(pos) => pos,
            None => {
                self.items.push(MergedItem {
                    item: line.item.clone(),
                    name: None,
                    warehouse_name: None,
                    amount: 0.0,
                    cost_batches: Vec::new(),
                });
                self.items.len() - 1
            }
        };
        let merged = &mut self.items[pos];
        merged.amount += line.amount;
        if merged.name.is_none() {
            merged.name = line.item_name.clone();
        }
        if merged.warehouse_name.is_none() {
            merged.warehouse_name = line.warehouse_name.clone();
        }
        if let Some(cost) = line.unit_cost {
            merged.cost_batches.push(CostBatch {
                cost,
                amount: line.amount,
            });
        }

        // Every line counts, even when its item was already merged above
        self.total_amount += line.amount;
        self.total_due += line.due.unwrap_or(0.0);
        self.total_paid += line.paid.unwrap_or(0.0);

        if let Some(debt) = line.debt {
            self.source_debt = Some(self.source_debt.unwrap_or(0.0) + debt);
        }
        if let Some(cost) = line.unit_cost {
            self.total_cost = Some(self.total_cost.unwrap_or(0.0) + cost * line.amount);
        }
        if let Some(price) = line.unit_sell_price {
            self.total_sell_amount =
                Some(self.total_sell_amount.unwrap_or(0.0) + price * line.amount);
        }

        if let Some(ref date) = line.should_pay_date {
            self.due_date_candidates.push(date.clone());
        }
        if self.counterparty_name.is_none() {
            self.counterparty_name = line.counterparty_name.clone();
        }
        if self.created_at.is_none() {
            self.created_at = line.created_at.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemKind, ItemRef};

    fn line(tx: &str, item: ItemRef, amount: f64) -> LineRecord {
        LineRecord::new(tx, item, amount)
    }

    fn product(id: &str) -> ItemRef {
        ItemRef::new(ItemKind::Product, id)
    }

    fn raw(id: &str) -> ItemRef {
        ItemRef::new(ItemKind::Raw, id)
    }

    #[test]
    fn repeated_item_merges_but_total_counts_every_line() {
        let lines = vec![
            line("T1", product("P1"), 2.0),
            line("T1", product("P1"), 3.0),
            line("T1", product("P2"), 1.0),
        ];
        let groups = group_lines(&lines, GroupBy::Transaction);
        assert_eq!(groups.len(), 1);

        let g = &groups[0];
        assert_eq!(g.key, "T1");
        assert_eq!(g.line_count, 3);
        assert_eq!(g.total_amount, 6.0);
        assert_eq!(g.items.len(), 2);
        assert_eq!(g.items[0].item, product("P1"));
        assert_eq!(g.items[0].amount, 5.0);
        assert_eq!(g.items[1].item, product("P2"));
        assert_eq!(g.items[1].amount, 1.0);
    }

    #[test]
    fn product_and_raw_with_same_id_stay_apart() {
        let lines = vec![line("T1", product("7"), 1.0), line("T1", raw("7"), 4.0)];
        let groups = group_lines(&lines, GroupBy::Transaction);
        let items = &groups[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, 1.0);
        assert_eq!(items[1].item.kind(), ItemKind::Raw);
        assert_eq!(items[1].amount, 4.0);
    }

    #[test]
    fn groups_follow_first_occurrence() {
        let lines = vec![
            line("B", product("P1"), 1.0),
            line("A", product("P1"), 1.0),
            line("B", product("P2"), 1.0),
            line("C", product("P1"), 1.0),
        ];
        let keys: Vec<String> = group_lines(&lines, GroupBy::Transaction)
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn money_fields_sum_with_missing_as_zero() {
        let mut a = line("T1", product("P1"), 1.0);
        a.due = Some(1000.0);
        a.paid = Some(200.0);
        let mut b = line("T1", product("P2"), 1.0);
        b.due = Some(500.0);
        let c = line("T1", product("P3"), 1.0);

        let g = &group_lines(&[a, b, c], GroupBy::Transaction)[0];
        assert_eq!(g.total_due, 1500.0);
        assert_eq!(g.total_paid, 200.0);
        assert_eq!(g.source_debt, None);
        assert_eq!(g.total_cost, None);
    }

    #[test]
    fn source_debt_and_costs_accumulate_when_present() {
        let mut a = line("T1", product("P1"), 2.0);
        a.debt = Some(300.0);
        a.unit_cost = Some(100.0);
        a.unit_sell_price = Some(150.0);
        let mut b = line("T1", product("P1"), 3.0);
        b.debt = Some(0.0);
        b.unit_cost = Some(120.0);
        b.unit_sell_price = Some(150.0);

        let g = &group_lines(&[a, b], GroupBy::Transaction)[0];
        assert_eq!(g.source_debt, Some(300.0));
        assert_eq!(g.total_cost, Some(2.0 * 100.0 + 3.0 * 120.0));
        assert_eq!(g.total_sell_amount, Some(5.0 * 150.0));
        assert_eq!(g.items[0].cost_batches.len(), 2);
    }

    #[test]
    fn display_fields_take_first_non_empty() {
        let a = line("T1", product("P1"), 1.0);
        let mut b = line("T1", product("P1"), 1.0);
        b.item_name = Some("Chair".into());
        b.warehouse_name = Some("Main".into());
        b.counterparty_name = Some("Anvar".into());
        let mut c = line("T1", product("P1"), 1.0);
        c.item_name = Some("Stool".into());
        c.counterparty_name = Some("Other".into());

        let g = &group_lines(&[a, b, c], GroupBy::Transaction)[0];
        assert_eq!(g.items[0].name.as_deref(), Some("Chair"));
        assert_eq!(g.items[0].warehouse_name.as_deref(), Some("Main"));
        assert_eq!(g.counterparty_name.as_deref(), Some("Anvar"));
    }

    #[test]
    fn due_dates_collected_per_group() {
        let mut a = line("T1", product("P1"), 1.0);
        a.should_pay_date = Some("2024-03-05".into());
        let b = line("T1", product("P2"), 1.0);
        let mut c = line("T2", product("P1"), 1.0);
        c.should_pay_date = Some("2024-01-01".into());

        let groups = group_lines(&[a, b, c], GroupBy::Transaction);
        assert_eq!(groups[0].due_date_candidates, vec!["2024-03-05"]);
        assert_eq!(groups[1].due_date_candidates, vec!["2024-01-01"]);
    }

    #[test]
    fn group_by_item_rolls_up_across_transactions() {
        let lines = vec![
            line("T1", product("B1"), 2.0),
            line("T2", product("B1"), 5.0),
            line("T2", raw("B1"), 1.0),
        ];
        let groups = group_lines(&lines, GroupBy::Item);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "product:B1");
        assert_eq!(groups[0].total_amount, 7.0);
        assert_eq!(groups[0].line_count, 2);
        assert_eq!(groups[1].key, "raw:B1");
    }

    #[test]
    fn absorb_is_a_plain_fold() {
        let set = GroupSet::new(GroupBy::Transaction);
        assert!(set.is_empty());
        let set = set
            .absorb(&line("T1", product("P1"), 1.0))
            .absorb(&line("T2", product("P1"), 1.0))
            .absorb(&line("T1", product("P1"), 1.0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn negative_amounts_are_added_not_clamped() {
        let lines = vec![line("T1", product("P1"), 5.0), line("T1", product("P1"), -2.0)];
        let g = &group_lines(&lines, GroupBy::Transaction)[0];
        assert_eq!(g.items[0].amount, 3.0);
        assert_eq!(g.total_amount, 3.0);
    }
}
