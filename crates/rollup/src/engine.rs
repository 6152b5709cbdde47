use crate::config::{RollupConfig, SortOrder};
use crate::due_date::earliest_due_date;
use crate::group::group_lines;
use crate::model::{
    LineRecord, RawLine, RollupMeta, RollupReport, Row, SkipCounts, SkipReason,
};
use crate::projection::project;
use crate::rollup::compute;
use crate::status::classify;
use crate::summary::compute_summary;

/// Validate raw lines, then roll them up. Unusable lines are counted, not fatal.
pub fn run(config: &RollupConfig, raw: &[RawLine]) -> RollupReport {
    let (records, skipped) = validate_lines(config, raw);
    let mut report = run_records(config, &records);
    report.meta.input_lines = raw.len();
    report.skipped = skipped;
    report
}

/// Roll up already-validated lines.
pub fn run_records(config: &RollupConfig, records: &[LineRecord]) -> RollupReport {
    let rows = build_rows(config, records);
    let summary = compute_summary(&rows);

    log::debug!(
        "rollup '{}': {} lines -> {} rows",
        config.name,
        records.len(),
        rows.len()
    );

    RollupReport {
        meta: RollupMeta {
            config_name: config.name.clone(),
            group_by: config.group_by,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            input_lines: records.len(),
        },
        summary,
        rows,
        skipped: SkipCounts::default(),
    }
}

/// Boundary step: normalize every raw line, dropping the ones that cannot be grouped.
pub fn validate_lines(config: &RollupConfig, raw: &[RawLine]) -> (Vec<LineRecord>, SkipCounts) {
    let style = config.numbers.decimal_style;
    let mut skipped = SkipCounts::default();
    let mut records = Vec::with_capacity(raw.len());

    for (i, line) in raw.iter().enumerate() {
        match LineRecord::from_raw(line, style) {
            Ok(record) => records.push(record),
            Err(SkipReason::MissingTransactionId) => {
                skipped.missing_transaction_id += 1;
                log::debug!("line {}: no transactionId, skipped", i + 1);
            }
            Err(SkipReason::UnknownItemKind(kind)) => {
                skipped.unknown_item_kind += 1;
                log::warn!("line {}: unknown item kind '{}', skipped", i + 1, kind);
            }
        }
    }

    (records, skipped)
}

/// Group, roll up, classify and project; then filter and order per config.
pub fn build_rows(config: &RollupConfig, records: &[LineRecord]) -> Vec<Row> {
    let mut rows: Vec<Row> = group_lines(records, config.group_by)
        .iter()
        .map(|group| {
            let rollup = compute(group, config.debt);
            let due = earliest_due_date(&group.due_date_candidates);
            let status = classify(rollup.total_due, rollup.total_paid);
            project(group, &rollup, due, status)
        })
        .collect();

    if let Some(ref keep) = config.filter.status {
        rows.retain(|r| keep.contains(&r.status));
    }

    match config.sort {
        SortOrder::Input => {}
        SortOrder::DueDate => rows.sort_by_key(|r| {
            let instant = r.should_pay_date.map(|d| d.instant);
            (instant.is_none(), instant)
        }),
        SortOrder::DebtDesc => rows.sort_by(|a, b| b.total_debt.total_cmp(&a.total_debt)),
    }

    rows
}
