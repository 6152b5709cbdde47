//! Loading raw line records from already-fetched API payloads.

use std::path::Path;

use serde_json::Value;

use crate::config::ColumnMapping;
use crate::error::RollupError;
use crate::model::{RawId, RawLine, RawText};
use crate::numeric::NumberLike;

/// Keys under which paginated API responses carry their rows.
const ENVELOPE_KEYS: [&str; 3] = ["results", "data", "items"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Infer from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Parse a JSON array of line records, or an envelope object carrying one.
pub fn load_json_lines(json: &str) -> Result<Vec<RawLine>, RollupError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| RollupError::InputParse(e.to_string()))?;

    let elements = match value {
        Value::Array(elements) => elements,
        Value::Object(mut map) => {
            let found = ENVELOPE_KEYS
                .iter()
                .find_map(|k| map.remove(*k).filter(Value::is_array));
            match found {
                Some(Value::Array(elements)) => elements,
                _ => {
                    return Err(RollupError::InputParse(
                        "object input must carry a `results`, `data` or `items` array".into(),
                    ))
                }
            }
        }
        _ => {
            return Err(RollupError::InputParse(
                "expected an array of line records".into(),
            ))
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| {
            serde_json::from_value(element)
                .map_err(|e| RollupError::InputParse(format!("record {}: {e}", i + 1)))
        })
        .collect()
}

/// Parse CSV with a header row, mapping columns per `columns`.
///
/// `transaction_id`, `item_id` and `amount` headers are required; every other
/// mapped column is optional. Cells are kept as text and normalized later.
pub fn load_csv_lines(
    csv_data: &str,
    columns: &ColumnMapping,
) -> Result<Vec<RawLine>, RollupError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RollupError::InputParse(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let idx = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        idx(name).ok_or_else(|| RollupError::MissingColumn {
            column: name.into(),
        })
    };

    let transaction_id_idx = required(&columns.transaction_id)?;
    let item_id_idx = required(&columns.item_id)?;
    let amount_idx = required(&columns.amount)?;

    let item_kind_idx = idx(&columns.item_kind);
    let item_name_idx = idx(&columns.item_name);
    let warehouse_name_idx = idx(&columns.warehouse_name);
    let counterparty_name_idx = idx(&columns.counterparty_name);
    let created_at_idx = idx(&columns.created_at);
    let due_idx = idx(&columns.due);
    let paid_idx = idx(&columns.paid);
    let debt_idx = idx(&columns.debt);
    let unit_cost_idx = idx(&columns.unit_cost);
    let unit_sell_price_idx = idx(&columns.unit_sell_price);
    let should_pay_date_idx = idx(&columns.should_pay_date);

    let mut lines = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| RollupError::InputParse(format!("row {}: {e}", row + 2)))?;

        let text = |i: Option<usize>| -> Option<String> {
            i.and_then(|i| record.get(i)).map(str::to_string)
        };
        let number = |i: Option<usize>| text(i).map(NumberLike::Text);
        let field = |i: Option<usize>| text(i).map(RawText::Text);

        lines.push(RawLine {
            transaction_id: text(Some(transaction_id_idx)).map(RawId::Text),
            item_id: text(Some(item_id_idx)).map(RawId::Text),
            item_kind: field(item_kind_idx),
            item_name: field(item_name_idx),
            warehouse_name: field(warehouse_name_idx),
            counterparty_name: field(counterparty_name_idx),
            created_at: field(created_at_idx),
            amount: number(Some(amount_idx)),
            due: number(due_idx),
            paid: number(paid_idx),
            debt: number(debt_idx),
            unit_cost: number(unit_cost_idx),
            unit_sell_price: number(unit_sell_price_idx),
            should_pay_date: field(should_pay_date_idx),
        });
    }

    Ok(lines)
}

/// Read and parse a file. The format is inferred from the extension when not given.
pub fn read_lines(
    path: &Path,
    format: Option<InputFormat>,
    columns: &ColumnMapping,
) -> Result<Vec<RawLine>, RollupError> {
    let format = format
        .or_else(|| InputFormat::from_path(path))
        .ok_or_else(|| {
            RollupError::InputParse(format!(
                "cannot infer input format of {} (expected .json or .csv)",
                path.display()
            ))
        })?;

    let data = std::fs::read_to_string(path)
        .map_err(|e| RollupError::Io(format!("cannot read {}: {e}", path.display())))?;

    match format {
        InputFormat::Json => load_json_lines(&data),
        InputFormat::Csv => load_csv_lines(&data, columns),
    }
}
