use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GroupBy;
use crate::due_date::DueDate;
use crate::numeric::{normalize, normalize_present, DecimalStyle, NumberLike};

// ---------------------------------------------------------------------------
// Input (boundary)
// ---------------------------------------------------------------------------

/// Identifier as the API sends it: a string or a bare number.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
    /// Booleans, objects, arrays. Never a usable key.
    Other(serde_json::Value),
}

impl RawId {
    /// Trimmed textual form, `None` when blank or not a string/number.
    pub fn to_key(&self) -> Option<String> {
        let key = match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
            Self::Other(_) => return None,
        };
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Free-text field as the API sends it. Non-strings are kept but read as absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    Other(serde_json::Value),
}

impl RawText {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for RawText {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawText {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One line as received from the data-fetch layer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLine {
    pub transaction_id: Option<RawId>,
    pub item_id: Option<RawId>,
    #[serde(alias = "kind")]
    pub item_kind: Option<RawText>,
    pub item_name: Option<RawText>,
    pub warehouse_name: Option<RawText>,
    pub counterparty_name: Option<RawText>,
    pub created_at: Option<RawText>,
    #[serde(alias = "quantity")]
    pub amount: Option<NumberLike>,
    pub due: Option<NumberLike>,
    pub paid: Option<NumberLike>,
    pub debt: Option<NumberLike>,
    pub unit_cost: Option<NumberLike>,
    pub unit_sell_price: Option<NumberLike>,
    pub should_pay_date: Option<RawText>,
}

/// Kind of referenced stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Raw,
}

impl ItemKind {
    /// Accepts the spellings the API uses. Blank means product.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).unwrap_or("");
        match value.to_ascii_lowercase().as_str() {
            "" | "product" | "products" => Some(Self::Product),
            "raw" | "raw_material" | "rawmaterial" | "material" => Some(Self::Raw),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Reference to a product or a raw material. Doubles as the item merge key,
/// so a product and a raw material sharing an id stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    Product(String),
    Raw(String),
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        match kind {
            ItemKind::Product => Self::Product(id.into()),
            ItemKind::Raw => Self::Raw(id.into()),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::Raw(_) => ItemKind::Raw,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Product(id) | Self::Raw(id) => id,
        }
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Why a raw line never reached the grouping engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingTransactionId,
    UnknownItemKind(String),
}

/// A validated, normalized line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub transaction_id: String,
    pub item: ItemRef,
    pub item_name: Option<String>,
    pub warehouse_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub created_at: Option<String>,
    pub amount: f64,
    pub due: Option<f64>,
    pub paid: Option<f64>,
    pub debt: Option<f64>,
    pub unit_cost: Option<f64>,
    pub unit_sell_price: Option<f64>,
    pub should_pay_date: Option<String>,
}

impl LineRecord {
    /// Bare line with only the grouping fields set.
    pub fn new(transaction_id: impl Into<String>, item: ItemRef, amount: f64) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            item,
            item_name: None,
            warehouse_name: None,
            counterparty_name: None,
            created_at: None,
            amount,
            due: None,
            paid: None,
            debt: None,
            unit_cost: None,
            unit_sell_price: None,
            should_pay_date: None,
        }
    }

    /// Validate and normalize a raw line. A missing item id becomes an empty id.
    pub fn from_raw(raw: &RawLine, style: DecimalStyle) -> Result<Self, SkipReason> {
        let transaction_id = raw
            .transaction_id
            .as_ref()
            .and_then(RawId::to_key)
            .ok_or(SkipReason::MissingTransactionId)?;

        let kind_text = match &raw.item_kind {
            Some(RawText::Other(value)) => {
                return Err(SkipReason::UnknownItemKind(value.to_string()))
            }
            Some(RawText::Text(text)) => Some(text.as_str()),
            None => None,
        };
        let kind = ItemKind::parse(kind_text).ok_or_else(|| {
            SkipReason::UnknownItemKind(kind_text.unwrap_or_default().to_string())
        })?;
        let item_id = raw.item_id.as_ref().and_then(RawId::to_key).unwrap_or_default();

        Ok(Self {
            transaction_id,
            item: ItemRef::new(kind, item_id),
            item_name: non_blank(&raw.item_name),
            warehouse_name: non_blank(&raw.warehouse_name),
            counterparty_name: non_blank(&raw.counterparty_name),
            created_at: non_blank(&raw.created_at),
            amount: normalize(raw.amount.as_ref(), style),
            due: normalize_present(raw.due.as_ref(), style),
            paid: normalize_present(raw.paid.as_ref(), style),
            debt: normalize_present(raw.debt.as_ref(), style),
            unit_cost: normalize_present(raw.unit_cost.as_ref(), style),
            unit_sell_price: normalize_present(raw.unit_sell_price.as_ref(), style),
            should_pay_date: non_blank(&raw.should_pay_date),
        })
    }
}

fn non_blank(value: &Option<RawText>) -> Option<String> {
    value
        .as_ref()
        .and_then(RawText::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// One (cost, amount) contribution to an item's weighted average cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBatch {
    pub cost: f64,
    pub amount: f64,
}

/// All lines of one group that reference the same item.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedItem {
    pub item: ItemRef,
    pub name: Option<String>,
    pub warehouse_name: Option<String>,
    pub amount: f64,
    pub cost_batches: Vec<CostBatch>,
}

/// Running totals for one transaction (or one item, see [`GroupBy::Item`]).
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionGroup {
    pub key: String,
    pub items: Vec<MergedItem>,
    pub line_count: usize,
    pub total_amount: f64,
    pub total_due: f64,
    pub total_paid: f64,
    /// Σ debt over lines that carried one; `None` if no line did.
    pub source_debt: Option<f64>,
    /// Σ unit_cost × amount over lines with a cost; `None` if no line had one.
    pub total_cost: Option<f64>,
    /// Σ unit_sell_price × amount over lines with a price.
    pub total_sell_amount: Option<f64>,
    pub due_date_candidates: Vec<String>,
    pub counterparty_name: Option<String>,
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::Partial => write!(f, "partial"),
            Self::Unpaid => write!(f, "unpaid"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowItem {
    pub kind: ItemKind,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_name: Option<String>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_unit_cost: Option<f64>,
}

/// Display-ready record for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub key: String,
    pub items: Vec<RowItem>,
    pub line_count: usize,
    pub total_amount: f64,
    pub total_due: f64,
    pub total_paid: f64,
    pub total_debt: f64,
    pub should_pay_date: Option<DueDate>,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sell_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RollupSummary {
    pub group_count: usize,
    pub total_amount: f64,
    pub total_due: f64,
    pub total_paid: f64,
    pub total_debt: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_profit: Option<f64>,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub missing_transaction_id: usize,
    pub unknown_item_kind: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_transaction_id + self.unknown_item_kind
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RollupMeta {
    pub config_name: String,
    pub group_by: GroupBy,
    pub engine_version: String,
    pub run_at: String,
    pub input_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollupReport {
    pub meta: RollupMeta,
    pub summary: RollupSummary,
    pub rows: Vec<Row>,
    pub skipped: SkipCounts,
}
