use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RollupError;
use crate::model::PaymentStatus;
use crate::numeric::DecimalStyle;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RollupConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default)]
    pub debt: DebtPolicy,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub numbers: NumberConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "rollup".into()
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            group_by: GroupBy::default(),
            debt: DebtPolicy::default(),
            sort: SortOrder::default(),
            numbers: NumberConfig::default(),
            filter: FilterConfig::default(),
            columns: ColumnMapping::default(),
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouping + rollup policy
// ---------------------------------------------------------------------------

/// What a row stands for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One row per sale/purchase.
    #[default]
    Transaction,
    /// One row per (kind, id) item, e.g. a product batch.
    Item,
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transaction => write!(f, "transaction"),
            Self::Item => write!(f, "item"),
        }
    }
}

/// Where a group's debt figure comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtPolicy {
    /// Source debt if any line carries one, otherwise derived.
    #[default]
    Auto,
    /// Always `max(due - paid, 0)`.
    Derive,
    /// Always the summed source debt (0 when absent).
    Source,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// First-occurrence order of the grouping key.
    #[default]
    Input,
    /// Earliest due date first; undated rows last.
    DueDate,
    /// Largest debt first.
    DebtDesc,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NumberConfig {
    #[serde(default)]
    pub decimal_style: DecimalStyle,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Keep only rows in these statuses.
    #[serde(default)]
    pub status: Option<Vec<PaymentStatus>>,
}

// ---------------------------------------------------------------------------
// Column mapping (CSV input)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub transaction_id: String,
    pub item_id: String,
    pub item_kind: String,
    pub item_name: String,
    pub warehouse_name: String,
    pub counterparty_name: String,
    pub created_at: String,
    pub amount: String,
    pub due: String,
    pub paid: String,
    pub debt: String,
    pub unit_cost: String,
    pub unit_sell_price: String,
    pub should_pay_date: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            transaction_id: "transactionId".into(),
            item_id: "itemId".into(),
            item_kind: "itemKind".into(),
            item_name: "itemName".into(),
            warehouse_name: "warehouseName".into(),
            counterparty_name: "counterpartyName".into(),
            created_at: "createdAt".into(),
            amount: "amount".into(),
            due: "due".into(),
            paid: "paid".into(),
            debt: "debt".into(),
            unit_cost: "unitCost".into(),
            unit_sell_price: "unitSellPrice".into(),
            should_pay_date: "shouldPayDate".into(),
        }
    }
}

impl ColumnMapping {
    /// (config key, header) pairs.
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("transaction_id", self.transaction_id.as_str()),
            ("item_id", self.item_id.as_str()),
            ("item_kind", self.item_kind.as_str()),
            ("item_name", self.item_name.as_str()),
            ("warehouse_name", self.warehouse_name.as_str()),
            ("counterparty_name", self.counterparty_name.as_str()),
            ("created_at", self.created_at.as_str()),
            ("amount", self.amount.as_str()),
            ("due", self.due.as_str()),
            ("paid", self.paid.as_str()),
            ("debt", self.debt.as_str()),
            ("unit_cost", self.unit_cost.as_str()),
            ("unit_sell_price", self.unit_sell_price.as_str()),
            ("should_pay_date", self.should_pay_date.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RollupConfig {
    pub fn from_toml(input: &str) -> Result<Self, RollupError> {
        let config: RollupConfig =
            toml::from_str(input).map_err(|e| RollupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RollupError> {
        if self.name.trim().is_empty() {
            return Err(RollupError::ConfigValidation("name must not be empty".into()));
        }

        if let Some(ref statuses) = self.filter.status {
            if statuses.is_empty() {
                return Err(RollupError::ConfigValidation(
                    "filter.status must list at least one status".into(),
                ));
            }
        }

        // Each CSV header may feed exactly one field
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (field, header) in self.columns.entries() {
            if header.trim().is_empty() {
                return Err(RollupError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
            if let Some(previous) = seen.insert(header, field) {
                return Err(RollupError::ConfigValidation(format!(
                    "columns.{previous} and columns.{field} both map to '{header}'"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
