//! `stockbook-rollup`: line-item grouping and financial rollup engine.
//!
//! Receives already-fetched sale/purchase line records, returns one
//! display-ready row per transaction (or per item) plus KPI totals.
//! The engine does no network or file I/O; `load` reads local files.

pub mod config;
pub mod due_date;
pub mod engine;
pub mod error;
pub mod group;
pub mod load;
pub mod model;
pub mod numeric;
pub mod projection;
pub mod rollup;
pub mod status;
pub mod summary;

pub use config::RollupConfig;
pub use engine::run;
pub use error::RollupError;
pub use model::{LineRecord, RawLine, RollupReport, Row};
