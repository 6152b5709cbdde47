//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | rollup           | Config, input and debt-gate codes        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use stockbook_rollup::RollupError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Rollup (60-69)
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_ROLLUP_INVALID_CONFIG: u8 = 60;

/// Input file missing, unreadable, or not a list of line records.
pub const EXIT_ROLLUP_INPUT: u8 = 61;

/// Output could not be serialized or written.
pub const EXIT_ROLLUP_RUNTIME: u8 = 62;

/// Rows with outstanding debt remain (and --fail-on-debt is set).
pub const EXIT_ROLLUP_UNPAID: u8 = 63;

/// Map a library error to its exit code.
pub fn rollup_exit_code(err: &RollupError) -> u8 {
    match err {
        RollupError::ConfigParse(_) | RollupError::ConfigValidation(_) => {
            EXIT_ROLLUP_INVALID_CONFIG
        }
        RollupError::InputParse(_) | RollupError::MissingColumn { .. } | RollupError::Io(_) => {
            EXIT_ROLLUP_INPUT
        }
    }
}
