use std::fmt;

#[derive(Debug)]
pub enum RollupError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty name, duplicate column mapping, etc.).
    ConfigValidation(String),
    /// Input file is not a recognizable list of line records.
    InputParse(String),
    /// Missing required column in CSV input.
    MissingColumn { column: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for RollupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InputParse(msg) => write!(f, "input parse error: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for RollupError {}
