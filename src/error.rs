use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldRuleError {
    #[error("Value {value} for {id} is out of range: must be between {min} and {max}")]
    OutOfRange { id: String, value: i64, min: i32, max: i32 },
    #[error("Unsupported operation on {id}: {reason}")]
    Unsupported { id: String, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("The fractional value {fraction} of {id} cannot be converted as it is not in the range 0 (inclusive) to 1 (exclusive)")]
    MalformedFraction { id: String, fraction: String },
    #[error("Rule {id} is already registered")]
    DuplicateRule { id: String },
    #[error("Merge of {id} resulted in two different values: {existing} and {merged}")]
    MergeConflict { id: String, existing: i32, merged: i32 },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, FieldRuleError>;

// Helper conversions
impl From<config::ConfigError> for FieldRuleError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
