use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Header profile validation error (no fields, empty synonym list, etc.).
    ConfigValidation(String),
    /// No row inside the scan window resolved every required field.
    HeaderNotFound { scanned_rows: usize, missing: Vec<String> },
    /// All sources yielded zero usable records.
    NoRecords,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "profile parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "profile validation error: {msg}"),
            Self::HeaderNotFound { scanned_rows, missing } => {
                write!(
                    f,
                    "no header row within the first {scanned_rows} row(s); unresolved field(s): {}",
                    missing.join(", ")
                )
            }
            Self::NoRecords => write!(f, "no usable records extracted from any source"),
        }
    }
}

impl std::error::Error for CoreError {}
