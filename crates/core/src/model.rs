use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// An owned cell value, decoupled from any spreadsheet backend.
///
/// The io layer converts backend cell types into this; the engine never sees
/// backend types.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// True for `Empty` and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text content of the cell as displayed. Integral floats render without
    /// a trailing `.0` so `10.0` and `"10"` display identically.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One physical instrument's metadata row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentRecord {
    pub tag: String,
    pub purpose: String,
    pub measure_range: String,
    pub unit: String,
    /// Provenance; empty for spreadsheet-only pipelines.
    pub source_file: String,
}

impl InstrumentRecord {
    /// True when any of purpose / measure_range / unit is still empty.
    pub fn missing_any_field(&self) -> bool {
        self.purpose.is_empty() || self.measure_range.is_empty() || self.unit.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Header location
// ---------------------------------------------------------------------------

/// A discovered table header. Row and column indices are 1-based, matching
/// how spreadsheet users and the scan-window configs count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    pub header_row: usize,
    pub columns: BTreeMap<String, usize>,
}

impl HeaderLocation {
    /// Column index (1-based) for a logical field.
    pub fn col(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }
}

// ---------------------------------------------------------------------------
// Range pairs
// ---------------------------------------------------------------------------

/// The (lower-bound, upper-bound) values of an instrument's measurement span.
/// Untyped until compared.
#[derive(Debug, Clone, PartialEq)]
pub struct RangePair {
    pub low: Cell,
    pub high: Cell,
}
