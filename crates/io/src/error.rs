use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// Cannot open or read a source document.
    Open { path: String, reason: String },
    /// A requested sheet does not exist in the workbook.
    SheetNotFound { path: String, sheet: String },
    /// A required external tool is not on PATH.
    ToolMissing { tool: &'static str },
    /// An external tool ran but failed.
    ToolFailed { tool: &'static str, detail: String },
    /// Cannot write the output document.
    Write { path: String, reason: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, reason } => write!(f, "cannot open {path}: {reason}"),
            Self::SheetNotFound { path, sheet } => {
                write!(f, "sheet '{sheet}' not found in {path}")
            }
            Self::ToolMissing { tool } => {
                write!(f, "'{tool}' not found on PATH (install poppler-utils / tesseract)")
            }
            Self::ToolFailed { tool, detail } => write!(f, "{tool} failed: {detail}"),
            Self::Write { path, reason } => write!(f, "cannot write {path}: {reason}"),
        }
    }
}

impl std::error::Error for IoError {}
