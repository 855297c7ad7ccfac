//! `tagsheet-cli` — pipeline plumbing behind the `tagsheet` binary.
//!
//! The three subcommand pipelines live here as library functions so the
//! integration tests can drive them without spawning the binary. `main.rs`
//! only parses arguments, dispatches, and maps [`CliError`] to an exit code.

pub mod batch;
pub mod compare;
pub mod exit_codes;
pub mod extract;

use exit_codes::EXIT_FAILURE;

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn failure(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FAILURE, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<tagsheet_core::CoreError> for CliError {
    fn from(err: tagsheet_core::CoreError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<tagsheet_io::IoError> for CliError {
    fn from(err: tagsheet_io::IoError) -> Self {
        let hint = match &err {
            tagsheet_io::IoError::ToolMissing { tool } => match *tool {
                "pdftotext" | "pdftoppm" => Some("install poppler-utils".to_string()),
                "tesseract" => Some("install tesseract with the chi_sim language pack".to_string()),
                _ => None,
            },
            _ => None,
        };
        Self { code: EXIT_FAILURE, message: err.to_string(), hint }
    }
}
