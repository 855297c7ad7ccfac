//! Text-layer PDF extraction via `pdftotext -layout`.
//!
//! Layout mode keeps the column alignment of tabular pages, so a run of two
//! or more spaces is a reliable cell separator. Pages come back separated by
//! form feeds. Scanned pages produce little or no text here; those go through
//! the raster + OCR path instead.

use std::path::Path;
use std::process::Command;

use regex::Regex;

use tagsheet_core::model::Cell;

use crate::error::IoError;

const PDFTOTEXT: &str = "pdftotext";

#[derive(Debug, Clone, Default)]
pub struct TextPage {
    pub rows: Vec<Vec<Cell>>,
}

/// Run `pdftotext -layout` over the whole document and split the output into
/// per-page cell rows.
pub fn extract_text_pages(path: &Path) -> Result<Vec<TextPage>, IoError> {
    which::which(PDFTOTEXT).map_err(|_| IoError::ToolMissing { tool: PDFTOTEXT })?;

    let output = Command::new(PDFTOTEXT)
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| IoError::ToolFailed { tool: PDFTOTEXT, detail: e.to_string() })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IoError::ToolFailed {
            tool: PDFTOTEXT,
            detail: stderr.trim().to_string(),
        });
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    Ok(split_pages(&text))
}

fn split_pages(text: &str) -> Vec<TextPage> {
    let separator = Regex::new(r"\s{2,}").expect("cell separator regex");
    text.split('\u{c}')
        .map(|page| TextPage { rows: page_rows(page, &separator) })
        .collect()
}

fn page_rows(page: &str, separator: &Regex) -> Vec<Vec<Cell>> {
    page.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let cells: Vec<Cell> = separator
                .split(line)
                .filter(|s| !s.is_empty())
                .map(Cell::text)
                .collect();
            if cells.is_empty() {
                None
            } else {
                Some(cells)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_columns_split_on_double_space() {
        let pages = split_pages("仪表位号   用途     测量范围   工程单位\nFT-101  进料流量   0-100   m3/h\n");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rows.len(), 2);
        assert_eq!(pages[0].rows[1][0], Cell::text("FT-101"));
        assert_eq!(pages[0].rows[1][2], Cell::text("0-100"));
    }

    #[test]
    fn form_feed_separates_pages() {
        let pages = split_pages("a  b\n\u{c}c  d\n");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].rows[0][1], Cell::text("d"));
    }

    #[test]
    fn single_spaces_stay_in_one_cell() {
        let pages = split_pages("low range  high range\n");
        assert_eq!(pages[0].rows[0].len(), 2);
        assert_eq!(pages[0].rows[0][0], Cell::text("low range"));
    }

    #[test]
    fn blank_page_has_no_rows() {
        let pages = split_pages("\n\n");
        assert!(pages[0].rows.is_empty());
    }
}
