//! Header-row discovery inside a bounded scan window.
//!
//! Source tables bury their header under an arbitrary number of title and
//! decoration rows. The locator scans a bounded window, normalizes each cell
//! per the profile, and requires every field to resolve on a single row —
//! there is no partial header.

use std::collections::BTreeMap;

use crate::config::{HeaderNorm, HeaderProfile, MatchMode};
use crate::error::CoreError;
use crate::model::{Cell, HeaderLocation};

/// Leading columns checked by the blank-row heuristic.
const BLANK_PROBE_COLS: usize = 8;

fn normalize_header(cell: &Cell, mode: HeaderNorm) -> String {
    let s: String = cell.display().chars().filter(|c| !c.is_whitespace()).collect();
    match mode {
        HeaderNorm::LowerStripped => s.to_lowercase(),
        HeaderNorm::Stripped => s,
    }
}

fn normalize_synonym(synonym: &str, mode: HeaderNorm) -> String {
    let s: String = synonym.chars().filter(|c| !c.is_whitespace()).collect();
    match mode {
        HeaderNorm::LowerStripped => s.to_lowercase(),
        HeaderNorm::Stripped => s,
    }
}

/// Locate the header row for `profile` within `rows`.
///
/// Row/column indices in the result are 1-based. Rows that are entirely blank
/// within the first [`BLANK_PROBE_COLS`] scanned columns are skipped without
/// disqualifying the scan. First match wins per field, left to right.
pub fn find_header(rows: &[Vec<Cell>], profile: &HeaderProfile) -> Result<HeaderLocation, CoreError> {
    let row_limit = rows.len().min(profile.row_window);

    let synonyms: Vec<Vec<String>> = profile
        .fields
        .iter()
        .map(|f| {
            f.synonyms
                .iter()
                .map(|s| normalize_synonym(s, profile.normalization))
                .filter(|s| !s.is_empty())
                .collect()
        })
        .collect();

    let mut best_missing: Vec<String> = profile.fields.iter().map(|f| f.name.clone()).collect();

    for (r, row) in rows.iter().enumerate().take(row_limit) {
        let headers: Vec<String> = row
            .iter()
            .take(profile.col_window)
            .map(|c| normalize_header(c, profile.normalization))
            .collect();

        if headers.iter().take(BLANK_PROBE_COLS).all(|h| h.is_empty()) {
            continue;
        }

        let mut columns: BTreeMap<String, usize> = BTreeMap::new();
        let mut missing: Vec<String> = Vec::new();
        for (field, keys) in profile.fields.iter().zip(&synonyms) {
            let hit = headers.iter().position(|h| {
                !h.is_empty()
                    && keys.iter().any(|k| match field.match_mode {
                        MatchMode::Contains => h.contains(k.as_str()),
                        MatchMode::Exact => h == k,
                    })
            });
            match hit {
                Some(idx) => {
                    columns.insert(field.name.clone(), idx + 1);
                }
                None => missing.push(field.name.clone()),
            }
        }

        if missing.is_empty() {
            return Ok(HeaderLocation { header_row: r + 1, columns });
        }
        if missing.len() < best_missing.len() {
            best_missing = missing;
        }
    }

    Err(CoreError::HeaderNotFound { scanned_rows: row_limit, missing: best_missing })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::text(*s)).collect()
    }

    fn grid_with_header_at(row: usize) -> Vec<Vec<Cell>> {
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for _ in 1..row {
            rows.push(text_row(&["", "", "", "", "", "", "", ""]));
        }
        rows.push(text_row(&["序号", "位号 Tag", "量程下限 LRV", "量程上限 URV"]));
        rows.push(text_row(&["1", "101PT-01", "0", "100"]));
        rows
    }

    #[test]
    fn header_found_at_row_5() {
        let rows = grid_with_header_at(5);
        let loc = find_header(&rows, &HeaderProfile::range_check()).unwrap();
        assert_eq!(loc.header_row, 5);
        assert_eq!(loc.col("tag"), Some(2));
        assert_eq!(loc.col("low"), Some(3));
        assert_eq!(loc.col("high"), Some(4));
    }

    #[test]
    fn substring_matching_tolerates_decorated_headers() {
        let rows = vec![text_row(&["Instrument 位号", "  量 程 下 限 ", "Range  High"])];
        let loc = find_header(&rows, &HeaderProfile::range_check()).unwrap();
        assert_eq!(loc.header_row, 1);
        assert_eq!(loc.col("high"), Some(3));
    }

    #[test]
    fn blank_rows_are_skipped_not_fatal() {
        let mut rows = vec![text_row(&["", "", "", "", "", "", "", ""]); 3];
        rows.push(text_row(&["tag", "lrv", "urv"]));
        let loc = find_header(&rows, &HeaderProfile::range_check()).unwrap();
        assert_eq!(loc.header_row, 4);
    }

    #[test]
    fn partial_header_row_does_not_qualify() {
        // has tag and low, never high
        let rows = vec![text_row(&["tag", "lrv", "something"]); 3];
        let err = find_header(&rows, &HeaderProfile::range_check()).unwrap_err();
        match err {
            CoreError::HeaderNotFound { missing, .. } => assert_eq!(missing, vec!["high"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn window_is_respected() {
        let mut profile = HeaderProfile::range_check();
        profile.row_window = 3;
        let rows = grid_with_header_at(5);
        assert!(find_header(&rows, &profile).is_err());
    }

    #[test]
    fn exact_mode_rejects_substrings() {
        let rows = vec![text_row(&["仪表位号编号", "用途", "测量范围", "工程单位"])];
        assert!(find_header(&rows, &HeaderProfile::dcs_fields()).is_err());

        let rows = vec![text_row(&["仪表位号", "用途", "测量范围", "工程单位"])];
        let loc = find_header(&rows, &HeaderProfile::dcs_fields()).unwrap();
        assert_eq!(loc.col("measure_range"), Some(3));
    }

    #[test]
    fn first_match_wins_per_field() {
        let rows = vec![text_row(&["位号", "下限", "下限(旧)", "上限"])];
        let loc = find_header(&rows, &HeaderProfile::range_check()).unwrap();
        assert_eq!(loc.col("low"), Some(2));
    }

    #[test]
    fn numeric_cells_participate_in_normalization() {
        // a numeric cell can never match a text synonym, but must not panic
        let rows = vec![vec![Cell::Number(1.0), Cell::text("位号"), Cell::text("下限"), Cell::text("上限")]];
        let loc = find_header(&rows, &HeaderProfile::range_check()).unwrap();
        assert_eq!(loc.col("tag"), Some(2));
    }
}
