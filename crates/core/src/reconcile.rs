//! Cell-level reconciliation of range bounds between a baseline and a
//! comparison document.

use std::collections::HashMap;

use crate::model::{Cell, RangePair};
use crate::value::values_equal;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One physical baseline row. Baseline rows are processed in document order
/// and are not deduplicated; only the compare-side map is.
#[derive(Debug, Clone)]
pub struct BaseRow {
    /// 1-based sheet row.
    pub row: usize,
    /// Canonical tag.
    pub tag: String,
    pub pair: RangePair,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Both bounds agree; any previously displayed comparison values are
    /// cleared.
    FullMatch,
    Mismatch { low_equal: bool, high_equal: bool },
}

#[derive(Debug, Clone)]
pub struct RowResult {
    pub row: usize,
    pub tag: String,
    pub outcome: RowOutcome,
    /// `下限=…, 上限=…` for the baseline side; empty on full match.
    pub base_display: String,
    /// Same, for the comparison side.
    pub compare_display: String,
}

#[derive(Debug, Default)]
pub struct ReconcileOutput {
    pub rows: Vec<RowResult>,
    /// Baseline rows whose tag was found on the compare side.
    pub matched: usize,
    pub mismatches: usize,
}

/// Human-readable side-by-side form of a range pair.
pub fn format_pair(pair: &RangePair) -> String {
    format!(
        "下限={}, 上限={}",
        pair.low.display().trim(),
        pair.high.display().trim()
    )
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Compare each baseline row against the compare-side map. Rows whose tag is
/// absent from the map are skipped entirely — absence is not a mismatch.
pub fn reconcile(base: &[BaseRow], compare: &HashMap<String, RangePair>) -> ReconcileOutput {
    let mut out = ReconcileOutput::default();

    for base_row in base {
        let Some(cmp_pair) = compare.get(&base_row.tag) else {
            continue;
        };

        let low_equal = values_equal(&base_row.pair.low, &cmp_pair.low);
        let high_equal = values_equal(&base_row.pair.high, &cmp_pair.high);
        out.matched += 1;

        if low_equal && high_equal {
            out.rows.push(RowResult {
                row: base_row.row,
                tag: base_row.tag.clone(),
                outcome: RowOutcome::FullMatch,
                base_display: String::new(),
                compare_display: String::new(),
            });
            continue;
        }

        out.mismatches += 1;
        out.rows.push(RowResult {
            row: base_row.row,
            tag: base_row.tag.clone(),
            outcome: RowOutcome::Mismatch { low_equal, high_equal },
            base_display: format_pair(&base_row.pair),
            compare_display: format_pair(cmp_pair),
        });
    }

    out
}

/// Build the compare-side lookup map. First occurrence of a tag wins.
pub fn build_compare_map(pairs: impl IntoIterator<Item = (String, RangePair)>) -> HashMap<String, RangePair> {
    let mut map = HashMap::new();
    for (tag, pair) in pairs {
        if tag.is_empty() {
            continue;
        }
        map.entry(tag).or_insert(pair);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(low: &str, high: &str) -> RangePair {
        RangePair { low: Cell::text(low), high: Cell::text(high) }
    }

    fn base_row(row: usize, tag: &str, low: &str, high: &str) -> BaseRow {
        BaseRow { row, tag: tag.into(), pair: pair(low, high) }
    }

    #[test]
    fn full_match_clears_displays() {
        let base = vec![base_row(2, "101PT-01", "0", "100")];
        let compare = build_compare_map([("101PT-01".to_string(), pair("0", "100"))]);

        let out = reconcile(&base, &compare);
        assert_eq!(out.matched, 1);
        assert_eq!(out.mismatches, 0);
        assert_eq!(out.rows[0].outcome, RowOutcome::FullMatch);
        assert_eq!(out.rows[0].base_display, "");
        assert_eq!(out.rows[0].compare_display, "");
    }

    #[test]
    fn high_mismatch_keeps_side_by_side_display() {
        let base = vec![base_row(2, "101PT-01", "0", "100")];
        let compare = build_compare_map([("101PT-01".to_string(), pair("0", "150"))]);

        let out = reconcile(&base, &compare);
        assert_eq!(out.matched, 1);
        assert_eq!(out.mismatches, 1);
        assert_eq!(
            out.rows[0].outcome,
            RowOutcome::Mismatch { low_equal: true, high_equal: false }
        );
        assert_eq!(out.rows[0].base_display, "下限=0, 上限=100");
        assert_eq!(out.rows[0].compare_display, "下限=0, 上限=150");
    }

    #[test]
    fn absent_tags_are_skipped_not_mismatched() {
        let base = vec![base_row(2, "ONLY-IN-BASE", "0", "1")];
        let compare = build_compare_map([("OTHER".to_string(), pair("0", "1"))]);

        let out = reconcile(&base, &compare);
        assert_eq!(out.matched, 0);
        assert_eq!(out.mismatches, 0);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn duplicate_baseline_rows_each_processed() {
        let base = vec![
            base_row(2, "101PT-01", "0", "100"),
            base_row(7, "101PT-01", "0", "90"),
        ];
        let compare = build_compare_map([("101PT-01".to_string(), pair("0", "100"))]);

        let out = reconcile(&base, &compare);
        assert_eq!(out.matched, 2);
        assert_eq!(out.mismatches, 1);
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn compare_map_dedups_first_seen() {
        let map = build_compare_map([
            ("T-1".to_string(), pair("0", "100")),
            ("T-1".to_string(), pair("0", "999")),
        ]);
        assert_eq!(map["T-1"].high, Cell::text("100"));
    }

    #[test]
    fn numeric_equality_crosses_representations() {
        let base = vec![BaseRow {
            row: 2,
            tag: "T-1".into(),
            pair: RangePair { low: Cell::Number(0.0), high: Cell::Number(100.0) },
        }];
        let compare = build_compare_map([("T-1".to_string(), pair("0.00", "1,00"))]);
        // "1,00" → 100 after separator stripping
        let out = reconcile(&base, &compare);
        assert_eq!(out.rows[0].outcome, RowOutcome::FullMatch);
    }
}
