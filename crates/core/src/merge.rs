//! Tag-keyed record merging and deduplication.
//!
//! Field preference is evaluated independently per field, not as a
//! whole-record choice: a merged record may combine the primary's range with
//! the secondary's purpose. Keys are whitespace-normalized tags; output maps
//! are `BTreeMap` so iteration order is the sorted-by-tag order the writer
//! wants, with no nondeterministic tie-break.

use std::collections::BTreeMap;

use crate::model::InstrumentRecord;
use crate::tag::normalize_whitespace;

pub type RecordMap = BTreeMap<String, InstrumentRecord>;

/// Accumulate records keyed by normalized tag; first occurrence wins, later
/// duplicates are dropped. Empty-tag records are never materialized.
pub fn dedup_first_seen(records: impl IntoIterator<Item = InstrumentRecord>) -> RecordMap {
    let mut map = RecordMap::new();
    for record in records {
        let key = normalize_whitespace(&record.tag);
        if key.is_empty() {
            continue;
        }
        map.entry(key).or_insert(record);
    }
    map
}

/// Insert into an existing accumulator with the same first-seen policy.
/// Returns true when the record was kept.
pub fn insert_first_seen(map: &mut RecordMap, record: InstrumentRecord) -> bool {
    let key = normalize_whitespace(&record.tag);
    if key.is_empty() || map.contains_key(&key) {
        return false;
    }
    map.insert(key, record);
    true
}

fn pick<'a>(primary: &'a str, secondary: &'a str) -> &'a str {
    if primary.is_empty() { secondary } else { primary }
}

/// Merge two tag-keyed maps. For every tag in either source, each field takes
/// the primary's value when non-empty, else the secondary's.
pub fn merge(primary: &RecordMap, secondary: &RecordMap) -> RecordMap {
    let mut merged = RecordMap::new();

    for key in primary.keys().chain(secondary.keys()) {
        if merged.contains_key(key) {
            continue;
        }
        let p = primary.get(key);
        let s = secondary.get(key);
        let (p, s) = match (p, s) {
            (Some(p), Some(s)) => (p, s),
            (Some(p), None) => (p, p),
            (None, Some(s)) => (s, s),
            (None, None) => continue,
        };
        merged.insert(
            key.clone(),
            InstrumentRecord {
                tag: pick(&p.tag, &s.tag).to_string(),
                purpose: pick(&p.purpose, &s.purpose).to_string(),
                measure_range: pick(&p.measure_range, &s.measure_range).to_string(),
                unit: pick(&p.unit, &s.unit).to_string(),
                source_file: pick(&p.source_file, &s.source_file).to_string(),
            },
        );
    }

    merged
}

// ---------------------------------------------------------------------------
// Overlap statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Tags present in both sources.
    pub overlap: usize,
    /// Overlapping tags where both sides filled a field and disagreed.
    pub overlap_mismatches: usize,
}

pub fn overlap_stats(primary: &RecordMap, secondary: &RecordMap) -> MergeStats {
    let mut stats = MergeStats::default();
    for (key, p) in primary {
        let Some(s) = secondary.get(key) else { continue };
        stats.overlap += 1;

        let disagrees = |a: &str, b: &str| !a.is_empty() && !b.is_empty() && a != b;
        if disagrees(&p.purpose, &s.purpose)
            || disagrees(&p.measure_range, &s.measure_range)
            || disagrees(&p.unit, &s.unit)
        {
            stats.overlap_mismatches += 1;
        }
    }
    stats
}
