//! Table geometry for scanned pages.
//!
//! OCR gives a flat list of positioned words; this module recovers table
//! structure from it. Words are banded into rows by vertical midpoint, the
//! header band is the one whose joined text contains every expected column
//! label, and column extents are anchored at the x position of each label.
//! Cell text is then the spatial join of each row band with each column band.

use crate::ocr::{words_in_rect, OcrWord, Rect};

/// Fallback row pitch when a page has too few words to estimate one.
const DEFAULT_ROW_GAP: f64 = 12.0;

/// Structure recovered from one page of OCR words.
#[derive(Debug, Clone, Default)]
pub struct PageTable {
    /// Whether every expected column label was located on this page.
    pub header_found: bool,
    /// Number of row bands on the page, header included.
    pub band_count: usize,
    /// Data rows below the header, one string per expected column.
    pub rows: Vec<Vec<String>>,
}

/// Band a page's words into visual rows.
///
/// Words are sorted by vertical midpoint; a new band starts whenever the gap
/// to the previous word exceeds 0.6 of the median word height.
pub fn band_rows(words: &[OcrWord]) -> Vec<Vec<&OcrWord>> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut heights: Vec<f64> = words.iter().map(|w| w.h).collect();
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = heights[heights.len() / 2];
    let gap = if median > 0.0 { median * 0.6 } else { DEFAULT_ROW_GAP };

    let mut sorted: Vec<&OcrWord> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.mid_y()
            .partial_cmp(&b.mid_y())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut bands: Vec<Vec<&OcrWord>> = Vec::new();
    let mut last_mid = f64::NEG_INFINITY;
    for word in sorted {
        if word.mid_y() - last_mid > gap {
            bands.push(Vec::new());
        }
        last_mid = word.mid_y();
        if let Some(band) = bands.last_mut() {
            band.push(word);
        }
    }
    for band in &mut bands {
        band.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }
    bands
}

/// Joined band text with a per-character owner index back into the band.
fn join_with_owners(band: &[&OcrWord]) -> (String, Vec<usize>) {
    let mut text = String::new();
    let mut owners = Vec::new();
    for (i, word) in band.iter().enumerate() {
        for c in word.text.chars().filter(|c| !c.is_whitespace()) {
            text.push(c);
            owners.push(i);
        }
    }
    (text, owners)
}

/// Locate each label inside a band and return its anchoring word's left edge.
/// Labels may span several OCR words; the anchor is the word holding the
/// label's first character.
fn label_anchors(band: &[&OcrWord], labels: &[&str]) -> Option<Vec<f64>> {
    let (text, owners) = join_with_owners(band);
    let chars: Vec<char> = text.chars().collect();

    let mut anchors = Vec::with_capacity(labels.len());
    for label in labels {
        let needle: Vec<char> = label.chars().filter(|c| !c.is_whitespace()).collect();
        let start = chars
            .windows(needle.len().max(1))
            .position(|window| window == needle.as_slice())?;
        anchors.push(band[owners[start]].x);
    }
    Some(anchors)
}

/// Recover the table on one page.
///
/// `labels` are the expected column headers in output order; the physical
/// left-to-right order on the page may differ and is handled by sorting the
/// anchors when computing column extents.
pub fn extract_page_table(words: &[OcrWord], labels: &[&str]) -> PageTable {
    let bands = band_rows(words);
    let band_count = bands.len();

    let header = bands
        .iter()
        .enumerate()
        .find_map(|(i, band)| label_anchors(band, labels).map(|anchors| (i, anchors)));

    let Some((header_idx, anchors)) = header else {
        return PageTable { header_found: false, band_count, rows: Vec::new() };
    };

    // right edge of each column = next anchor to the right, last one open
    let mut sorted_x: Vec<f64> = anchors.clone();
    sorted_x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let right_of = |x0: f64| {
        sorted_x
            .iter()
            .copied()
            .find(|x| *x > x0)
            .unwrap_or(f64::INFINITY)
    };

    let mut rows = Vec::new();
    for band in bands.iter().skip(header_idx + 1) {
        let top = band
            .iter()
            .map(|w| w.y)
            .fold(f64::INFINITY, f64::min);
        let bottom = band
            .iter()
            .map(|w| w.y + w.h)
            .fold(f64::NEG_INFINITY, f64::max);

        let band_words: Vec<OcrWord> = band.iter().map(|w| (*w).clone()).collect();
        let cells: Vec<String> = anchors
            .iter()
            .map(|&x0| {
                words_in_rect(
                    &band_words,
                    Rect { x0: x0 - 2.0, top, x1: right_of(x0) - 2.0, bottom: bottom + 1.0 },
                )
            })
            .collect();
        if cells.iter().any(|c| !c.is_empty()) {
            rows.push(cells);
        }
    }

    PageTable { header_found: true, band_count, rows }
}
