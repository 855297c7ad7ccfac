//! `tagsheet extract` — pull DCS instrument records from a text-layer PDF,
//! fill gaps from a fallback spreadsheet, and write the merged 4-column
//! workbook.

use std::path::{Path, PathBuf};

use clap::Args;

use tagsheet_core::config::fields;
use tagsheet_core::header::find_header;
use tagsheet_core::merge::{insert_first_seen, merge, overlap_stats, RecordMap};
use tagsheet_core::model::{Cell, HeaderLocation, InstrumentRecord};
use tagsheet_core::tag::{collapse_whitespace, normalize_whitespace};
use tagsheet_core::HeaderProfile;
use tagsheet_io::pdf::extract_text_pages;
use tagsheet_io::xlsx::{read_grid, write_records, SheetChoice};

use crate::CliError;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Source PDF; a fuzzy-matched or guessed sibling is used when the exact
    /// path does not exist
    #[arg(long)]
    pub pdf: PathBuf,

    /// Spreadsheet filling fields the PDF leaves empty
    #[arg(long)]
    pub xlsx_fallback: Option<PathBuf>,

    /// Output workbook path
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub pdf_used: PathBuf,
    pub xlsx_used: Option<PathBuf>,
    pub pdf_rows: usize,
    pub xlsx_rows: usize,
    pub union_rows: usize,
    pub overlap_rows: usize,
    pub overlap_mismatches: usize,
    pub rows_missing_any_field: usize,
}

pub fn run(args: &ExtractArgs) -> Result<ExtractSummary, CliError> {
    let pdf_path = resolve_pdf(&args.pdf)
        .or_else(|| args.pdf.parent().and_then(guess_pdf))
        .ok_or_else(|| {
            CliError::failure(format!("PDF not found: {}", args.pdf.display()))
        })?;

    let pdf_map = pdf_records(&pdf_path)?;

    let mut xlsx_used = None;
    let mut xlsx_map = RecordMap::new();
    if let Some(fallback) = &args.xlsx_fallback {
        if fallback.exists() {
            xlsx_map = xlsx_records(fallback)?;
            xlsx_used = Some(fallback.clone());
        }
    }

    if pdf_map.is_empty() && xlsx_map.is_empty() {
        return Err(CliError::from(tagsheet_core::CoreError::NoRecords)
            .with_hint("the PDF may be a scan without a text layer; try the batch pipeline"));
    }

    // spreadsheet fields take precedence per field
    let merged = merge(&xlsx_map, &pdf_map);
    let records: Vec<InstrumentRecord> = merged.values().cloned().collect();
    write_records(&args.out, &records)?;

    let stats = overlap_stats(&xlsx_map, &pdf_map);
    let summary = ExtractSummary {
        pdf_used: pdf_path,
        xlsx_used,
        pdf_rows: pdf_map.len(),
        xlsx_rows: xlsx_map.len(),
        union_rows: records.len(),
        overlap_rows: stats.overlap,
        overlap_mismatches: stats.overlap_mismatches,
        rows_missing_any_field: records.iter().filter(|r| r.missing_any_field()).count(),
    };

    println!("pdf_used={}", summary.pdf_used.display());
    if let Some(xlsx) = &summary.xlsx_used {
        println!("xlsx_used={}", xlsx.display());
    }
    println!("pdf_rows={}", summary.pdf_rows);
    println!("xlsx_rows={}", summary.xlsx_rows);
    println!("union_rows={}", summary.union_rows);
    println!("overlap_rows={}", summary.overlap_rows);
    println!("overlap_with_any_nonempty_field_mismatch={}", summary.overlap_mismatches);
    println!("rows_with_missing_any_field_after_merge={}", summary.rows_missing_any_field);
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Source resolution
// ---------------------------------------------------------------------------

fn pdfs_in(folder: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(folder) else {
        return Vec::new();
    };
    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    pdfs.sort();
    pdfs
}

/// Exact path, else a sibling PDF whose whitespace-stripped name matches.
fn resolve_pdf(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return None;
    }
    let wanted = normalize_whitespace(path.file_name()?.to_str()?);
    pdfs_in(path.parent()?).into_iter().find(|candidate| {
        candidate
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| normalize_whitespace(n) == wanted)
            .unwrap_or(false)
    })
}

/// Fall back to a plausible PDF in the folder: a DCS monitoring-sheet name
/// when one exists, else the first alphabetically.
fn guess_pdf(folder: &Path) -> Option<PathBuf> {
    let pdfs = pdfs_in(folder);
    pdfs.iter()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.contains("控制系统监控数据表") && n.contains("DCS"))
                .unwrap_or(false)
        })
        .cloned()
        .or_else(|| pdfs.first().cloned())
}

// ---------------------------------------------------------------------------
// Record extraction
// ---------------------------------------------------------------------------

fn dcs_record(row: &[Cell], location: &HeaderLocation, source: &str) -> Option<InstrumentRecord> {
    let field = |name: &str| -> String {
        location
            .col(name)
            .and_then(|col| row.get(col - 1))
            .map(|cell| collapse_whitespace(&cell.display()))
            .unwrap_or_default()
    };
    let tag = field(fields::TAG);
    if tag.is_empty() {
        return None;
    }
    Some(InstrumentRecord {
        tag,
        purpose: field(fields::PURPOSE),
        measure_range: field(fields::RANGE),
        unit: field(fields::UNIT),
        source_file: source.to_string(),
    })
}

/// Extract records from a text-layer PDF. The header location found on one
/// page carries over to later pages that only repeat data rows.
fn pdf_records(pdf: &Path) -> Result<RecordMap, CliError> {
    let pages = extract_text_pages(pdf)?;
    let profile = HeaderProfile::dcs_fields();
    let source = pdf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let mut map = RecordMap::new();
    let mut location: Option<HeaderLocation> = None;
    for page in &pages {
        let start = match find_header(&page.rows, &profile) {
            Ok(found) => {
                let row = found.header_row;
                location = Some(found);
                row
            }
            Err(_) if location.is_some() => 0,
            Err(_) => continue,
        };
        let Some(loc) = location.as_ref() else { continue };
        for row in page.rows.iter().skip(start) {
            if let Some(record) = dcs_record(row, loc, &source) {
                insert_first_seen(&mut map, record);
            }
        }
    }
    Ok(map)
}

fn xlsx_records(path: &Path) -> Result<RecordMap, CliError> {
    let grid = read_grid(path, SheetChoice::First)?;
    let location = find_header(&grid.rows, &HeaderProfile::dcs_fields())?;

    let mut map = RecordMap::new();
    for row in grid.rows.iter().skip(location.header_row) {
        if let Some(record) = dcs_record(row, &location, "") {
            insert_first_seen(&mut map, record);
        }
    }
    Ok(map)
}
