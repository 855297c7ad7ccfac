//! `tagsheet batch` — OCR every scanned PDF in a folder and write one
//! consolidated record workbook.
//!
//! Per-file failures are tolerated: a PDF that cannot be rasterized or
//! recognized is skipped and the rest of the folder still processes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use regex::Regex;

use tagsheet_core::merge::{insert_first_seen, RecordMap};
use tagsheet_core::model::InstrumentRecord;
use tagsheet_core::tag::normalize_whitespace;
use tagsheet_io::ocr::{render_pages, OcrEngine, TesseractCli};
use tagsheet_io::table::extract_page_table;
use tagsheet_io::xlsx::{write_records, RECORD_HEADERS};

use crate::CliError;

/// Plausible instrument tag after cleanup; anything else is OCR noise.
const TAG_SHAPE: &str = r"^[0-9A-Z]{2,}[-0-9A-Z]{3,}$";

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder scanned for *.pdf files
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Output workbook path
    #[arg(long)]
    pub out: PathBuf,

    /// Rasterization resolution in DPI
    #[arg(long, default_value_t = 180)]
    pub resolution: u32,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub pages_total: usize,
    pub pages_with_table: usize,
    pub pages_with_header: usize,
    pub rows_emitted: usize,
    pub rows_skipped_no_tag: usize,
    pub unique_tags: usize,
    pub rows_missing_any_field: usize,
}

#[derive(Debug, Default)]
struct FileStats {
    pages_total: usize,
    pages_with_table: usize,
    pages_with_header: usize,
    rows_emitted: usize,
    rows_skipped_no_tag: usize,
}

pub fn run(args: &BatchArgs) -> Result<BatchSummary, CliError> {
    run_with_engine(args, &TesseractCli::default())
}

pub fn run_with_engine(args: &BatchArgs, engine: &dyn OcrEngine) -> Result<BatchSummary, CliError> {
    if !args.input_dir.is_dir() {
        return Err(CliError::failure(format!(
            "input directory not found: {}",
            args.input_dir.display()
        )));
    }
    let pdfs = discover_pdfs(&args.input_dir);
    if pdfs.is_empty() {
        return Err(CliError::failure(format!(
            "no PDF files found in {}",
            args.input_dir.display()
        )));
    }

    let tag_shape = Regex::new(TAG_SHAPE)
        .map_err(|e| CliError::failure(format!("invalid tag pattern: {e}")))?;

    let mut summary = BatchSummary::default();
    let mut all_records = RecordMap::new();

    for pdf in &pdfs {
        // partial-failure tolerant: a broken file skips, the folder continues
        let Ok((records, stats)) = extract_scanned(pdf, args.resolution, engine, &tag_shape)
        else {
            continue;
        };
        summary.files_processed += 1;
        summary.pages_total += stats.pages_total;
        summary.pages_with_table += stats.pages_with_table;
        summary.pages_with_header += stats.pages_with_header;
        summary.rows_emitted += stats.rows_emitted;
        summary.rows_skipped_no_tag += stats.rows_skipped_no_tag;

        for record in records.into_values() {
            insert_first_seen(&mut all_records, record);
        }
    }

    if all_records.is_empty() {
        return Err(CliError::from(tagsheet_core::CoreError::NoRecords)
            .with_hint("OCR may lack the required language data (chi_sim)"));
    }

    let records: Vec<InstrumentRecord> = all_records.into_values().collect();
    write_records(&args.out, &records)?;

    summary.unique_tags = records.len();
    summary.rows_missing_any_field = records.iter().filter(|r| r.missing_any_field()).count();

    println!("files_processed={}", summary.files_processed);
    println!("pages_total={}", summary.pages_total);
    println!("pages_with_table={}", summary.pages_with_table);
    println!("pages_with_header={}", summary.pages_with_header);
    println!("rows_emitted={}", summary.rows_emitted);
    println!("unique_instrument_tags={}", summary.unique_tags);
    println!("rows_with_missing_any_field={}", summary.rows_missing_any_field);
    println!("out={}", args.out.display());
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Folder discovery
// ---------------------------------------------------------------------------

/// List the folder's PDFs, collapsing revision-suffix duplicates.
///
/// Names that differ only by a `222.pdf` / `333.pdf` suffix (after whitespace
/// stripping) count as one document; the `333` variant is preferred over the
/// first seen.
pub fn discover_pdfs(folder: &Path) -> Vec<PathBuf> {
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

    let mut prefer: HashMap<String, PathBuf> = HashMap::new();
    for path in pdfs {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let key = normalize_whitespace(&name)
            .replace("222.pdf", "")
            .replace("333.pdf", "");
        match prefer.get(&key) {
            None => {
                prefer.insert(key, path);
            }
            Some(kept) => {
                let kept_name = kept
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                if name.contains("333") && !kept_name.contains("333") {
                    prefer.insert(key, path);
                }
            }
        }
    }

    let mut result: Vec<PathBuf> = prefer.into_values().collect();
    result.sort();
    result
}

// ---------------------------------------------------------------------------
// Per-file extraction
// ---------------------------------------------------------------------------

/// Map the separator glyphs OCR commonly substitutes into a plain hyphen.
fn clean_tag(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\\' | '—' | '–' => '-',
            other => other,
        })
        .collect()
}

fn extract_scanned(
    pdf: &Path,
    dpi: u32,
    engine: &dyn OcrEngine,
    tag_shape: &Regex,
) -> Result<(RecordMap, FileStats), CliError> {
    let workdir = tempfile::tempdir()
        .map_err(|e| CliError::failure(format!("cannot create temp dir: {e}")))?;
    let images = render_pages(pdf, workdir.path(), dpi)?;

    let source = pdf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let mut stats = FileStats { pages_total: images.len(), ..FileStats::default() };
    let mut records = RecordMap::new();

    // pages recognize strictly one at a time
    for image in &images {
        let words = engine.recognize(image)?;
        if words.is_empty() {
            continue;
        }
        let table = extract_page_table(&words, &RECORD_HEADERS);
        if table.band_count >= 2 {
            stats.pages_with_table += 1;
        }
        if !table.header_found {
            continue;
        }
        stats.pages_with_header += 1;

        for cells in &table.rows {
            let tag = clean_tag(cells.first().map(String::as_str).unwrap_or_default());
            let tag_key = normalize_whitespace(&tag);
            if tag_key.is_empty() || !tag_shape.is_match(&tag_key) {
                stats.rows_skipped_no_tag += 1;
                continue;
            }
            let field = |i: usize| cells.get(i).cloned().unwrap_or_default();
            let record = InstrumentRecord {
                tag,
                purpose: field(1),
                measure_range: field(2),
                unit: field(3),
                source_file: source.clone(),
            };
            if insert_first_seen(&mut records, record) {
                stats.rows_emitted += 1;
            }
        }
    }

    Ok((records, stats))
}
