//! `tagsheet compare` — reconcile range bounds between two workbooks and
//! write a marked copy of the baseline.

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Args;

use tagsheet_core::config::fields;
use tagsheet_core::header::find_header;
use tagsheet_core::model::{Cell, HeaderLocation, RangePair};
use tagsheet_core::reconcile::{build_compare_map, reconcile, BaseRow};
use tagsheet_core::{HeaderProfile, TagNormalizer};
use tagsheet_io::xlsx::{read_grid, write_comparison, SheetChoice};

use crate::CliError;

/// Sheet name preferred on the comparison side when none is given.
const PREFERRED_COMPARE_SHEET: &str = "数据";

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline workbook; the marked copy is derived from it
    #[arg(long)]
    pub base: PathBuf,

    /// Comparison workbook
    #[arg(long)]
    pub compare: PathBuf,

    /// Output directory (default: the baseline's directory)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Baseline sheet name (default: first sheet)
    #[arg(long)]
    pub base_sheet: Option<String>,

    /// Comparison sheet name (default: prefer 数据, else first sheet)
    #[arg(long)]
    pub compare_sheet: Option<String>,

    /// Header profile TOML replacing the built-in range profile
    #[arg(long)]
    pub profile: Option<PathBuf>,
}

#[derive(Debug)]
pub struct CompareSummary {
    pub base_sheet: String,
    pub compare_sheet: String,
    pub matched: usize,
    pub mismatches: usize,
    pub out_path: PathBuf,
}

pub fn run(args: &CompareArgs) -> Result<CompareSummary, CliError> {
    for (label, path) in [("base", &args.base), ("compare", &args.compare)] {
        if !path.exists() {
            return Err(CliError::failure(format!(
                "{label} file not found: {}",
                path.display()
            )));
        }
    }

    let profile = load_profile(args.profile.as_deref())?;
    let normalizer = TagNormalizer::default();

    let compare_choice = match &args.compare_sheet {
        Some(name) => SheetChoice::Named(name),
        None => SheetChoice::Prefer(PREFERRED_COMPARE_SHEET),
    };
    let compare_grid = read_grid(&args.compare, compare_choice)?;
    let (_, compare_rows) = tagged_rows(&compare_grid.rows, &profile, &normalizer)?;
    let compare_map = build_compare_map(compare_rows.into_iter().map(|r| (r.tag, r.pair)));

    let base_choice = match &args.base_sheet {
        Some(name) => SheetChoice::Named(name),
        None => SheetChoice::First,
    };
    let base_grid = read_grid(&args.base, base_choice)?;
    let (location, base_rows) = tagged_rows(&base_grid.rows, &profile, &normalizer)?;
    let (_, col_low, col_high) = range_columns(&location)?;

    let output = reconcile(&base_rows, &compare_map);

    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .base
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let out_path = out_dir.join(output_name(&args.base, &timestamp));

    write_comparison(
        &out_path,
        &base_grid.sheet_name,
        &base_grid.rows,
        location.header_row,
        col_low,
        col_high,
        &output.rows,
    )?;

    let summary = CompareSummary {
        base_sheet: base_grid.sheet_name,
        compare_sheet: compare_grid.sheet_name,
        matched: output.matched,
        mismatches: output.mismatches,
        out_path,
    };
    println!("base_sheet={}", summary.base_sheet);
    println!("compare_sheet={}", summary.compare_sheet);
    println!("matched={}", summary.matched);
    println!("mismatches={}", summary.mismatches);
    println!("out={}", summary.out_path.display());
    Ok(summary)
}

fn load_profile(path: Option<&Path>) -> Result<HeaderProfile, CliError> {
    match path {
        None => Ok(HeaderProfile::range_check()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::failure(format!("cannot read profile {}: {e}", path.display()))
            })?;
            Ok(HeaderProfile::from_toml(&text)?)
        }
    }
}

/// `<stem>_比对结果_<timestamp><suffix>`, keeping the baseline's extension.
fn output_name(base: &Path, timestamp: &str) -> String {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("base");
    let suffix = base
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{stem}_比对结果_{timestamp}{suffix}")
}

fn range_columns(location: &HeaderLocation) -> Result<(usize, usize, usize), CliError> {
    match (
        location.col(fields::TAG),
        location.col(fields::LOW),
        location.col(fields::HIGH),
    ) {
        (Some(tag), Some(low), Some(high)) => Ok((tag, low, high)),
        _ => Err(CliError::failure(
            "header profile must declare the 'tag', 'low', and 'high' fields",
        )),
    }
}

/// Locate the header and pull every data row with a non-empty canonical tag,
/// in document order.
fn tagged_rows(
    grid: &[Vec<Cell>],
    profile: &HeaderProfile,
    normalizer: &TagNormalizer,
) -> Result<(HeaderLocation, Vec<BaseRow>), CliError> {
    let location = find_header(grid, profile)?;
    let (col_tag, col_low, col_high) = range_columns(&location)?;

    let mut rows = Vec::new();
    for (i, row) in grid.iter().enumerate().skip(location.header_row) {
        let cell = |col: usize| row.get(col - 1).cloned().unwrap_or(Cell::Empty);
        let tag = normalizer.canonicalize(&cell(col_tag).display());
        if tag.is_empty() {
            continue;
        }
        rows.push(BaseRow {
            row: i + 1,
            tag,
            pair: RangePair { low: cell(col_low), high: cell(col_high) },
        });
    }
    Ok((location, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_keeps_stem_and_suffix() {
        let name = output_name(Path::new("/data/量程表.xlsx"), "20250101_120000");
        assert_eq!(name, "量程表_比对结果_20250101_120000.xlsx");
    }

    #[test]
    fn output_name_without_extension() {
        let name = output_name(Path::new("base"), "20250101_120000");
        assert_eq!(name, "base_比对结果_20250101_120000");
    }
}
