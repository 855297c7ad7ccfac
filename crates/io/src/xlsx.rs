//! Excel read/write.
//!
//! Reading goes through calamine into the engine's backend-neutral `Cell`
//! grid, with absolute row/column indices preserved (data may not start at
//! A1). Writing goes through rust_xlsxwriter; since the pair cannot edit a
//! workbook in place, the comparison writer re-renders the baseline sheet's
//! values into a fresh workbook and layers fills on top.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use tagsheet_core::model::{Cell, InstrumentRecord};
use tagsheet_core::reconcile::{RowOutcome, RowResult};

use crate::error::IoError;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SheetGrid {
    pub sheet_name: String,
    /// Dense grid with absolute indices; `rows[0]` is sheet row 1.
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Copy)]
pub enum SheetChoice<'a> {
    /// First sheet in the workbook.
    First,
    /// Exactly this sheet; error when absent.
    Named(&'a str),
    /// This sheet when present, else the first.
    Prefer(&'a str),
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}

/// Read one sheet into a dense cell grid.
pub fn read_grid(path: &Path, choice: SheetChoice<'_>) -> Result<SheetGrid, IoError> {
    let open_err = |reason: String| IoError::Open { path: path.display().to_string(), reason };

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| open_err(e.to_string()))?;
    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(open_err("workbook contains no sheets".into()));
    }

    let sheet_name = match choice {
        SheetChoice::First => names[0].clone(),
        SheetChoice::Named(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(IoError::SheetNotFound {
                    path: path.display().to_string(),
                    sheet: name.to_string(),
                });
            }
            name.to_string()
        }
        SheetChoice::Prefer(name) => {
            if names.iter().any(|n| n == name) {
                name.to_string()
            } else {
                names[0].clone()
            }
        }
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| open_err(e.to_string()))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (height, width) = range.get_size();
    let total_rows = start_row as usize + height;
    let total_cols = start_col as usize + width;

    let mut rows = vec![vec![Cell::Empty; total_cols]; total_rows];
    for (r, row) in range.rows().enumerate() {
        for (c, data) in row.iter().enumerate() {
            rows[start_row as usize + r][start_col as usize + c] = convert(data);
        }
    }

    Ok(SheetGrid { sheet_name, rows })
}

// ---------------------------------------------------------------------------
// Writing: merged record sets
// ---------------------------------------------------------------------------

pub const RECORD_HEADERS: [&str; 4] = ["仪表位号", "用途", "测量范围", "工程单位"];
const RECORD_WIDTHS: [f64; 4] = [18.0, 28.0, 26.0, 12.0];

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
}

fn save(workbook: &mut Workbook, path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| IoError::Write {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
    }
    workbook.save(path).map_err(|e| IoError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Write merged records as the 4-column extraction workbook: bold frozen
/// header, autofilter, fixed column widths, wrapped top-aligned data cells.
pub fn write_records(path: &Path, records: &[InstrumentRecord]) -> Result<(), IoError> {
    let write_err = |e: rust_xlsxwriter::XlsxError| IoError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("提取结果").map_err(write_err)?;

    let head = header_format();
    let body = Format::new().set_align(FormatAlign::Top).set_text_wrap();

    for (c, title) in RECORD_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, c as u16, *title, &head)
            .map_err(write_err)?;
    }
    for (r, record) in records.iter().enumerate() {
        let row = (r + 1) as u32;
        let cells = [&record.tag, &record.purpose, &record.measure_range, &record.unit];
        for (c, value) in cells.iter().enumerate() {
            worksheet
                .write_string_with_format(row, c as u16, value.as_str(), &body)
                .map_err(write_err)?;
        }
    }

    worksheet.set_freeze_panes(1, 0).map_err(write_err)?;
    worksheet
        .autofilter(0, 0, records.len() as u32, 3)
        .map_err(write_err)?;
    for (c, width) in RECORD_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(c as u16, *width).map_err(write_err)?;
    }

    save(&mut workbook, path)
}

// ---------------------------------------------------------------------------
// Writing: marked comparison
// ---------------------------------------------------------------------------

/// 1-based columns holding the side-by-side pair displays.
pub const BASE_PAIR_COL: usize = 6;
pub const COMPARE_PAIR_COL: usize = 7;

pub const BASE_PAIR_HEADER: &str = "基准量程(下限/上限)";
pub const COMPARE_PAIR_HEADER: &str = "比对量程(下限/上限)";

const GREEN: Color = Color::RGB(0xC6EFCE);
const RED: Color = Color::RGB(0xFFC7CE);

/// Re-render the baseline sheet with agreement fills and pair displays.
///
/// `header_row`, `col_low`, `col_high` are 1-based, as produced by the header
/// locator. Matched rows get green fills on both bound cells and nothing in
/// the display columns; mismatched rows get red on each disagreeing bound and
/// both formatted pairs.
pub fn write_comparison(
    path: &Path,
    sheet_name: &str,
    grid: &[Vec<Cell>],
    header_row: usize,
    col_low: usize,
    col_high: usize,
    results: &[RowResult],
) -> Result<(), IoError> {
    let write_err = |e: rust_xlsxwriter::XlsxError| IoError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(write_err)?;

    let by_row: HashMap<usize, &RowResult> = results.iter().map(|r| (r.row, r)).collect();

    let green = Format::new().set_background_color(GREEN);
    let red = Format::new().set_background_color(RED);

    for (r, row) in grid.iter().enumerate() {
        let sheet_row = r + 1;
        for (c, cell) in row.iter().enumerate() {
            let sheet_col = c + 1;
            // reconciled rows own their display columns: mismatches rewrite
            // them below, full matches leave them cleared
            if (sheet_col == BASE_PAIR_COL || sheet_col == COMPARE_PAIR_COL)
                && by_row.contains_key(&sheet_row)
            {
                continue;
            }
            let fill = by_row.get(&sheet_row).and_then(|result| {
                let bound = if sheet_col == col_low {
                    Some(true)
                } else if sheet_col == col_high {
                    Some(false)
                } else {
                    None
                };
                bound.map(|is_low| match result.outcome {
                    RowOutcome::FullMatch => &green,
                    RowOutcome::Mismatch { low_equal, high_equal } => {
                        let equal = if is_low { low_equal } else { high_equal };
                        if equal { &green } else { &red }
                    }
                })
            });
            write_cell(worksheet, r as u32, c as u16, cell, fill).map_err(write_err)?;
        }
    }

    // appended display columns
    let head = header_format();
    let header_r = (header_row - 1) as u32;
    worksheet
        .write_string_with_format(header_r, (BASE_PAIR_COL - 1) as u16, BASE_PAIR_HEADER, &head)
        .map_err(write_err)?;
    worksheet
        .write_string_with_format(header_r, (COMPARE_PAIR_COL - 1) as u16, COMPARE_PAIR_HEADER, &head)
        .map_err(write_err)?;

    for result in results {
        if matches!(result.outcome, RowOutcome::FullMatch) {
            continue;
        }
        let row = (result.row - 1) as u32;
        worksheet
            .write_string(row, (BASE_PAIR_COL - 1) as u16, &result.base_display)
            .map_err(write_err)?;
        worksheet
            .write_string(row, (COMPARE_PAIR_COL - 1) as u16, &result.compare_display)
            .map_err(write_err)?;
    }

    save(&mut workbook, path)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match (cell, format) {
        (Cell::Empty, None) => {}
        (Cell::Empty, Some(f)) => {
            worksheet.write_blank(row, col, f)?;
        }
        (Cell::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (Cell::Text(s), Some(f)) => {
            worksheet.write_string_with_format(row, col, s, f)?;
        }
        (Cell::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (Cell::Number(n), Some(f)) => {
            worksheet.write_number_with_format(row, col, *n, f)?;
        }
        (Cell::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (Cell::Bool(b), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, *b, f)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
