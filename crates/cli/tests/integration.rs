//! End-to-end compare pipeline: real workbooks in a tempdir, no external
//! tools involved.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use tagsheet_cli::compare::{self, CompareArgs};
use tagsheet_cli::exit_codes::EXIT_FAILURE;
use tagsheet_io::xlsx::{read_grid, SheetChoice};

fn write_base(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "仪表量程核对表").unwrap();
    // row 2 left blank
    for (c, h) in ["序号", "位号", "量程下限", "量程上限"].iter().enumerate() {
        sheet.write_string(2, c as u16, *h).unwrap();
    }
    sheet.write_number(3, 0, 1.0).unwrap();
    sheet.write_string(3, 1, "101PI-01").unwrap();
    sheet.write_number(3, 2, 0.0).unwrap();
    sheet.write_number(3, 3, 100.0).unwrap();

    sheet.write_number(4, 0, 2.0).unwrap();
    sheet.write_string(4, 1, "7TI_A").unwrap();
    sheet.write_number(4, 2, 0.0).unwrap();
    sheet.write_number(4, 3, 50.0).unwrap();

    // tag absent from the compare side
    sheet.write_number(5, 0, 3.0).unwrap();
    sheet.write_string(5, 1, "X-9").unwrap();
    sheet.write_number(5, 2, 5.0).unwrap();
    sheet.write_number(5, 3, 10.0).unwrap();

    workbook.save(path).unwrap();
}

fn write_compare(path: &Path) {
    let mut workbook = Workbook::new();
    let cover = workbook.add_worksheet();
    cover.set_name("说明").unwrap();
    cover.write_string(0, 0, "仅供参考").unwrap();

    let data = workbook.add_worksheet();
    data.set_name("数据").unwrap();
    for (c, h) in ["Tag", "LRV", "URV"].iter().enumerate() {
        data.write_string(0, c as u16, *h).unwrap();
    }
    // equivalent tag, values in drifting representations
    data.write_string(1, 0, "101PT-01").unwrap();
    data.write_string(1, 1, "0.00").unwrap();
    data.write_string(1, 2, "1,00").unwrap();

    data.write_string(2, 0, "7TE_A").unwrap();
    data.write_number(2, 1, 0.0).unwrap();
    data.write_number(2, 2, 60.0).unwrap();

    workbook.save(path).unwrap();
}

fn fixture(dir: &Path) -> (PathBuf, PathBuf) {
    let base = dir.join("量程表.xlsx");
    let compare = dir.join("厂家数据.xlsx");
    write_base(&base);
    write_compare(&compare);
    (base, compare)
}

#[test]
fn compare_pipeline_marks_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (base, compare) = fixture(dir.path());
    let out_dir = dir.path().join("results");

    let summary = compare::run(&CompareArgs {
        base,
        compare,
        out_dir: Some(out_dir.clone()),
        base_sheet: None,
        compare_sheet: None,
        profile: None,
    })
    .unwrap();

    // X-9 is absent from the compare side and silently skipped
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.mismatches, 1);
    assert_eq!(summary.compare_sheet, "数据");
    let name = summary.out_path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("量程表_比对结果_"));
    assert!(name.ends_with(".xlsx"));
    assert!(summary.out_path.exists());

    let marked = read_grid(&summary.out_path, SheetChoice::First).unwrap();
    // appended headers land on the located header row
    assert_eq!(marked.rows[2][5].display(), "基准量程(下限/上限)");
    assert_eq!(marked.rows[2][6].display(), "比对量程(下限/上限)");
    // full match keeps its display columns empty
    assert!(marked.rows[3].get(5).map(|c| c.is_blank()).unwrap_or(true));
    // high-bound mismatch shows both pairs
    assert_eq!(marked.rows[4][5].display(), "下限=0, 上限=50");
    assert_eq!(marked.rows[4][6].display(), "下限=0, 上限=60");
    // original cells survive the re-render
    assert_eq!(marked.rows[0][0].display(), "仪表量程核对表");
    assert_eq!(marked.rows[3][1].display(), "101PI-01");
}

#[test]
fn rerun_clears_stale_pair_displays() {
    let dir = tempfile::tempdir().unwrap();

    // baseline already carries pair strings from an earlier comparison
    let base = dir.path().join("rerun.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, h) in ["位号", "量程下限", "量程上限"].iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    sheet.write_string(1, 0, "101PI-01").unwrap();
    sheet.write_number(1, 1, 0.0).unwrap();
    sheet.write_number(1, 2, 100.0).unwrap();
    sheet.write_string(1, 5, "下限=0, 上限=999").unwrap();
    sheet.write_string(1, 6, "下限=0, 上限=998").unwrap();
    workbook.save(&base).unwrap();

    let compare = dir.path().join("厂家数据.xlsx");
    write_compare(&compare);

    let summary = compare::run(&CompareArgs {
        base,
        compare,
        out_dir: Some(dir.path().to_path_buf()),
        base_sheet: None,
        compare_sheet: None,
        profile: None,
    })
    .unwrap();
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.mismatches, 0);

    let marked = read_grid(&summary.out_path, SheetChoice::First).unwrap();
    // full match: the old pair strings must not survive the rerun
    assert!(marked.rows[1].get(5).map(|c| c.is_blank()).unwrap_or(true));
    assert!(marked.rows[1].get(6).map(|c| c.is_blank()).unwrap_or(true));
}

#[test]
fn explicit_compare_sheet_overrides_preference() {
    let dir = tempfile::tempdir().unwrap();
    let (base, compare) = fixture(dir.path());

    // the cover sheet has no header row, so the pipeline must fail
    let err = compare::run(&CompareArgs {
        base,
        compare,
        out_dir: Some(dir.path().to_path_buf()),
        base_sheet: None,
        compare_sheet: Some("说明".to_string()),
        profile: None,
    })
    .unwrap_err();
    assert_eq!(err.code, EXIT_FAILURE);
    assert!(err.message.contains("header"));
}

#[test]
fn failure_line_goes_to_stdout() {
    let out = std::process::Command::new(env!("CARGO_BIN_EXE_tagsheet"))
        .args(["compare", "--base", "missing.xlsx", "--compare", "also_missing.xlsx"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("error:"));
    assert!(stdout.contains("not found"));
}

#[test]
fn missing_input_file_fails_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let (base, _) = fixture(dir.path());

    let err = compare::run(&CompareArgs {
        base,
        compare: dir.path().join("nope.xlsx"),
        out_dir: None,
        base_sheet: None,
        compare_sheet: None,
        profile: None,
    })
    .unwrap_err();
    assert_eq!(err.code, EXIT_FAILURE);
    assert!(err.message.contains("not found"));
}

#[test]
fn custom_profile_drives_header_discovery() {
    let dir = tempfile::tempdir().unwrap();

    let base = dir.path().join("vendor.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, h) in ["Tag No", "Min", "Max"].iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    sheet.write_string(1, 0, "101PT-01").unwrap();
    sheet.write_number(1, 1, 0.0).unwrap();
    sheet.write_number(1, 2, 100.0).unwrap();
    workbook.save(&base).unwrap();

    let compare = dir.path().join("vendor_b.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, h) in ["Tag No", "Min", "Max"].iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    sheet.write_string(1, 0, "101PI-01").unwrap();
    sheet.write_string(1, 1, "0").unwrap();
    sheet.write_string(1, 2, "100").unwrap();
    workbook.save(&compare).unwrap();

    let profile = dir.path().join("vendor.toml");
    std::fs::write(
        &profile,
        r#"
name = "vendor"

[[fields]]
name = "tag"
synonyms = ["tag no"]

[[fields]]
name = "low"
synonyms = ["min"]

[[fields]]
name = "high"
synonyms = ["max"]
"#,
    )
    .unwrap();

    let summary = compare::run(&CompareArgs {
        base,
        compare,
        out_dir: Some(dir.path().to_path_buf()),
        base_sheet: None,
        compare_sheet: None,
        profile: Some(profile),
    })
    .unwrap();

    // vendor headers resolve through the profile, tags still canonicalize
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.mismatches, 0);
}
