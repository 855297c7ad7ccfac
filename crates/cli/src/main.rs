//! `tagsheet` — instrument-table extraction, merge, and range reconciliation.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tagsheet_cli::exit_codes::EXIT_SUCCESS;
use tagsheet_cli::{batch, compare, extract, CliError};

#[derive(Parser)]
#[command(name = "tagsheet")]
#[command(about = "Instrument-table extraction, merge, and range reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare range bounds between two workbooks and write a marked copy
    #[command(after_help = "\
Examples:
  tagsheet compare --base 量程表.xlsx --compare 厂家数据.xlsx
  tagsheet compare --base a.xlsx --compare b.xlsx --out-dir results --compare-sheet 数据
  tagsheet compare --base a.xlsx --compare b.xlsx --profile vendor.toml")]
    Compare(compare::CompareArgs),

    /// Extract DCS records from a text-layer PDF, filling gaps from a spreadsheet
    #[command(after_help = "\
Examples:
  tagsheet extract --pdf 监控数据表DCS.pdf --out 提取结果.xlsx
  tagsheet extract --pdf 监控数据表DCS.pdf --xlsx-fallback 台账.xlsx --out 提取结果.xlsx")]
    Extract(extract::ExtractArgs),

    /// OCR every scanned PDF in a folder into one consolidated workbook
    #[command(after_help = "\
Examples:
  tagsheet batch --input-dir scans/ --out 汇总.xlsx
  tagsheet batch --input-dir scans/ --out 汇总.xlsx --resolution 240")]
    Batch(batch::BatchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare(args) => compare::run(&args).map(|_| ()),
        Commands::Extract(args) => extract::run(&args).map(|_| ()),
        Commands::Batch(args) => batch::run(&args).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            // the failure line is part of the stdout contract, next to the
            // pipelines' key=value counters
            println!("error: {message}");
            if let Some(hint) = hint {
                println!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}
