//! `tagsheet-io` — file I/O for the instrument-table pipelines.
//!
//! Excel read/write (calamine + rust_xlsxwriter), text-layer PDF table rows
//! via `pdftotext`, page rasterization via `pdftoppm`, and the OCR word
//! boundary (`tesseract` TSV) with its word-geometry spatial join.

pub mod error;
pub mod ocr;
pub mod pdf;
pub mod table;
pub mod xlsx;

pub use error::IoError;
pub use ocr::{OcrEngine, OcrWord, Rect, TesseractCli};
pub use xlsx::{read_grid, SheetChoice, SheetGrid};
