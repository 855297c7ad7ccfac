//! OCR word boundary for scanned pages.
//!
//! Pages are rasterized with `pdftoppm` and recognized with the `tesseract`
//! CLI in TSV mode. Everything downstream works on positioned words, so the
//! engine sits behind a small trait and tests can feed synthetic word lists.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::IoError;

const PDFTOPPM: &str = "pdftoppm";
const TESSERACT: &str = "tesseract";

/// One recognized word with its pixel bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl OcrWord {
    pub fn mid_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.h / 2.0
    }
}

/// Pixel-space rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn contains_mid(&self, word: &OcrWord) -> bool {
        let mx = word.mid_x();
        let my = word.mid_y();
        mx >= self.x0 && mx < self.x1 && my >= self.top && my < self.bottom
    }
}

pub trait OcrEngine {
    /// Recognize one page image into positioned words. A missing OCR tool is
    /// not an error: the page simply yields no words.
    fn recognize(&self, image: &Path) -> Result<Vec<OcrWord>, IoError>;
}

// ---------------------------------------------------------------------------
// tesseract CLI engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TesseractCli {
    pub langs: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self { langs: "chi_sim+eng".to_string() }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path) -> Result<Vec<OcrWord>, IoError> {
        if which::which(TESSERACT).is_err() {
            return Ok(Vec::new());
        }

        let output = Command::new(TESSERACT)
            .arg(image)
            .arg("stdout")
            .args(["-l", &self.langs, "tsv"])
            .output()
            .map_err(|e| IoError::ToolFailed { tool: TESSERACT, detail: e.to_string() })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IoError::ToolFailed {
                tool: TESSERACT,
                detail: stderr.trim().to_string(),
            });
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse tesseract TSV output, keeping word-level entries (level 5) with
/// non-empty text.
fn parse_tsv(tsv: &str) -> Vec<OcrWord> {
    let mut words = Vec::new();
    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }
        let (Ok(x), Ok(y), Ok(w), Ok(h)) = (
            cols[6].parse::<f64>(),
            cols[7].parse::<f64>(),
            cols[8].parse::<f64>(),
            cols[9].parse::<f64>(),
        ) else {
            continue;
        };
        words.push(OcrWord { text: text.to_string(), x, y, w, h });
    }
    words
}

// ---------------------------------------------------------------------------
// Spatial join and text cleanup
// ---------------------------------------------------------------------------

/// Concatenate (left to right) every word whose midpoint falls inside `rect`.
pub fn words_in_rect(words: &[OcrWord], rect: Rect) -> String {
    let mut hits: Vec<&OcrWord> = words.iter().filter(|w| rect.contains_mid(w)).collect();
    hits.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    let joined: String = hits.iter().map(|w| w.text.as_str()).collect();
    clean_text(&joined)
}

/// Strip all whitespace and fold full-width comma/period into ASCII, undoing
/// the spacing OCR injects into CJK text.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '，' => ',',
            '。' => '.',
            other => other,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rasterization
// ---------------------------------------------------------------------------

/// Render every page of a PDF to PNG at the given DPI, returning the image
/// paths in page order.
pub fn render_pages(pdf: &Path, out_dir: &Path, dpi: u32) -> Result<Vec<PathBuf>, IoError> {
    which::which(PDFTOPPM).map_err(|_| IoError::ToolMissing { tool: PDFTOPPM })?;

    let prefix = out_dir.join("page");
    let output = Command::new(PDFTOPPM)
        .args(["-r", &dpi.to_string(), "-png"])
        .arg(pdf)
        .arg(&prefix)
        .output()
        .map_err(|e| IoError::ToolFailed { tool: PDFTOPPM, detail: e.to_string() })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IoError::ToolFailed {
            tool: PDFTOPPM,
            detail: stderr.trim().to_string(),
        });
    }

    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    let entries = std::fs::read_dir(out_dir).map_err(|e| IoError::Open {
        path: out_dir.display().to_string(),
        reason: e.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| IoError::Open {
            path: out_dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(number) = name
            .strip_prefix("page-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .and_then(|digits| digits.parse::<u32>().ok())
        {
            pages.push((number, path));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}
