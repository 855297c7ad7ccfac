//! Header profiles — the injectable synonym configuration for header
//! discovery.
//!
//! Column naming in these documents drifts across families (bilingual labels,
//! abbreviations, stray whitespace), so the required fields and their accepted
//! header synonyms are data, not code. Built-in profiles cover the two
//! document families this crate ships for; arbitrary profiles load from TOML.

use serde::Deserialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct HeaderProfile {
    pub name: String,
    /// Required logical fields, in scan order.
    pub fields: Vec<FieldSpec>,
    /// How header cells (and synonyms) are normalized before matching.
    #[serde(default)]
    pub normalization: HeaderNorm,
    /// Rows scanned before giving up (1-based window, inclusive).
    #[serde(default = "default_row_window")]
    pub row_window: usize,
    /// Columns scanned per row.
    #[serde(default = "default_col_window")]
    pub col_window: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub synonyms: Vec<String>,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
}

/// How a synonym matches a normalized header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Header cell must contain the synonym.
    #[default]
    Contains,
    /// Header cell must equal the synonym.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderNorm {
    /// Lowercase and strip all whitespace (bilingual/abbreviated headers).
    #[default]
    LowerStripped,
    /// Strip all whitespace only; case-sensitive (exact CJK headers).
    Stripped,
}

fn default_row_window() -> usize {
    20
}

fn default_col_window() -> usize {
    100
}

// ---------------------------------------------------------------------------
// Built-in profiles
// ---------------------------------------------------------------------------

/// Logical field names shared by the built-in profiles.
pub mod fields {
    pub const TAG: &str = "tag";
    pub const LOW: &str = "low";
    pub const HIGH: &str = "high";
    pub const PURPOSE: &str = "purpose";
    pub const RANGE: &str = "measure_range";
    pub const UNIT: &str = "unit";
}

impl HeaderProfile {
    /// Bilingual range-check profile: tag + low/high bound columns,
    /// substring matching, 20-row window.
    pub fn range_check() -> Self {
        let field = |name: &str, synonyms: &[&str]| FieldSpec {
            name: name.into(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            match_mode: MatchMode::Contains,
        };
        Self {
            name: "range_check".into(),
            fields: vec![
                field(fields::TAG, &["位号", "tag"]),
                field(fields::LOW, &["量程下限", "下限", "lrv", "range low", "low range"]),
                field(fields::HIGH, &["量程上限", "上限", "urv", "range high", "high range"]),
            ],
            normalization: HeaderNorm::LowerStripped,
            row_window: 20,
            col_window: 100,
        }
    }

    /// DCS monitoring-sheet profile: the four exact Chinese field names,
    /// 80x80 scan window.
    pub fn dcs_fields() -> Self {
        let field = |name: &str, header: &str| FieldSpec {
            name: name.into(),
            synonyms: vec![header.into()],
            match_mode: MatchMode::Exact,
        };
        Self {
            name: "dcs_fields".into(),
            fields: vec![
                field(fields::TAG, "仪表位号"),
                field(fields::PURPOSE, "用途"),
                field(fields::RANGE, "测量范围"),
                field(fields::UNIT, "工程单位"),
            ],
            normalization: HeaderNorm::Stripped,
            row_window: 80,
            col_window: 80,
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, CoreError> {
        let profile: HeaderProfile =
            toml::from_str(input).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fields.is_empty() {
            return Err(CoreError::ConfigValidation(
                "profile must declare at least one field".into(),
            ));
        }
        for field in &self.fields {
            if field.synonyms.iter().all(|s| s.trim().is_empty()) {
                return Err(CoreError::ConfigValidation(format!(
                    "field '{}' has no usable synonyms",
                    field.name
                )));
            }
        }
        if self.row_window == 0 || self.col_window == 0 {
            return Err(CoreError::ConfigValidation(
                "row_window and col_window must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOM: &str = r#"
name = "vendor_x"
row_window = 10
col_window = 40
normalization = "lower_stripped"

[[fields]]
name = "tag"
synonyms = ["tag no", "位号"]

[[fields]]
name = "low"
synonyms = ["lrv"]
match = "exact"
"#;

    #[test]
    fn parse_custom_profile() {
        let profile = HeaderProfile::from_toml(CUSTOM).unwrap();
        assert_eq!(profile.name, "vendor_x");
        assert_eq!(profile.fields.len(), 2);
        assert_eq!(profile.fields[0].match_mode, MatchMode::Contains);
        assert_eq!(profile.fields[1].match_mode, MatchMode::Exact);
        assert_eq!(profile.row_window, 10);
    }

    #[test]
    fn defaults_applied() {
        let toml = r#"
name = "minimal"
[[fields]]
name = "tag"
synonyms = ["tag"]
"#;
        let profile = HeaderProfile::from_toml(toml).unwrap();
        assert_eq!(profile.row_window, 20);
        assert_eq!(profile.col_window, 100);
        assert_eq!(profile.normalization, HeaderNorm::LowerStripped);
    }

    #[test]
    fn reject_empty_fields() {
        let toml = r#"
name = "bad"
fields = []
"#;
        let err = HeaderProfile::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("at least one field"));
    }

    #[test]
    fn reject_blank_synonyms() {
        let toml = r#"
name = "bad"
[[fields]]
name = "tag"
synonyms = ["  "]
"#;
        let err = HeaderProfile::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("tag"));
    }

    #[test]
    fn builtin_profiles_validate() {
        HeaderProfile::range_check().validate().unwrap();
        HeaderProfile::dcs_fields().validate().unwrap();
    }
}
