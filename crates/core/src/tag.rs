//! Instrument-tag normalization and function-code canonicalization.
//!
//! Equivalent tags from different documents must compare equal despite
//! formatting drift: whitespace, case, and the domain's function-code
//! equivalences (a pressure indicator `PI` and a pressure transmitter `PT`
//! refer to the same physical instrument in these tables).

use std::collections::HashMap;

use regex::Regex;

/// Remove all whitespace. Empty or whitespace-only input yields the empty
/// string, which callers treat as "no tag" and skip.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapse internal whitespace runs to a single space and trim.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalizes tags of the shape `<prefix><digits><2-letter code><sep><rest>`
/// by mapping the function code through an equivalence table.
///
/// Canonical codes map to themselves, so canonicalization is idempotent.
#[derive(Debug, Clone)]
pub struct TagNormalizer {
    canon: HashMap<String, String>,
    shape: Regex,
}

impl Default for TagNormalizer {
    fn default() -> Self {
        Self::new(&[
            ("PI", "PT"),
            ("PT", "PT"),
            ("TI", "TE"),
            ("TE", "TE"),
            ("LI", "LT"),
            ("LT", "LT"),
            ("VI", "VE"),
            ("VE", "VE"),
        ])
    }
}

impl TagNormalizer {
    /// Build a normalizer from (code, canonical code) pairs.
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let canon = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            canon,
            // prefix of optional letters + digits, exactly two letters,
            // then a `_` or `-` separator and arbitrary suffix
            shape: Regex::new(r"^([A-Z]*\d+)([A-Z]{2})([_-].*)$").expect("tag shape regex"),
        }
    }

    /// Whitespace-strip, uppercase, and canonicalize the function code.
    ///
    /// Tags that do not match the recognized shape come back uppercased and
    /// otherwise untouched. Unknown codes pass through unchanged.
    pub fn canonicalize(&self, raw: &str) -> String {
        let s = normalize_whitespace(raw);
        if s.is_empty() {
            return s;
        }
        let upper = s.to_uppercase();
        match self.shape.captures(&upper) {
            Some(caps) => {
                let code = &caps[2];
                let canon = self.canon.get(code).map(String::as_str).unwrap_or(code);
                format!("{}{}{}", &caps[1], canon, &caps[3])
            }
            None => upper,
        }
    }
}
