//! Decimal-aware cell equality.
//!
//! Two cells compare numerically when both sides parse as decimals; anything
//! else falls back to trimmed-string comparison. Unparseable values never
//! error, they just downgrade.

use crate::model::Cell;

// ---------------------------------------------------------------------------
// Normalized decimal
// ---------------------------------------------------------------------------

/// Arbitrary-precision decimal normalized for equality: sign + digit string +
/// non-negative scale, with no leading integer zeros and no trailing
/// fractional zeros. `10`, `10.0`, and `1e1` all normalize identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    neg: bool,
    digits: String,
    scale: u32,
}

/// Exponents beyond this bound would materialize as zero digits during
/// normalization; no range value gets anywhere near it.
const EXPONENT_LIMIT: i64 = 9_999;

impl Decimal {
    /// Parse a decimal literal. Comma thousands-separators are stripped
    /// before parsing. Returns `None` for anything that is not a plain
    /// decimal number (optionally with an exponent), or whose exponent
    /// exceeds [`EXPONENT_LIMIT`].
    pub fn parse(input: &str) -> Option<Self> {
        let s: String = input.trim().chars().filter(|&c| c != ',').collect();
        if s.is_empty() {
            return None;
        }

        let mut chars = s.chars().peekable();
        let neg = match chars.peek() {
            Some('-') => {
                chars.next();
                true
            }
            Some('+') => {
                chars.next();
                false
            }
            _ => false,
        };

        let mut digits = String::new();
        let mut frac_len: i64 = 0;
        let mut seen_digit = false;
        let mut seen_dot = false;
        let mut exp: i64 = 0;

        while let Some(&c) = chars.peek() {
            match c {
                '0'..='9' => {
                    digits.push(c);
                    if seen_dot {
                        frac_len += 1;
                    }
                    seen_digit = true;
                    chars.next();
                }
                '.' if !seen_dot => {
                    seen_dot = true;
                    chars.next();
                }
                'e' | 'E' if seen_digit => {
                    chars.next();
                    let mut exp_str = String::new();
                    if let Some(&sign @ ('+' | '-')) = chars.peek() {
                        exp_str.push(sign);
                        chars.next();
                    }
                    while let Some(&d @ '0'..='9') = chars.peek() {
                        exp_str.push(d);
                        chars.next();
                    }
                    exp = exp_str.parse().ok()?;
                    if !(-EXPONENT_LIMIT..=EXPONENT_LIMIT).contains(&exp) {
                        return None;
                    }
                    break;
                }
                _ => return None,
            }
        }
        if chars.next().is_some() || !seen_digit {
            return None;
        }

        Some(Self::normalize(neg, digits, frac_len - exp))
    }

    /// Numeric value of a cell, if it has one. Booleans are explicitly
    /// excluded from numeric parsing; empty text is "no value".
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Number(n) if n.is_finite() => Self::parse(&n.to_string()),
            Cell::Text(s) => Self::parse(s),
            _ => None,
        }
    }

    fn normalize(neg: bool, mut digits: String, mut scale: i64) -> Self {
        // fold a positive exponent into trailing zeros
        while scale < 0 {
            digits.push('0');
            scale += 1;
        }
        // drop trailing fractional zeros: 10.0 == 10
        while scale > 0 && digits.ends_with('0') {
            digits.pop();
            scale -= 1;
        }
        let digits = digits.trim_start_matches('0');
        // digits-as-integer must still cover the fractional places
        let mut padded = String::new();
        if (digits.len() as i64) < scale {
            for _ in 0..(scale - digits.len() as i64) {
                padded.push('0');
            }
        }
        padded.push_str(digits);

        if padded.chars().all(|c| c == '0') || padded.is_empty() {
            return Self { neg: false, digits: "0".into(), scale: 0 };
        }
        Self { neg, digits: padded, scale: scale as u32 }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Decimal-aware equality. Symmetric by construction.
pub fn values_equal(a: &Cell, b: &Cell) -> bool {
    match (Decimal::from_cell(a), Decimal::from_cell(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.display().trim() == b.display().trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    #[test]
    fn representation_insensitive() {
        assert_eq!(num("10"), num("10.0"));
        assert_eq!(num("10"), num("1e1"));
        assert_eq!(num("0.05"), num("5e-2"));
        assert_eq!(num("-0"), num("0"));
        assert_eq!(num("00.500"), num(".5"));
        assert_ne!(num("10"), num("10.01"));
        assert_ne!(num("-10"), num("10"));
    }

    #[test]
    fn comma_separators_stripped() {
        assert_eq!(num("10,000"), num("10000"));
        assert_eq!(num("1,234.5"), num("1234.50"));
    }

    #[test]
    fn rejects_non_numbers() {
        assert!(Decimal::parse("").is_none());
        assert!(Decimal::parse("  ").is_none());
        assert!(Decimal::parse("abc").is_none());
        assert!(Decimal::parse("1.2.3").is_none());
        assert!(Decimal::parse("1e").is_none());
        assert!(Decimal::parse(".").is_none());
        assert!(Decimal::parse("0-100").is_none());
    }

    #[test]
    fn extreme_exponents_rejected() {
        assert!(Decimal::parse("1e1000000000").is_none());
        assert!(Decimal::parse("1e-1000000000").is_none());
        assert!(Decimal::parse("1e99999999999999999999").is_none());
        assert!(Decimal::parse("1e300").is_some());
        assert!(Decimal::parse("1e-300").is_some());
    }

    #[test]
    fn booleans_never_parse_numeric() {
        assert!(Decimal::from_cell(&Cell::Bool(true)).is_none());
    }

    #[test]
    fn equality_numeric_across_types() {
        assert!(values_equal(&Cell::Number(10.0), &Cell::text("10")));
        assert!(values_equal(&Cell::text("10,000"), &Cell::text("10000")));
        assert!(!values_equal(&Cell::Number(100.0), &Cell::text("150")));
    }

    #[test]
    fn equality_falls_back_to_strings() {
        assert!(values_equal(&Cell::text("0-100 kPa"), &Cell::text("0-100 kPa")));
        assert!(!values_equal(&Cell::text("0-100"), &Cell::text("0-150")));
        // empty vs empty: string comparison, not numeric
        assert!(values_equal(&Cell::Empty, &Cell::text("")));
        assert!(!values_equal(&Cell::Empty, &Cell::text("0")));
    }

    #[test]
    fn equality_is_symmetric() {
        let cases = [
            (Cell::Number(10.0), Cell::text("10")),
            (Cell::text("x"), Cell::Number(1.0)),
            (Cell::Empty, Cell::Bool(false)),
            (Cell::text("10,000"), Cell::text("10000")),
        ];
        for (a, b) in &cases {
            assert_eq!(values_equal(a, b), values_equal(b, a));
        }
    }
}
