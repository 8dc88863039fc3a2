//! Billing period labels ("FEBRUARY 26") and their chronological ordering.
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

pub const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

fn period_sheet_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?i)^(JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\s+[0-9]{2}$",
            )
            .ok()
        })
        .as_ref()
}

/// Whether a sheet name looks like a per-period payment sheet (`<MONTH NAME> <yy>`).
pub fn is_period_sheet_name(name: &str) -> bool {
    period_sheet_pattern().is_some_and(|pattern| pattern.is_match(name))
}

/// A calendar month within a two-digit year.
///
/// Ordering is by year, then month index (January = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    year: u8,
    month_index: u8,
}

impl Period {
    pub fn new(year: u8, month_index: u8) -> Option<Self> {
        (year < 100 && month_index < 12).then_some(Self { year, month_index })
    }

    /// Parse a label such as "FEBRUARY 26" or "february  26" (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        let mut parts = label.split_whitespace();
        let month = parts.next()?;
        let year = parts.next()?;
        if parts.next().is_some() || year.len() != 2 {
            return None;
        }

        let month_index = MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month))?;
        let year: u8 = year.parse().ok()?;

        Self::new(year, month_index as u8)
    }

    /// The reporting period for a calendar date (two-digit year).
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().rem_euclid(100) as u8,
            month_index: date.month0() as u8,
        }
    }

    pub fn previous(self) -> Self {
        if self.month_index == 0 {
            Self {
                year: if self.year == 0 { 99 } else { self.year - 1 },
                month_index: 11,
            }
        } else {
            Self {
                year: self.year,
                month_index: self.month_index - 1,
            }
        }
    }

    pub fn year(&self) -> u8 {
        self.year
    }

    pub fn month_index(&self) -> u8 {
        self.month_index
    }

    /// Canonical uppercase label, e.g. "MARCH 26".
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}",
            MONTH_NAMES[self.month_index as usize], self.year
        )
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month_index).cmp(&(other.year, other.month_index))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Uppercase-normalized key used for period label comparisons.
pub fn label_key(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// Compare two period labels chronologically.
///
/// Labels that do not parse as periods sort before all parseable labels and keep
/// their relative order under a stable sort.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    Period::parse(a).cmp(&Period::parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_labels() {
        let feb = Period::parse("FEBRUARY 26").unwrap();
        assert_eq!(feb.month_index(), 1);
        assert_eq!(feb.year(), 26);

        assert_eq!(Period::parse("february 26"), Some(feb));
        assert_eq!(Period::parse("  February   26 "), Some(feb));
        assert_eq!(Period::parse("FEB 26"), None);
        assert_eq!(Period::parse("FEBRUARY 2026"), None);
        assert_eq!(Period::parse("FEBRUARY"), None);
        assert_eq!(Period::parse("FEBRUARY 26 extra"), None);
    }

    #[test]
    fn test_period_ordering_is_year_then_month() {
        let dec_25 = Period::parse("DECEMBER 25").unwrap();
        let jan_26 = Period::parse("JANUARY 26").unwrap();
        let mar_26 = Period::parse("MARCH 26").unwrap();

        assert!(dec_25 < jan_26);
        assert!(jan_26 < mar_26);

        let mut labels = vec!["MARCH 26", "DECEMBER 25", "JANUARY 26"];
        labels.sort_by(|a, b| compare_labels(a, b));
        assert_eq!(labels, vec!["DECEMBER 25", "JANUARY 26", "MARCH 26"]);
    }

    #[test]
    fn test_unparseable_labels_sort_first() {
        let mut labels = vec!["MARCH 26", "Totals", "JANUARY 26"];
        labels.sort_by(|a, b| compare_labels(a, b));
        assert_eq!(labels, vec!["Totals", "JANUARY 26", "MARCH 26"]);
    }

    #[test]
    fn test_period_sheet_name_pattern() {
        assert!(is_period_sheet_name("FEBRUARY 26"));
        assert!(is_period_sheet_name("March 26"));
        assert!(is_period_sheet_name("december   25"));
        assert!(!is_period_sheet_name("DASHBOARD"));
        assert!(!is_period_sheet_name("FEB 26"));
        assert!(!is_period_sheet_name("MARCH 2026"));
        assert!(!is_period_sheet_name("MARCH 26 (copy)"));
    }

    #[test]
    fn test_period_sheet_names_need_ascii_year() {
        assert!(!is_period_sheet_name("MARCH ٢٦"));
        assert!(Period::parse("MARCH ٢٦").is_none());

        // Every name the pattern accepts must parse.
        for name in ["JANUARY 26", "april 09", "December  99"] {
            assert!(is_period_sheet_name(name));
            assert!(Period::parse(name).is_some(), "{name} should parse");
        }
    }

    #[test]
    fn test_from_date_and_previous() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let jan = Period::from_date(date);
        assert_eq!(jan.label(), "JANUARY 26");
        assert_eq!(jan.previous().label(), "DECEMBER 25");

        let oct = Period::from_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(oct.label(), "OCTOBER 26");
        assert_eq!(oct.previous().label(), "SEPTEMBER 26");
    }

    #[test]
    fn test_label_key_normalizes_case_and_spacing() {
        assert_eq!(label_key("march  26"), "MARCH 26");
        assert_eq!(label_key(" MARCH 26 "), "MARCH 26");
    }
}
