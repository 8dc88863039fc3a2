//! Payment status classification.
//!
//! Raw status text in the workbook is free-form ("Paid", "Partially Paid — balance
//! owed", "Pending (follow up)"). It is classified by an ordered rule table; the first
//! matching rule wins. Matching is case-sensitive, as the report writes these words
//! capitalized.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPattern {
    Contains(&'static str),
    Equals(&'static str),
}

impl StatusPattern {
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            StatusPattern::Contains(needle) => raw.contains(needle),
            StatusPattern::Equals(expected) => raw == *expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule<T> {
    pub pattern: StatusPattern,
    pub outcome: T,
}

/// First outcome whose pattern matches `raw`.
pub fn first_match<T: Copy>(rules: &[StatusRule<T>], raw: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.pattern.matches(raw))
        .map(|rule| rule.outcome)
}

/// Status of one unit's payment within a period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Partial,
    NotApplicable,
    /// Unrecognized status text, kept verbatim.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownStatus {
    Paid,
    Pending,
    Partial,
    NotApplicable,
}

impl From<KnownStatus> for PaymentStatus {
    fn from(status: KnownStatus) -> Self {
        match status {
            KnownStatus::Paid => PaymentStatus::Paid,
            KnownStatus::Pending => PaymentStatus::Pending,
            KnownStatus::Partial => PaymentStatus::Partial,
            KnownStatus::NotApplicable => PaymentStatus::NotApplicable,
        }
    }
}

/// Per-period sheet status rules, in priority order.
pub const PAYMENT_STATUS_RULES: [StatusRule<KnownStatus>; 4] = [
    StatusRule {
        pattern: StatusPattern::Contains("Partial"),
        outcome: KnownStatus::Partial,
    },
    StatusRule {
        pattern: StatusPattern::Contains("Paid"),
        outcome: KnownStatus::Paid,
    },
    StatusRule {
        pattern: StatusPattern::Contains("Pending"),
        outcome: KnownStatus::Pending,
    },
    StatusRule {
        pattern: StatusPattern::Equals("N/A"),
        outcome: KnownStatus::NotApplicable,
    },
];

/// Classify raw per-period status text. Unmatched text passes through as `Other`.
pub fn classify_payment_status(raw: &str) -> PaymentStatus {
    first_match(&PAYMENT_STATUS_RULES, raw)
        .map(PaymentStatus::from)
        .unwrap_or_else(|| PaymentStatus::Other(raw.to_string()))
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::NotApplicable => "N/A",
            PaymentStatus::Other(raw) => raw,
        }
    }

    /// Rows that still need chasing: anything not settled and not exempt.
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, PaymentStatus::Paid | PaymentStatus::NotApplicable)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentStatus {
    // Exact canonical names only; classification of raw sheet text goes through the rules.
    fn from(value: String) -> Self {
        match value.as_str() {
            "Paid" => PaymentStatus::Paid,
            "Pending" => PaymentStatus::Pending,
            "Partial" => PaymentStatus::Partial,
            "N/A" => PaymentStatus::NotApplicable,
            _ => PaymentStatus::Other(value),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One cell of the payment-history grid, rendered as a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistoryMark {
    Paid,
    Pending,
    Partial,
    Unknown,
}

/// Payment-history rules, in priority order. No match means `Unknown`.
pub const HISTORY_MARK_RULES: [StatusRule<HistoryMark>; 3] = [
    StatusRule {
        pattern: StatusPattern::Contains("Partial"),
        outcome: HistoryMark::Partial,
    },
    StatusRule {
        pattern: StatusPattern::Contains("Paid"),
        outcome: HistoryMark::Paid,
    },
    StatusRule {
        pattern: StatusPattern::Contains("Pending"),
        outcome: HistoryMark::Pending,
    },
];

pub fn classify_history_mark(raw: &str) -> HistoryMark {
    first_match(&HISTORY_MARK_RULES, raw).unwrap_or(HistoryMark::Unknown)
}

impl HistoryMark {
    pub fn glyph(&self) -> &'static str {
        match self {
            HistoryMark::Paid => "✓",
            HistoryMark::Pending => "✗",
            HistoryMark::Partial => "◐",
            HistoryMark::Unknown => "—",
        }
    }
}

impl From<String> for HistoryMark {
    fn from(glyph: String) -> Self {
        match glyph.as_str() {
            "✓" => HistoryMark::Paid,
            "✗" => HistoryMark::Pending,
            "◐" => HistoryMark::Partial,
            _ => HistoryMark::Unknown,
        }
    }
}

impl From<HistoryMark> for String {
    fn from(mark: HistoryMark) -> Self {
        mark.glyph().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_rules_in_priority_order() {
        let cases = [
            ("Paid", PaymentStatus::Paid),
            ("Paid in full", PaymentStatus::Paid),
            ("Pending", PaymentStatus::Pending),
            ("Pending (follow up)", PaymentStatus::Pending),
            ("Partial", PaymentStatus::Partial),
            ("Partially Paid — balance owed", PaymentStatus::Partial),
            ("Paid Partial", PaymentStatus::Partial),
            ("Pending / Paid", PaymentStatus::Paid),
            ("N/A", PaymentStatus::NotApplicable),
            ("N/A - vacant", PaymentStatus::Other("N/A - vacant".to_string())),
            ("Vacant", PaymentStatus::Other("Vacant".to_string())),
            ("Unpaid", PaymentStatus::Other("Unpaid".to_string())),
            ("", PaymentStatus::Other(String::new())),
        ];

        for (raw, expected) in cases {
            assert_eq!(classify_payment_status(raw), expected, "raw status {raw:?}");
        }
    }

    #[test]
    fn test_payment_status_matching_is_case_sensitive() {
        assert_eq!(
            classify_payment_status("paid"),
            PaymentStatus::Other("paid".to_string())
        );
    }

    #[test]
    fn test_history_mark_rules() {
        assert_eq!(classify_history_mark("Paid"), HistoryMark::Paid);
        assert_eq!(classify_history_mark("✓ Paid"), HistoryMark::Paid);
        assert_eq!(classify_history_mark("Pending"), HistoryMark::Pending);
        assert_eq!(classify_history_mark("Partial"), HistoryMark::Partial);
        assert_eq!(classify_history_mark("Partially Paid"), HistoryMark::Partial);
        assert_eq!(classify_history_mark(""), HistoryMark::Unknown);
        assert_eq!(classify_history_mark("N/A"), HistoryMark::Unknown);
    }

    #[test]
    fn test_status_serializes_as_plain_strings() {
        let json = serde_json::to_string(&vec![
            PaymentStatus::Paid,
            PaymentStatus::NotApplicable,
            PaymentStatus::Other("Vacant".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"["Paid","N/A","Vacant"]"#);

        let marks: Vec<HistoryMark> = serde_json::from_str(r#"["✓","◐","✗","?"]"#).unwrap();
        assert_eq!(
            marks,
            vec![
                HistoryMark::Paid,
                HistoryMark::Partial,
                HistoryMark::Pending,
                HistoryMark::Unknown
            ]
        );
    }

    #[test]
    fn test_outstanding_statuses() {
        assert!(!PaymentStatus::Paid.is_outstanding());
        assert!(!PaymentStatus::NotApplicable.is_outstanding());
        assert!(PaymentStatus::Partial.is_outstanding());
        assert!(PaymentStatus::Pending.is_outstanding());
        assert!(PaymentStatus::Other("Late".to_string()).is_outstanding());
    }
}
