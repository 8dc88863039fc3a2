//! Merging per-period sheets into the summary series.
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::report::diagnostics::Diagnostic;
use crate::report::models::{
    PayerCategory, PayerTotals, PaymentHistoryRow, PeriodPayment, PeriodSummary, SummarySeries,
};
use crate::report::period::{compare_labels, label_key};
use crate::report::status::{HistoryMark, PaymentStatus};

/// Largest summary/sheet difference still treated as rounding.
const TOTALS_TOLERANCE: f64 = 0.005;

/// Outcome of [`reconcile`] besides the merged series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Labels derived from per-period sheets, in the order they were appended.
    pub added: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// For each period of the merged series, its column in the summary sheet;
    /// `None` for periods derived from a sheet.
    pub sources: Vec<Option<usize>>,
}

/// Summary metrics for one period computed from its payment rows.
pub fn derive_period_summary(label: &str, rows: &[PeriodPayment]) -> PeriodSummary {
    let mut summary = PeriodSummary::new(label);
    let mut paid_units = 0usize;
    let mut billable_units = 0usize;

    for row in rows {
        summary.total_due += row.due;
        summary.total_collected += row.paid;
        summary.total_outstanding += row.balance;
        summary.unpaid_prev += row.prev_balance;

        if row.status == PaymentStatus::Paid {
            paid_units += 1;
        }
        if row.status != PaymentStatus::NotApplicable {
            billable_units += 1;
        }

        let payer = match row.paid_to {
            PayerCategory::Mpire => Some(&mut summary.mpire),
            PayerCategory::Owner => Some(&mut summary.owner),
            PayerCategory::Other(_) => None,
        };
        if let Some(totals) = payer {
            add_row(totals, row);
        }
    }

    summary.collection_rate = if summary.total_due > 0.0 {
        summary.total_collected / summary.total_due
    } else {
        0.0
    };
    summary.units_paid = format!("{paid_units}/{billable_units}");

    summary
}

fn add_row(totals: &mut PayerTotals, row: &PeriodPayment) {
    totals.due += row.due;
    totals.collected += row.paid;
    totals.outstanding += row.balance;
}

/// Append summaries for every per-period sheet the series lacks, then sort the
/// series chronologically.
///
/// With no summary but at least one sheet, a series is built from the sheets alone.
/// Where the summary already covers a sheet, its values are kept and any
/// disagreement with the sheet's totals is reported as a diagnostic.
pub fn reconcile(
    summary: Option<SummarySeries>,
    monthly_sheets: &BTreeMap<String, Vec<PeriodPayment>>,
) -> (Option<SummarySeries>, Reconciliation) {
    let mut outcome = Reconciliation::default();

    if summary.is_none() && monthly_sheets.is_empty() {
        return (None, outcome);
    }
    let mut series = summary.unwrap_or_default();
    let declared = series.len();

    let mut labels: Vec<&str> = monthly_sheets.keys().map(String::as_str).collect();
    labels.sort_by(|a, b| compare_labels(a, b));

    let mut seen: HashSet<String> = HashSet::new();
    for label in labels {
        if !seen.insert(label_key(label)) {
            continue;
        }
        let derived = derive_period_summary(label, &monthly_sheets[label]);

        match series.find(label) {
            Some(existing) => outcome
                .diagnostics
                .extend(compare_totals(existing, &derived)),
            None => {
                debug!("Deriving summary for period '{}' from its sheet", label);
                outcome.added.push(label.to_string());
                series.push(derived);
            }
        }
    }

    outcome.sources = series
        .sort_chronologically()
        .into_iter()
        .map(|index| (index < declared).then_some(index))
        .collect();
    (Some(series), outcome)
}

/// Reorder each history row to follow the merged series.
///
/// Marks are read in summary column order; after this, `history[i]` belongs to the
/// series' `i`-th period. Derived periods have no history column and get
/// [`HistoryMark::Unknown`].
pub fn align_history(rows: &mut [PaymentHistoryRow], sources: &[Option<usize>]) {
    for row in rows {
        row.history = sources
            .iter()
            .map(|source| {
                source
                    .and_then(|index| row.history.get(index).copied())
                    .unwrap_or(HistoryMark::Unknown)
            })
            .collect();
    }
}

fn compare_totals(summary: &PeriodSummary, derived: &PeriodSummary) -> Vec<Diagnostic> {
    [
        ("totalDue", summary.total_due, derived.total_due),
        ("totalCollected", summary.total_collected, derived.total_collected),
        ("totalOutstanding", summary.total_outstanding, derived.total_outstanding),
    ]
    .into_iter()
    .filter(|(_, kept, computed)| (kept - computed).abs() > TOTALS_TOLERANCE)
    .map(|(metric, kept, computed)| {
        warn!(
            "Period '{}': summary {} {} disagrees with sheet total {}; keeping summary",
            summary.label, metric, kept, computed
        );
        Diagnostic::TotalsMismatch {
            period: summary.label.clone(),
            metric,
            summary: kept,
            derived: computed,
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(due: f64, paid: f64, status: PaymentStatus, payer: PayerCategory) -> PeriodPayment {
        PeriodPayment {
            unit: "G-01".to_string(),
            tenant: "Tenant".to_string(),
            due,
            paid,
            balance: due - paid,
            status,
            paid_to: payer,
            days_late: 0.0,
            prev_balance: 0.0,
        }
    }

    fn sheets(entries: &[(&str, Vec<PeriodPayment>)]) -> BTreeMap<String, Vec<PeriodPayment>> {
        entries
            .iter()
            .map(|(label, rows)| (label.to_string(), rows.clone()))
            .collect()
    }

    #[test]
    fn test_derive_period_summary() {
        let mut partial = payment(250.0, 100.0, PaymentStatus::Partial, PayerCategory::Owner);
        partial.prev_balance = 40.0;
        let rows = vec![
            payment(250.0, 250.0, PaymentStatus::Paid, PayerCategory::Mpire),
            partial,
            payment(0.0, 0.0, PaymentStatus::NotApplicable, PayerCategory::Mpire),
            payment(100.0, 0.0, PaymentStatus::Pending, PayerCategory::Other("X".into())),
        ];

        let summary = derive_period_summary("FEBRUARY 26", &rows);
        assert_eq!(summary.label, "FEBRUARY 26");
        assert_eq!(summary.total_due, 600.0);
        assert_eq!(summary.total_collected, 350.0);
        assert_eq!(summary.total_outstanding, 250.0);
        assert!((summary.collection_rate - 350.0 / 600.0).abs() < 1e-12);
        assert_eq!(summary.units_paid, "1/3");
        assert_eq!(summary.unpaid_prev, 40.0);
        assert_eq!(summary.mpire.due, 250.0);
        assert_eq!(summary.mpire.collected, 250.0);
        assert_eq!(summary.owner.outstanding, 150.0);
    }

    #[test]
    fn test_zero_due_gives_zero_rate() {
        let summary = derive_period_summary("MAY 26", &[]);
        assert_eq!(summary.collection_rate, 0.0);
        assert_eq!(summary.units_paid, "0/0");
    }

    #[test]
    fn test_reconcile_appends_missing_periods_in_order() {
        let existing = SummarySeries::new(vec![PeriodSummary::new("FEBRUARY 26")]);
        let sheets = sheets(&[
            ("MARCH 26", vec![payment(100.0, 100.0, PaymentStatus::Paid, PayerCategory::Mpire)]),
            ("JANUARY 26", vec![]),
            ("february 26", vec![]),
        ]);

        let (series, outcome) = reconcile(Some(existing), &sheets);
        let series = series.unwrap();

        assert_eq!(series.labels(), vec!["JANUARY 26", "FEBRUARY 26", "MARCH 26"]);
        assert_eq!(outcome.added, vec!["JANUARY 26", "MARCH 26"]);
        assert_eq!(outcome.sources, vec![None, Some(0), None]);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(series.find("MARCH 26").unwrap().collection_rate, 1.0);
    }

    #[test]
    fn test_reconcile_without_summary() {
        let (series, outcome) = reconcile(None, &BTreeMap::new());
        assert!(series.is_none());
        assert!(outcome.added.is_empty());

        let sheets = sheets(&[("MARCH 26", vec![]), ("JANUARY 26", vec![])]);
        let (series, _) = reconcile(None, &sheets);
        assert_eq!(series.unwrap().labels(), vec!["JANUARY 26", "MARCH 26"]);
    }

    #[test]
    fn test_summary_stays_authoritative_on_mismatch() {
        let mut jan = PeriodSummary::new("JANUARY 26");
        jan.total_due = 500.0;
        jan.total_collected = 250.0;
        jan.total_outstanding = 250.0;
        let sheets = sheets(&[(
            "JANUARY 26",
            vec![payment(250.0, 250.0, PaymentStatus::Paid, PayerCategory::Mpire)],
        )]);

        let (series, outcome) = reconcile(Some(SummarySeries::new(vec![jan])), &sheets);
        let series = series.unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.periods()[0].total_due, 500.0);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert!(matches!(
            &outcome.diagnostics[0],
            Diagnostic::TotalsMismatch { metric: "totalDue", summary, derived, .. }
                if *summary == 500.0 && *derived == 250.0
        ));
    }

    #[test]
    fn test_out_of_order_summary_realigns_history() {
        let existing = SummarySeries::new(vec![
            PeriodSummary::new("FEBRUARY 26"),
            PeriodSummary::new("JANUARY 26"),
        ]);
        let sheets = sheets(&[("MARCH 26", vec![])]);

        let (series, outcome) = reconcile(Some(existing), &sheets);
        assert_eq!(
            series.unwrap().labels(),
            vec!["JANUARY 26", "FEBRUARY 26", "MARCH 26"]
        );
        assert_eq!(outcome.sources, vec![Some(1), Some(0), None]);

        let mut rows = vec![PaymentHistoryRow {
            unit: "G-01".to_string(),
            tenant: "Tenant".to_string(),
            history: vec![HistoryMark::Paid, HistoryMark::Pending],
            times_late: 1,
            avg_days_late: 3.0,
        }];
        align_history(&mut rows, &outcome.sources);

        assert_eq!(
            rows[0].history,
            vec![HistoryMark::Pending, HistoryMark::Paid, HistoryMark::Unknown]
        );
    }
}
