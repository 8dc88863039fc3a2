use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::report::{
    ParsedReport, PaymentHistoryRow, Period, PeriodPayment, PeriodSummary, SummarySeries,
};

/// Tenants late this many times or more are flagged at risk.
pub const AT_RISK_TIMES_LATE: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("Dashboard data is incomplete")]
    MissingSummary,

    #[error("Dashboard data has no periods")]
    EmptySummary,
}

/// The period a digest sent on `today` reports on: the previous month on the 1st,
/// otherwise the current month.
pub fn target_period(today: NaiveDate) -> Period {
    let current = Period::from_date(today);
    if today.day() == 1 {
        current.previous()
    } else {
        current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    Good,
    Warning,
    Poor,
}

impl RateBand {
    pub fn for_rate(rate: f64) -> Self {
        if rate > 0.9 {
            RateBand::Good
        } else if rate > 0.7 {
            RateBand::Warning
        } else {
            RateBand::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RateBand::Good => "good",
            RateBand::Warning => "warning",
            RateBand::Poor => "poor",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RateBand::Good => "#22c55e",
            RateBand::Warning => "#f59e0b",
            RateBand::Poor => "#ef4444",
        }
    }
}

/// Everything the weekly email shows, computed from one stored report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDigest {
    /// Label of the reported period, as it appears in the series.
    pub period: String,
    pub total_units: u32,
    pub summary: PeriodSummary,
    pub rate_band: RateBand,
    /// Per-period sheet the unpaid rows were taken from, if any.
    pub unpaid_sheet: Option<String>,
    /// Rows of that sheet that are neither paid nor exempt.
    pub unpaid: Vec<PeriodPayment>,
    pub at_risk: Vec<PaymentHistoryRow>,
    pub generated_on: NaiveDate,
}

impl ReportDigest {
    pub fn build(report: &ParsedReport, today: NaiveDate) -> Result<Self, DigestError> {
        let series = report.dashboard.as_ref().ok_or(DigestError::MissingSummary)?;
        let summary = select_period(series, target_period(today))?.clone();

        let sheet = report.sheet_for(&summary.label).or_else(|| {
            report
                .sheet_periods_chronological()
                .last()
                .and_then(|label| report.sheet_for(label))
        });
        let (unpaid_sheet, unpaid) = match sheet {
            Some((name, rows)) => (
                Some(name.to_string()),
                rows.iter()
                    .filter(|row| row.status.is_outstanding())
                    .cloned()
                    .collect(),
            ),
            None => (None, Vec::new()),
        };

        let at_risk = report
            .payment_history
            .iter()
            .filter(|row| row.times_late >= AT_RISK_TIMES_LATE)
            .cloned()
            .collect();

        Ok(Self {
            period: summary.label.clone(),
            total_units: report.total_units(),
            rate_band: RateBand::for_rate(summary.collection_rate),
            summary,
            unpaid_sheet,
            unpaid,
            at_risk,
            generated_on: today,
        })
    }
}

/// The target period's record, or the latest one when the series lacks it.
fn select_period(series: &SummarySeries, target: Period) -> Result<&PeriodSummary, DigestError> {
    series
        .find(&target.label())
        .or_else(|| series.latest())
        .ok_or(DigestError::EmptySummary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{sample_report, PaymentStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_target_period_on_first_of_month_is_previous_month() {
        assert_eq!(target_period(date(2026, 3, 1)).label(), "FEBRUARY 26");
        assert_eq!(target_period(date(2026, 1, 1)).label(), "DECEMBER 25");
        assert_eq!(target_period(date(2026, 3, 2)).label(), "MARCH 26");
        assert_eq!(target_period(date(2026, 3, 31)).label(), "MARCH 26");
    }

    #[test]
    fn test_rate_bands() {
        assert_eq!(RateBand::for_rate(0.95), RateBand::Good);
        assert_eq!(RateBand::for_rate(0.9), RateBand::Warning);
        assert_eq!(RateBand::for_rate(0.71), RateBand::Warning);
        assert_eq!(RateBand::for_rate(0.7), RateBand::Poor);
    }

    #[test]
    fn test_digest_for_target_period() {
        let report = sample_report();
        let digest = ReportDigest::build(&report, date(2026, 2, 10)).unwrap();

        assert_eq!(digest.period, "FEBRUARY 26");
        assert_eq!(digest.total_units, 50);
        assert_eq!(digest.summary.total_due, 12500.0);
        assert_eq!(digest.rate_band, RateBand::Warning);
        assert_eq!(digest.unpaid_sheet.as_deref(), Some("FEBRUARY 26"));

        let statuses: Vec<&PaymentStatus> = digest.unpaid.iter().map(|p| &p.status).collect();
        assert_eq!(statuses, vec![&PaymentStatus::Partial, &PaymentStatus::Pending]);

        assert_eq!(digest.at_risk.len(), 1);
        assert_eq!(digest.at_risk[0].unit, "1-01");
    }

    #[test]
    fn test_digest_falls_back_to_latest_period_and_sheet() {
        let report = sample_report();

        // February 1st targets January, which has no sheet of its own.
        let digest = ReportDigest::build(&report, date(2026, 2, 1)).unwrap();
        assert_eq!(digest.period, "JANUARY 26");
        assert_eq!(digest.summary.total_collected, 11200.0);
        assert_eq!(digest.unpaid_sheet.as_deref(), Some("FEBRUARY 26"));

        // A date outside the series reports on the latest period.
        let digest = ReportDigest::build(&report, date(2026, 10, 19)).unwrap();
        assert_eq!(digest.period, "FEBRUARY 26");
    }

    #[test]
    fn test_digest_requires_summary() {
        let mut report = sample_report();
        report.dashboard = Some(SummarySeries::default());
        assert_eq!(
            ReportDigest::build(&report, date(2026, 2, 10)),
            Err(DigestError::EmptySummary)
        );

        report.dashboard = None;
        assert_eq!(
            ReportDigest::build(&report, date(2026, 2, 10)),
            Err(DigestError::MissingSummary)
        );
    }

    #[test]
    fn test_total_units_falls_back_to_roster_size() {
        let mut report = sample_report();
        report.vacancy = None;
        let digest = ReportDigest::build(&report, date(2026, 2, 10)).unwrap();
        assert_eq!(digest.total_units, 3);
    }
}
