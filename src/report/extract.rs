//! Row extraction for each sheet kind.
//!
//! Every extractor takes a located grid plus the header row index and walks the data
//! rows below it. Cell coercion never fails; see [`crate::report::cells`].
use tracing::debug;

use crate::report::cells::{is_total_marker, SheetGrid};
use crate::report::models::{
    PaymentHistoryRow, PayerCategory, PeriodPayment, PeriodSummary, SummarySeries, Tenant,
    VacancySnapshot, DEFAULT_TOTAL_UNITS,
};
use crate::report::schema::{
    summary_metric_for, HistoryColumns, LabelledCell, PeriodColumns, RosterColumns,
    SummaryMetric, VACANCY_CURRENTLY_VACANT, VACANCY_OCCUPANCY_RATE, VACANCY_TOTAL_UNITS,
};
use crate::report::status::{classify_history_mark, classify_payment_status};

const UNNAMED: &str = "—";
const DEFAULT_OCCUPANCY_STATUS: &str = "Active";

/// Rows below `header_row` that carry data: first cell non-empty.
fn data_rows<'a>(grid: SheetGrid<'a>, header_row: usize) -> impl Iterator<Item = usize> + 'a {
    (header_row + 1..grid.row_count()).filter(move |&row| !grid.is_blank(row, 0))
}

/// Data rows that are not "TOTAL" footers.
fn record_rows<'a>(grid: SheetGrid<'a>, header_row: usize) -> impl Iterator<Item = usize> + 'a {
    data_rows(grid, header_row).filter(move |&row| !is_total_marker(grid.cell(row, 0)))
}

/// Summary sheet: one column per period label in the header row, one row per metric.
///
/// Values are read from the column each label sits in. Returns the series in sheet
/// order; the declared labels are available from [`SummarySeries::labels`].
pub fn extract_summary(grid: &SheetGrid<'_>, header_row: usize) -> SummarySeries {
    let period_columns: Vec<(usize, String)> = (1..grid.column_count())
        .filter_map(|col| grid.text(header_row, col).map(|label| (col, label)))
        .collect();

    let mut periods: Vec<PeriodSummary> = period_columns
        .iter()
        .map(|(_, label)| PeriodSummary::new(label.clone()))
        .collect();

    for row in header_row + 1..grid.row_count() {
        let Some(metric) = grid.text(row, 0).and_then(|label| summary_metric_for(&label)) else {
            continue;
        };

        for (summary, (col, _)) in periods.iter_mut().zip(&period_columns) {
            let value = grid.number(row, *col);
            match metric {
                SummaryMetric::TotalDue => summary.total_due = value,
                SummaryMetric::TotalCollected => summary.total_collected = value,
                SummaryMetric::TotalOutstanding => summary.total_outstanding = value,
                SummaryMetric::CollectionRate => summary.collection_rate = value,
                SummaryMetric::UnitsPaid => summary.units_paid = grid.text_or(row, *col, ""),
                SummaryMetric::UnpaidPrev => summary.unpaid_prev = value,
                SummaryMetric::MpireDue => summary.mpire.due = value,
                SummaryMetric::MpireCollected => summary.mpire.collected = value,
                SummaryMetric::MpireOutstanding => summary.mpire.outstanding = value,
                SummaryMetric::OwnerDue => summary.owner.due = value,
                SummaryMetric::OwnerCollected => summary.owner.collected = value,
                SummaryMetric::OwnerOutstanding => summary.owner.outstanding = value,
            }
        }
    }

    debug!("Summary sheet declares {} periods", periods.len());
    SummarySeries::new(periods)
}

pub fn extract_tenants(
    grid: &SheetGrid<'_>,
    header_row: usize,
    cols: &RosterColumns,
) -> Vec<Tenant> {
    record_rows(*grid, header_row)
        .map(|row| Tenant {
            id: grid.number(row, cols.id) as i64,
            unit: grid.text_or(row, cols.unit, ""),
            name: grid.text_or(row, cols.name, UNNAMED),
            rent: grid.number(row, cols.rent),
            gateway: grid.text_or(row, cols.gateway, ""),
            paid_to: PayerCategory::from(grid.text_or(row, cols.paid_to, "")),
            status: grid
                .text_or(row, cols.status, DEFAULT_OCCUPANCY_STATUS)
                .into(),
        })
        .collect()
}

/// Payment history, one mark per entry of `periods`.
///
/// `periods` is the list the summary sheet declared; the rollup columns sit right
/// after the per-period columns, so their position depends on its length.
pub fn extract_payment_history(
    grid: &SheetGrid<'_>,
    header_row: usize,
    periods: &[String],
    cols: &HistoryColumns,
) -> Vec<PaymentHistoryRow> {
    let count = periods.len();

    data_rows(*grid, header_row)
        .map(|row| PaymentHistoryRow {
            unit: grid.text_or(row, cols.unit, ""),
            tenant: grid.text_or(row, cols.tenant, ""),
            history: (0..count)
                .map(|i| {
                    let raw = grid.text_or(row, cols.history_start + i, "");
                    classify_history_mark(&raw)
                })
                .collect(),
            times_late: count_value(grid.number(row, cols.times_late(count))),
            avg_days_late: grid.number(row, cols.avg_days_late(count)),
        })
        .collect()
}

pub fn extract_period_payments(
    grid: &SheetGrid<'_>,
    header_row: usize,
    cols: &PeriodColumns,
) -> Vec<PeriodPayment> {
    record_rows(*grid, header_row)
        .map(|row| PeriodPayment {
            unit: grid.text_or(row, cols.unit, ""),
            tenant: grid.text_or(row, cols.tenant, UNNAMED),
            due: grid.number(row, cols.due),
            paid: grid.number(row, cols.paid),
            balance: grid.number(row, cols.balance),
            status: classify_payment_status(&grid.text_or(row, cols.status, "")),
            paid_to: PayerCategory::from(grid.text_or(row, cols.paid_to, "")),
            days_late: grid.number(row, cols.days_late),
            prev_balance: grid.number(row, cols.prev_balance),
        })
        .collect()
}

/// Vacancy snapshot from labelled cells anywhere on the sheet.
///
/// An absent sheet or label keeps the defaults; a zero or non-numeric unit total
/// keeps the default total.
pub fn extract_vacancy(grid: Option<&SheetGrid<'_>>) -> VacancySnapshot {
    let mut snapshot = VacancySnapshot::default();
    let Some(grid) = grid else {
        return snapshot;
    };

    if let Some(total) = labelled_value(grid, &VACANCY_TOTAL_UNITS) {
        let total = count_value(total);
        snapshot.total_units = if total == 0 {
            DEFAULT_TOTAL_UNITS
        } else {
            total
        };
    }
    if let Some(vacant) = labelled_value(grid, &VACANCY_CURRENTLY_VACANT) {
        snapshot.vacant = count_value(vacant);
    }
    if let Some(occupancy) = labelled_value(grid, &VACANCY_OCCUPANCY_RATE) {
        snapshot.occupancy = occupancy;
    }

    snapshot
}

/// Value next to the last occurrence of a label cell.
fn labelled_value(grid: &SheetGrid<'_>, cell: &LabelledCell) -> Option<f64> {
    (0..grid.row_count())
        .filter(|&row| grid.text_equals(row, cell.column, cell.label))
        .last()
        .map(|row| grid.number(row, cell.value_column()))
}

fn count_value(value: f64) -> u32 {
    // `as` saturates: negatives become 0, huge values u32::MAX.
    value.round() as u32
}
