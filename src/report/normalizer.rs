use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::report::cells::SheetGrid;
use crate::report::diagnostics::Diagnostic;
use crate::report::extract::{
    extract_payment_history, extract_period_payments, extract_summary, extract_tenants,
    extract_vacancy,
};
use crate::report::locator::{
    find_header_row, Workbook, PAYMENT_HISTORY_SHEET, ROSTER_SHEET, SUMMARY_SHEET, VACANCY_SHEET,
};
use crate::report::models::{ParsedReport, PeriodPayment, SummarySeries};
use crate::report::reconcile::{align_history, reconcile};
use crate::report::schema::{
    HistoryColumns, PeriodColumns, RosterColumns, SchemaError, SheetSchema,
    PAYMENT_HISTORY_SCHEMA, PERIOD_PAYMENTS_SCHEMA, ROSTER_SCHEMA, SUMMARY_SCHEMA,
};

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to parse document: {0}")]
    InvalidDocument(String),

    #[error("Invalid sheet schema: {0}")]
    Schema(#[from] SchemaError),
}

/// A normalized report plus the non-fatal findings gathered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub report: ParsedReport,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns a rent collection workbook into a [`ParsedReport`].
///
/// Stateless apart from the resolved column layouts, so one instance can be shared
/// across threads. Normalizing is synchronous and CPU-bound; async callers should
/// run it under `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct WorkbookNormalizer {
    roster: RosterColumns,
    history: HistoryColumns,
    period: PeriodColumns,
}

impl WorkbookNormalizer {
    pub fn new() -> Result<Self, NormalizeError> {
        Ok(Self {
            roster: RosterColumns::resolve(&ROSTER_SCHEMA)?,
            history: HistoryColumns::resolve(&PAYMENT_HISTORY_SCHEMA)?,
            period: PeriodColumns::resolve(&PERIOD_PAYMENTS_SCHEMA)?,
        })
    }

    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<Normalized, NormalizeError> {
        let workbook = Workbook::from_bytes(bytes)?;
        Ok(self.normalize(&workbook))
    }

    pub fn normalize(&self, workbook: &Workbook) -> Normalized {
        let mut diagnostics = Vec::new();

        // Summary
        let summary = workbook.sheet(SUMMARY_SHEET).and_then(|range| {
            let grid = SheetGrid::new(range);
            let header = locate(&grid, SUMMARY_SHEET, &SUMMARY_SCHEMA, &mut diagnostics)?;
            Some(extract_summary(&grid, header))
        });
        let declared_periods = summary.as_ref().map(SummarySeries::labels).unwrap_or_default();

        // Tenant roster
        let tenants = workbook
            .sheet(ROSTER_SHEET)
            .and_then(|range| {
                let grid = SheetGrid::new(range);
                let header = locate(&grid, ROSTER_SHEET, &ROSTER_SCHEMA, &mut diagnostics)?;
                Some(extract_tenants(&grid, header, &self.roster))
            })
            .unwrap_or_default();

        // Payment history
        let mut payment_history = workbook
            .sheet(PAYMENT_HISTORY_SHEET)
            .and_then(|range| {
                let grid = SheetGrid::new(range);
                let header = locate(
                    &grid,
                    PAYMENT_HISTORY_SHEET,
                    &PAYMENT_HISTORY_SCHEMA,
                    &mut diagnostics,
                )?;
                Some(extract_payment_history(
                    &grid,
                    header,
                    &declared_periods,
                    &self.history,
                ))
            })
            .unwrap_or_default();

        // Per-period sheets
        let mut monthly_sheets: BTreeMap<String, Vec<PeriodPayment>> = BTreeMap::new();
        for (name, range) in workbook.period_sheets() {
            let grid = SheetGrid::new(range);
            let Some(header) = locate(&grid, name, &PERIOD_PAYMENTS_SCHEMA, &mut diagnostics)
            else {
                continue;
            };
            let rows = extract_period_payments(&grid, header, &self.period);
            debug!("Period sheet '{}': {} payment rows", name, rows.len());
            monthly_sheets.insert(name.to_string(), rows);
        }

        // Vacancy
        let vacancy_grid = workbook.sheet(VACANCY_SHEET).map(SheetGrid::new);
        let vacancy = extract_vacancy(vacancy_grid.as_ref());

        let (dashboard, reconciliation) = reconcile(summary, &monthly_sheets);
        if dashboard.is_some() {
            align_history(&mut payment_history, &reconciliation.sources);
        }
        diagnostics.extend(reconciliation.diagnostics);

        let months = dashboard
            .as_ref()
            .map(SummarySeries::labels)
            .unwrap_or_default();

        info!(
            "Normalized workbook: {} periods ({} derived), {} tenants, {} period sheets, {} history rows, {} diagnostics",
            months.len(),
            reconciliation.added.len(),
            tenants.len(),
            monthly_sheets.len(),
            payment_history.len(),
            diagnostics.len()
        );

        Normalized {
            report: ParsedReport {
                dashboard,
                tenants,
                months,
                monthly_sheets,
                payment_history,
                vacancy: Some(vacancy),
            },
            diagnostics,
        }
    }
}

/// Header row of a sheet, recording a diagnostic when there is none and one per
/// required column whose header cell is blank.
fn locate(
    grid: &SheetGrid<'_>,
    sheet: &str,
    schema: &SheetSchema,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<usize> {
    let Some(header) = find_header_row(grid, schema.marker) else {
        warn!(
            "Sheet '{}' has no header row starting with '{}'; skipping",
            sheet, schema.marker
        );
        diagnostics.push(Diagnostic::HeaderNotFound {
            sheet: sheet.to_string(),
            marker: schema.marker,
        });
        return None;
    };

    for spec in schema.unlabeled_columns(grid, header) {
        let diagnostic = Diagnostic::MissingColumn {
            sheet: sheet.to_string(),
            kind: schema.kind,
            field: spec.field,
            column: spec.index,
        };
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
    }

    Some(header)
}

/// Normalize workbook bytes with a fresh [`WorkbookNormalizer`].
pub fn normalize_workbook(bytes: &[u8]) -> Result<ParsedReport, NormalizeError> {
    let normalizer = WorkbookNormalizer::new()?;
    Ok(normalizer.normalize_bytes(bytes)?.report)
}
