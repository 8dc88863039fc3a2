// Rent collection workbook normalization
//
// A rent report workbook contains:
// - DASHBOARD: per-period summary metrics (one column per period)
// - Tenant Master: the tenant roster
// - Payment History: per-unit payment marks across the summary's periods
// - <MONTH yy> sheets: per-unit payment rows for one period
// - Vacancy Tracker: labelled unit counts

pub mod cells;
pub mod diagnostics;
pub mod extract;
pub mod locator;
pub mod models;
pub mod normalizer;
pub mod period;
pub mod reconcile;
pub mod sample;
pub mod schema;
pub mod status;

pub use diagnostics::Diagnostic;
pub use locator::Workbook;
pub use models::{
    DashboardData, OccupancyStatus, ParsedReport, PayerCategory, PayerTotals, PaymentHistoryRow,
    PeriodPayment, PeriodSummary, SummarySeries, Tenant, ValidationError, VacancySnapshot,
};
pub use normalizer::{normalize_workbook, NormalizeError, Normalized, WorkbookNormalizer};
pub use period::Period;
pub use sample::sample_report;
pub use status::{HistoryMark, PaymentStatus};
