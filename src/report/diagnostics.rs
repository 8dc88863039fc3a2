use std::fmt;

use crate::report::schema::{Field, SheetKind};

/// Non-fatal findings collected while normalizing a workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A required column's header cell is empty; values are still read from it.
    MissingColumn {
        sheet: String,
        kind: SheetKind,
        field: Field,
        column: usize,
    },
    /// The sheet exists but no row starts with its marker cell.
    HeaderNotFound {
        sheet: String,
        marker: &'static str,
    },
    /// The summary sheet and the per-period rows disagree; the summary value is kept.
    TotalsMismatch {
        period: String,
        metric: &'static str,
        summary: f64,
        derived: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingColumn {
                sheet,
                kind,
                field,
                column,
            } => write!(
                f,
                "sheet '{sheet}' ({kind}): expected '{field}' header in column {column} is empty"
            ),
            Diagnostic::HeaderNotFound { sheet, marker } => {
                write!(f, "sheet '{sheet}': no header row starting with '{marker}'")
            }
            Diagnostic::TotalsMismatch {
                period,
                metric,
                summary,
                derived,
            } => write!(
                f,
                "period '{period}': summary {metric} {summary} differs from sheet total {derived}"
            ),
        }
    }
}
