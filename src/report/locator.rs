//! Sheet discovery and header-row location.
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use tracing::{debug, warn};

use crate::report::cells::SheetGrid;
use crate::report::normalizer::NormalizeError;
use crate::report::period::is_period_sheet_name;

pub const SUMMARY_SHEET: &str = "DASHBOARD";
pub const ROSTER_SHEET: &str = "Tenant Master";
pub const PAYMENT_HISTORY_SHEET: &str = "Payment History";
pub const VACANCY_SHEET: &str = "Vacancy Tracker";

/// All worksheets of a document, in workbook order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Range<Data>)>,
}

impl Workbook {
    /// Read every worksheet from xlsx / xlsm / xlsb / xls / ods bytes.
    ///
    /// A document calamine cannot open is fatal; a single sheet that fails to read
    /// is logged and left out.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NormalizeError> {
        let mut document = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| NormalizeError::InvalidDocument(e.to_string()))?;

        let mut sheets = Vec::new();
        for name in document.sheet_names() {
            match document.worksheet_range(&name) {
                Ok(range) => {
                    debug!("Loaded sheet '{}' ({:?} used cells)", name, range.get_size());
                    sheets.push((name, range));
                }
                Err(e) => warn!("Skipping unreadable sheet '{}': {}", name, e),
            }
        }

        Ok(Self { sheets })
    }

    pub fn from_sheets(sheets: Vec<(String, Range<Data>)>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Range<Data>> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, range)| range)
    }

    /// Sheets whose names look like `<MONTH NAME> <yy>`, in workbook order.
    pub fn period_sheets(&self) -> impl Iterator<Item = (&str, &Range<Data>)> {
        self.sheets
            .iter()
            .filter(|(name, _)| is_period_sheet_name(name))
            .map(|(name, range)| (name.as_str(), range))
    }
}

/// First row, top to bottom, whose column A holds exactly `marker`.
pub fn find_header_row(grid: &SheetGrid<'_>, marker: &str) -> Option<usize> {
    (0..grid.row_count()).find(|&row| grid.text_equals(row, 0, marker))
}
