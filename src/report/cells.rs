//! Cell access and coercion for worksheet grids.
//!
//! Positions are absolute: row 0 / column A is `(0, 0)` even when calamine's used
//! range starts further into the sheet. Coercion never fails; a value of the wrong
//! type degrades to 0, an empty string, or `None`.
use calamine::{Data, Range};

static EMPTY: Data = Data::Empty;

/// Read-only view over a worksheet range using absolute cell positions.
#[derive(Clone, Copy)]
pub struct SheetGrid<'a> {
    range: &'a Range<Data>,
}

impl<'a> SheetGrid<'a> {
    pub fn new(range: &'a Range<Data>) -> Self {
        Self { range }
    }

    /// Number of rows from row 0 through the last used row.
    pub fn row_count(&self) -> usize {
        self.range.end().map_or(0, |(row, _)| row as usize + 1)
    }

    /// Number of columns from column A through the last used column.
    pub fn column_count(&self) -> usize {
        self.range.end().map_or(0, |(_, col)| col as usize + 1)
    }

    pub fn cell(&self, row: usize, col: usize) -> &'a Data {
        let (Ok(row), Ok(col)) = (u32::try_from(row), u32::try_from(col)) else {
            return &EMPTY;
        };
        self.range.get_value((row, col)).unwrap_or(&EMPTY)
    }

    pub fn number(&self, row: usize, col: usize) -> f64 {
        to_number(self.cell(row, col))
    }

    pub fn text(&self, row: usize, col: usize) -> Option<String> {
        to_text(self.cell(row, col))
    }

    /// Text of a cell, or `default` when the cell is empty.
    pub fn text_or(&self, row: usize, col: usize, default: &str) -> String {
        self.text(row, col).unwrap_or_else(|| default.to_string())
    }

    pub fn is_blank(&self, row: usize, col: usize) -> bool {
        is_blank(self.cell(row, col))
    }

    /// Whether the cell holds exactly `expected` (surrounding whitespace ignored).
    pub fn text_equals(&self, row: usize, col: usize, expected: &str) -> bool {
        matches!(self.cell(row, col), Data::String(s) if s.trim() == expected)
    }
}

/// Coerce a cell to a number. Non-numeric content yields 0.
pub fn to_number(cell: &Data) -> f64 {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::Bool(b) => f64::from(u8::from(*b)),
        Data::DateTime(dt) => dt.as_f64(),
        Data::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Coerce a cell to trimmed text. Empty cells yield `None`.
pub fn to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Footer rows carry "TOTAL" in their first cell.
pub fn is_total_marker(cell: &Data) -> bool {
    to_text(cell).is_some_and(|s| s.eq_ignore_ascii_case("TOTAL"))
}


#[cfg(test)]
mod tests {
    use super::test_support::{grid, n, s};
    use super::*;

    #[test]
    fn test_to_number_coercion() {
        assert_eq!(to_number(&Data::Float(250.5)), 250.5);
        assert_eq!(to_number(&Data::Int(12)), 12.0);
        assert_eq!(to_number(&Data::Bool(true)), 1.0);
        assert_eq!(to_number(&s(" 42 ")), 42.0);
        assert_eq!(to_number(&s("n/a")), 0.0);
        assert_eq!(to_number(&s("")), 0.0);
        assert_eq!(to_number(&s("inf")), 0.0);
        assert_eq!(to_number(&Data::Empty), 0.0);
    }

    #[test]
    fn test_to_text_coercion() {
        assert_eq!(to_text(&s("  G-01 ")), Some("G-01".to_string()));
        assert_eq!(to_text(&s("   ")), None);
        assert_eq!(to_text(&Data::Float(101.0)), Some("101".to_string()));
        assert_eq!(to_text(&Data::Float(1.5)), Some("1.5".to_string()));
        assert_eq!(to_text(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(to_text(&Data::Empty), None);
    }

    #[test]
    fn test_total_marker_is_case_insensitive() {
        assert!(is_total_marker(&s("TOTAL")));
        assert!(is_total_marker(&s("Total ")));
        assert!(!is_total_marker(&s("Totals")));
        assert!(!is_total_marker(&n(1.0)));
    }

    #[test]
    fn test_grid_uses_absolute_positions() {
        // Used range starts at B3; column A and rows 0-1 are outside it.
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), s("Unit"));
        range.set_value((3, 2), n(250.0));

        let grid = SheetGrid::new(&range);
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.column_count(), 3);
        assert!(grid.text_equals(2, 1, "Unit"));
        assert_eq!(grid.number(3, 2), 250.0);
        assert!(grid.is_blank(0, 0));
        assert!(grid.is_blank(50, 50));
    }

    #[test]
    fn test_text_or_default() {
        let range = grid(vec![vec![s("A"), Data::Empty]]);
        let grid = SheetGrid::new(&range);
        assert_eq!(grid.text_or(0, 0, "—"), "A");
        assert_eq!(grid.text_or(0, 1, "—"), "—");
    }
}
