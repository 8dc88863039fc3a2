use calamine::{Data, DataType};
use clap::Parser;
use std::path::PathBuf;

use rent_report_service::report::cells::SheetGrid;
use rent_report_service::report::locator::{
    find_header_row, Workbook, PAYMENT_HISTORY_SHEET, ROSTER_SHEET, SUMMARY_SHEET,
};
use rent_report_service::report::period::is_period_sheet_name;
use rent_report_service::report::schema::{
    PAYMENT_HISTORY_SCHEMA, PERIOD_PAYMENTS_SCHEMA, ROSTER_SCHEMA, SUMMARY_SCHEMA,
};

#[derive(Parser)]
#[command(name = "examine-workbook")]
#[command(about = "Dump the layout of a rent collection workbook", long_about = None)]
struct Cli {
    /// Workbook file to examine
    file: PathBuf,

    /// Sheet to dump (defaults to the summary sheet)
    sheet: Option<String>,

    /// Number of rows to show
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Number of columns to show per row
    #[arg(long, default_value_t = 10)]
    columns: usize,
}

/// Header marker the normalizer looks for on a sheet, if it reads that sheet.
fn header_marker(sheet: &str) -> Option<&'static str> {
    match sheet {
        SUMMARY_SHEET => Some(SUMMARY_SCHEMA.marker),
        ROSTER_SHEET => Some(ROSTER_SCHEMA.marker),
        PAYMENT_HISTORY_SHEET => Some(PAYMENT_HISTORY_SCHEMA.marker),
        name if is_period_sheet_name(name) => Some(PERIOD_PAYMENTS_SCHEMA.marker),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("Opening workbook: {}", cli.file.display());
    let bytes = std::fs::read(&cli.file)?;
    let workbook = Workbook::from_bytes(&bytes)?;

    println!("\nSheet names:");
    for (i, name) in workbook.sheet_names().iter().enumerate() {
        let tag = if is_period_sheet_name(name) {
            " (period sheet)"
        } else {
            ""
        };
        println!("  {i}: {name}{tag}");
    }

    let sheet_name = cli.sheet.unwrap_or_else(|| SUMMARY_SHEET.to_string());

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let Some(range) = workbook.sheet(&sheet_name) else {
        return Err(format!("Sheet '{sheet_name}' not found").into());
    };
    let grid = SheetGrid::new(range);

    println!("Dimensions: {:?}", range.get_size());
    let header_row = header_marker(&sheet_name).and_then(|marker| {
        let row = find_header_row(&grid, marker);
        match row {
            Some(row) => println!("Header row ('{marker}'): {}", row + 1),
            None => println!("Header row ('{marker}'): not found"),
        }
        row
    });

    println!(
        "\nFirst {} rows (showing first {} columns):",
        cli.rows, cli.columns
    );
    println!("{}", "=".repeat(100));

    for line in format_rows(&grid, header_row, cli.rows, cli.columns) {
        println!("{line}");
    }

    Ok(())
}

/// Non-empty rows among the first `rows`, numbered from sheet row 1 (A1) and
/// prefixed with `*` on the header row.
fn format_rows(
    grid: &SheetGrid<'_>,
    header_row: Option<usize>,
    rows: usize,
    columns: usize,
) -> Vec<String> {
    (0..grid.row_count().min(rows))
        .filter(|&row| (0..grid.column_count()).any(|col| !grid.cell(row, col).is_empty()))
        .map(|row| {
            let marker = if header_row == Some(row) { '*' } else { ' ' };
            let cells: String = (0..columns)
                .map(|col| format_cell(grid.cell(row, col)))
                .collect();
            format!("{marker}Row {:3}: {}", row + 1, cells.trim_end())
        })
        .collect()
}

fn format_cell(cell: &Data) -> String {
    if cell.is_empty() {
        "[empty] ".to_string()
    } else {
        format!("[{cell}] ")
    }
}
