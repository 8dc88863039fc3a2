use clap::Parser;
use std::path::PathBuf;

use rent_report_service::report::WorkbookNormalizer;

#[derive(Parser)]
#[command(name = "normalize-report")]
#[command(about = "Normalize a rent collection workbook into report JSON", long_about = None)]
struct Cli {
    /// Workbook file (.xlsx, .xlsm, .xlsb, .xls or .ods)
    file: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Fail when the report is missing the summary or the tenant roster
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.file)?;
    let normalizer = WorkbookNormalizer::new()?;
    let normalized = normalizer.normalize_bytes(&bytes)?;

    for diagnostic in &normalized.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    if cli.validate {
        normalized.report.validate()?;
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&normalized.report)?
    } else {
        serde_json::to_string(&normalized.report)?
    };
    println!("{json}");

    Ok(())
}
