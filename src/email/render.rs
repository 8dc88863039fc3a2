use std::fmt::Write;

use crate::email::digest::ReportDigest;
use crate::report::{PaymentStatus, PayerTotals};
use crate::utils::{escape_html, format_amount, format_percent};

pub const SAMPLE_SUBJECT_PREFIX: &str = "[SAMPLE DATA] ";

/// `"Weekly Rent Report — FEBRUARY 26 · Feb 10"`, prefixed for sample data.
pub fn subject(digest: &ReportDigest, sample: bool) -> String {
    let prefix = if sample { SAMPLE_SUBJECT_PREFIX } else { "" };
    format!(
        "{}Weekly Rent Report — {} · {}",
        prefix,
        digest.period,
        digest.generated_on.format("%b %-d")
    )
}

fn status_label(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Partial => "◐ Partial",
        _ => "✗ Pending",
    }
}

fn generated_line(digest: &ReportDigest) -> String {
    format!(
        "{} · {} Units · Generated {}",
        digest.period,
        digest.total_units,
        digest.generated_on.format("%A, %B %-d, %Y")
    )
}

/// Condensed HTML body.
pub fn render_html(digest: &ReportDigest) -> String {
    let s = &digest.summary;
    let mut html = String::new();

    // write! into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"/></head>\n<body>\n\
         <h1>Weekly Rent Report</h1>\n<p>{}</p>\n",
        escape_html(&generated_line(digest))
    );

    let _ = write!(
        html,
        "<table>\n\
         <tr><td>Rent Due</td><td>{} OMR</td></tr>\n\
         <tr><td>Collected</td><td>{} OMR</td></tr>\n\
         <tr><td>Outstanding</td><td>{} OMR</td></tr>\n\
         <tr><td>Collection Rate</td><td style=\"color:{}\">{}</td></tr>\n\
         </table>\n",
        format_amount(s.total_due),
        format_amount(s.total_collected),
        format_amount(s.total_outstanding),
        digest.rate_band.color(),
        format_percent(s.collection_rate)
    );

    html.push_str(
        "<h2>Breakdown</h2>\n<table>\n\
         <tr><th></th><th>Due</th><th>Collected</th><th>Outstanding</th></tr>\n",
    );
    for (payer, totals) in [("MPIRE", &s.mpire), ("OWNER", &s.owner)] {
        let _ = writeln!(html, "{}", breakdown_row(payer, totals));
    }
    html.push_str("</table>\n");

    if !digest.unpaid.is_empty() {
        let sheet = digest.unpaid_sheet.as_deref().unwrap_or(&digest.period);
        let _ = write!(
            html,
            "<h2>⚠ Unpaid / Partial — {} ({})</h2>\n<table>\n\
             <tr><th>Unit</th><th>Tenant</th><th>Balance</th><th>Status</th></tr>\n",
            escape_html(sheet),
            digest.unpaid.len()
        );
        for row in &digest.unpaid {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.unit),
                escape_html(&row.tenant),
                format_amount(row.balance),
                status_label(&row.status)
            );
        }
        html.push_str("</table>\n");
    }

    if !digest.at_risk.is_empty() {
        html.push_str("<h2>🔴 At-Risk Tenants (2+ Late)</h2>\n<ul>\n");
        for row in &digest.at_risk {
            let _ = write!(html, "<li>Unit {}", escape_html(&row.unit));
            if !row.tenant.is_empty() {
                let _ = write!(html, " — {}", escape_html(&row.tenant));
            }
            let _ = write!(html, ": {}x late", row.times_late);
            if row.avg_days_late > 0.0 {
                let _ = write!(html, ", avg {}d late", format_amount(row.avg_days_late));
            }
            html.push_str("</li>\n");
        }
        html.push_str("</ul>\n");
    }

    html.push_str(
        "<p>MPIRE Property Management · Muscat, Oman<br/>\
         This is an automated weekly report from your rent dashboard.</p>\n\
         </body>\n</html>\n",
    );
    html
}

fn breakdown_row(payer: &str, totals: &PayerTotals) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        payer,
        format_amount(totals.due),
        format_amount(totals.collected),
        format_amount(totals.outstanding)
    )
}

/// Plain-text alternative body.
pub fn render_text(digest: &ReportDigest) -> String {
    let s = &digest.summary;
    let mut text = String::new();

    let _ = writeln!(text, "Weekly Rent Report");
    let _ = writeln!(text, "{}", generated_line(digest));
    let _ = writeln!(text);
    let _ = writeln!(text, "Rent Due:        {} OMR", format_amount(s.total_due));
    let _ = writeln!(text, "Collected:       {} OMR", format_amount(s.total_collected));
    let _ = writeln!(text, "Outstanding:     {} OMR", format_amount(s.total_outstanding));
    let _ = writeln!(
        text,
        "Collection Rate: {} ({})",
        format_percent(s.collection_rate),
        digest.rate_band.label()
    );
    let _ = writeln!(text);
    for (payer, totals) in [("MPIRE", &s.mpire), ("OWNER", &s.owner)] {
        let _ = writeln!(
            text,
            "{payer}: due {}, collected {}, outstanding {}",
            format_amount(totals.due),
            format_amount(totals.collected),
            format_amount(totals.outstanding)
        );
    }

    if !digest.unpaid.is_empty() {
        let sheet = digest.unpaid_sheet.as_deref().unwrap_or(&digest.period);
        let _ = writeln!(text);
        let _ = writeln!(text, "Unpaid / Partial — {} ({})", sheet, digest.unpaid.len());
        for row in &digest.unpaid {
            let _ = writeln!(
                text,
                "  {} {}: {} ({})",
                row.unit,
                row.tenant,
                format_amount(row.balance),
                status_label(&row.status)
            );
        }
    }

    if !digest.at_risk.is_empty() {
        let _ = writeln!(text);
        let _ = writeln!(text, "At-Risk Tenants (2+ Late)");
        for row in &digest.at_risk {
            let _ = writeln!(
                text,
                "  Unit {} {}: {}x late, avg {}d",
                row.unit,
                row.tenant,
                row.times_late,
                format_amount(row.avg_days_late)
            );
        }
    }

    text
}
