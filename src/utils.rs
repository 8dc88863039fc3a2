/// Shared formatting helpers for the report digest
///
/// Format an amount the way en-US locales print numbers: thousands separators and
/// at most three fraction digits, trailing zeros dropped.
///
/// # Examples
///
/// ```
/// use rent_report_service::utils::format_amount;
///
/// assert_eq!(format_amount(12500.0), "12,500");
/// assert_eq!(format_amount(1234567.891), "1,234,567.891");
/// assert_eq!(format_amount(0.8964), "0.896");
/// assert_eq!(format_amount(-1300.5), "-1,300.5");
/// ```
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let rounded = format!("{:.3}", value.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && (whole != "0" || !fraction.is_empty());
    let sign = if negative { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Format a fraction in [0, 1] as a one-decimal percentage ("89.6%").
pub fn format_percent(rate: f64) -> String {
    let rate = if rate.is_finite() { rate } else { 0.0 };
    format!("{:.1}%", rate * 100.0)
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Split a comma separated recipient list, dropping empty entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
