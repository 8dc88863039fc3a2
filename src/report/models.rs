use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::report::period::{compare_labels, label_key};
use crate::report::status::{HistoryMark, PaymentStatus};

/// Party entitled to a unit's rent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PayerCategory {
    Mpire,
    Owner,
    Other(String),
}

impl PayerCategory {
    pub fn as_str(&self) -> &str {
        match self {
            PayerCategory::Mpire => "MPIRE",
            PayerCategory::Owner => "OWNER",
            PayerCategory::Other(raw) => raw,
        }
    }
}

impl From<String> for PayerCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "MPIRE" => PayerCategory::Mpire,
            "OWNER" => PayerCategory::Owner,
            _ => PayerCategory::Other(value),
        }
    }
}

impl From<PayerCategory> for String {
    fn from(payer: PayerCategory) -> Self {
        match payer {
            PayerCategory::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OccupancyStatus {
    Active,
    Vacant,
    Other(String),
}

impl From<String> for OccupancyStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Active" => OccupancyStatus::Active,
            "Vacant" => OccupancyStatus::Vacant,
            _ => OccupancyStatus::Other(value),
        }
    }
}

impl From<OccupancyStatus> for String {
    fn from(status: OccupancyStatus) -> Self {
        match status {
            OccupancyStatus::Active => "Active".to_string(),
            OccupancyStatus::Vacant => "Vacant".to_string(),
            OccupancyStatus::Other(raw) => raw,
        }
    }
}

/// Due / collected / outstanding for one payer category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayerTotals {
    pub due: f64,
    pub collected: f64,
    pub outstanding: f64,
}

/// All summary metrics for a single billing period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSummary {
    pub label: String,
    pub total_due: f64,
    pub total_collected: f64,
    pub total_outstanding: f64,
    /// Fraction in [0, 1].
    pub collection_rate: f64,
    /// "paid/total" unit counts, kept as text.
    pub units_paid: String,
    pub unpaid_prev: f64,
    pub mpire: PayerTotals,
    pub owner: PayerTotals,
}

impl PeriodSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Chronological series of period summaries (the dashboard sheet).
///
/// Serialized as the parallel-array object the dashboard reads (`months`, `totalDue`,
/// ...); in memory it is one record per period so the metrics cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DashboardData", into = "DashboardData")]
pub struct SummarySeries {
    periods: Vec<PeriodSummary>,
}

impl SummarySeries {
    pub fn new(periods: Vec<PeriodSummary>) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &[PeriodSummary] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(|p| p.label.clone()).collect()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.find(label).is_some()
    }

    /// Case-insensitive lookup by period label.
    pub fn find(&self, label: &str) -> Option<&PeriodSummary> {
        let key = label_key(label);
        self.periods.iter().find(|p| label_key(&p.label) == key)
    }

    pub fn latest(&self) -> Option<&PeriodSummary> {
        self.periods.last()
    }

    pub fn push(&mut self, summary: PeriodSummary) {
        self.periods.push(summary);
    }

    /// Stable sort by (year, month index); unparseable labels go first.
    ///
    /// Returns the permutation applied: entry `i` is the index the period now at
    /// position `i` had before sorting.
    pub fn sort_chronologically(&mut self) -> Vec<usize> {
        let mut indexed: Vec<(usize, PeriodSummary)> =
            std::mem::take(&mut self.periods).into_iter().enumerate().collect();
        indexed.sort_by(|(_, a), (_, b)| compare_labels(&a.label, &b.label));

        let (order, periods): (Vec<usize>, Vec<PeriodSummary>) = indexed.into_iter().unzip();
        self.periods = periods;
        order
    }
}

/// Wire form of [`SummarySeries`]: twelve arrays aligned with `months`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub months: Vec<String>,
    pub total_due: Vec<f64>,
    pub total_collected: Vec<f64>,
    pub total_outstanding: Vec<f64>,
    pub collection_rate: Vec<f64>,
    pub units_paid: Vec<String>,
    pub unpaid_prev: Vec<f64>,
    pub mpire_due: Vec<f64>,
    pub mpire_collected: Vec<f64>,
    pub mpire_outstanding: Vec<f64>,
    pub owner_due: Vec<f64>,
    pub owner_collected: Vec<f64>,
    pub owner_outstanding: Vec<f64>,
}

impl From<SummarySeries> for DashboardData {
    fn from(series: SummarySeries) -> Self {
        let mut data = DashboardData::default();
        for p in series.periods {
            data.total_due.push(p.total_due);
            data.total_collected.push(p.total_collected);
            data.total_outstanding.push(p.total_outstanding);
            data.collection_rate.push(p.collection_rate);
            data.units_paid.push(p.units_paid);
            data.unpaid_prev.push(p.unpaid_prev);
            data.mpire_due.push(p.mpire.due);
            data.mpire_collected.push(p.mpire.collected);
            data.mpire_outstanding.push(p.mpire.outstanding);
            data.owner_due.push(p.owner.due);
            data.owner_collected.push(p.owner.collected);
            data.owner_outstanding.push(p.owner.outstanding);
            data.months.push(p.label);
        }
        data
    }
}

impl From<DashboardData> for SummarySeries {
    // Arrays shorter than `months` are padded with zeros / empty strings.
    fn from(data: DashboardData) -> Self {
        let at = |values: &[f64], i: usize| values.get(i).copied().unwrap_or(0.0);

        let periods = data
            .months
            .iter()
            .enumerate()
            .map(|(i, label)| PeriodSummary {
                label: label.clone(),
                total_due: at(&data.total_due, i),
                total_collected: at(&data.total_collected, i),
                total_outstanding: at(&data.total_outstanding, i),
                collection_rate: at(&data.collection_rate, i),
                units_paid: data.units_paid.get(i).cloned().unwrap_or_default(),
                unpaid_prev: at(&data.unpaid_prev, i),
                mpire: PayerTotals {
                    due: at(&data.mpire_due, i),
                    collected: at(&data.mpire_collected, i),
                    outstanding: at(&data.mpire_outstanding, i),
                },
                owner: PayerTotals {
                    due: at(&data.owner_due, i),
                    collected: at(&data.owner_collected, i),
                    outstanding: at(&data.owner_outstanding, i),
                },
            })
            .collect();

        SummarySeries { periods }
    }
}

/// One row of the tenant roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i64,
    pub unit: String,
    pub name: String,
    pub rent: f64,
    pub gateway: String,
    pub paid_to: PayerCategory,
    pub status: OccupancyStatus,
}

/// Per-unit payment history across the summary's periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryRow {
    pub unit: String,
    pub tenant: String,
    pub history: Vec<HistoryMark>,
    pub times_late: u32,
    pub avg_days_late: f64,
}

/// One unit's payment record in a per-period sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPayment {
    pub unit: String,
    pub tenant: String,
    pub due: f64,
    pub paid: f64,
    pub balance: f64,
    pub status: PaymentStatus,
    pub paid_to: PayerCategory,
    pub days_late: f64,
    pub prev_balance: f64,
}

pub const DEFAULT_TOTAL_UNITS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancySnapshot {
    pub total_units: u32,
    pub vacant: u32,
    pub occupancy: f64,
}

impl Default for VacancySnapshot {
    fn default() -> Self {
        Self {
            total_units: DEFAULT_TOTAL_UNITS,
            vacant: 0,
            occupancy: 0.0,
        }
    }
}

/// Normalized rent collection report: the only artifact stored and served.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReport {
    pub dashboard: Option<SummarySeries>,
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub monthly_sheets: BTreeMap<String, Vec<PeriodPayment>>,
    #[serde(default)]
    pub payment_history: Vec<PaymentHistoryRow>,
    #[serde(default)]
    pub vacancy: Option<VacancySnapshot>,
}

/// Preconditions a report must meet before it is accepted for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing DASHBOARD sheet")]
    MissingSummary,

    #[error("Missing Tenant Master data")]
    MissingTenants,
}

impl ParsedReport {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dashboard.is_none() {
            return Err(ValidationError::MissingSummary);
        }
        if self.tenants.is_empty() {
            return Err(ValidationError::MissingTenants);
        }
        Ok(())
    }

    /// Per-period sheet labels in chronological order.
    pub fn sheet_periods_chronological(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.monthly_sheets.keys().map(String::as_str).collect();
        labels.sort_by(|a, b| compare_labels(a, b));
        labels
    }

    /// Case-insensitive lookup of a per-period sheet.
    pub fn sheet_for(&self, label: &str) -> Option<(&str, &[PeriodPayment])> {
        let key = label_key(label);
        self.monthly_sheets
            .iter()
            .find(|(name, _)| label_key(name) == key)
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    /// Unit count for headlines: the vacancy snapshot, else the roster size.
    pub fn total_units(&self) -> u32 {
        self.vacancy
            .map(|v| v.total_units)
            .unwrap_or_else(|| u32::try_from(self.tenants.len()).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(label: &str, due: f64) -> PeriodSummary {
        PeriodSummary {
            total_due: due,
            units_paid: "1/2".to_string(),
            mpire: PayerTotals {
                due: due / 2.0,
                ..PayerTotals::default()
            },
            ..PeriodSummary::new(label)
        }
    }

    #[test]
    fn test_summary_series_serializes_as_parallel_arrays() {
        let series = SummarySeries::new(vec![summary("JANUARY 26", 500.0), summary("FEBRUARY 26", 750.0)]);
        let value = serde_json::to_value(&series).unwrap();

        assert_eq!(value["months"], json!(["JANUARY 26", "FEBRUARY 26"]));
        assert_eq!(value["totalDue"], json!([500.0, 750.0]));
        assert_eq!(value["mpireDue"], json!([250.0, 375.0]));
        assert_eq!(value["unitsPaid"], json!(["1/2", "1/2"]));

        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 13);
        for (name, array) in fields {
            assert_eq!(array.as_array().unwrap().len(), 2, "field {name}");
        }
    }

    #[test]
    fn test_summary_series_pads_short_arrays() {
        let series: SummarySeries = serde_json::from_value(json!({
            "months": ["JANUARY 26", "FEBRUARY 26"],
            "totalDue": [100.0],
        }))
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.periods()[0].total_due, 100.0);
        assert_eq!(series.periods()[1].total_due, 0.0);
        assert_eq!(series.periods()[1].units_paid, "");
    }

    #[test]
    fn test_sort_chronologically_keeps_records_together() {
        let mut series = SummarySeries::new(vec![
            summary("MARCH 26", 3.0),
            summary("JANUARY 26", 1.0),
            summary("DECEMBER 25", 12.0),
        ]);
        let order = series.sort_chronologically();

        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(series.labels(), vec!["DECEMBER 25", "JANUARY 26", "MARCH 26"]);
        let dues: Vec<f64> = series.periods().iter().map(|p| p.total_due).collect();
        assert_eq!(dues, vec![12.0, 1.0, 3.0]);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let series = SummarySeries::new(vec![summary("January 26", 1.0)]);
        assert!(series.contains_label("JANUARY 26"));
        assert!(!series.contains_label("FEBRUARY 26"));
    }

    #[test]
    fn test_validate_preconditions() {
        let mut report = ParsedReport::default();
        assert_eq!(report.validate(), Err(ValidationError::MissingSummary));

        report.dashboard = Some(SummarySeries::default());
        assert_eq!(report.validate(), Err(ValidationError::MissingTenants));

        report.tenants.push(Tenant {
            id: 1,
            unit: "G-01".to_string(),
            name: "Test".to_string(),
            rent: 250.0,
            gateway: "Cash".to_string(),
            paid_to: PayerCategory::Mpire,
            status: OccupancyStatus::Active,
        });
        assert_eq!(report.validate(), Ok(()));
        assert_eq!(
            ValidationError::MissingTenants.to_string(),
            "Missing Tenant Master data"
        );
    }

    #[test]
    fn test_parsed_report_field_names() {
        let report = ParsedReport {
            vacancy: Some(VacancySnapshot::default()),
            ..ParsedReport::default()
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["dashboard"], serde_json::Value::Null);
        assert!(value["monthlySheets"].is_object());
        assert!(value["paymentHistory"].is_array());
        assert_eq!(
            value["vacancy"],
            json!({ "totalUnits": 50, "vacant": 0, "occupancy": 0.0 })
        );
    }

    #[test]
    fn test_total_units_prefers_vacancy_snapshot() {
        let mut report = ParsedReport::default();
        assert_eq!(report.total_units(), 0);

        report.vacancy = Some(VacancySnapshot {
            total_units: 48,
            vacant: 2,
            occupancy: 0.96,
        });
        assert_eq!(report.total_units(), 48);
    }
}
