//! Built-in demonstration report used when nothing has been uploaded yet.
use std::collections::BTreeMap;

use crate::report::models::{
    OccupancyStatus, ParsedReport, PayerCategory, PayerTotals, PaymentHistoryRow, PeriodPayment,
    PeriodSummary, SummarySeries, Tenant, VacancySnapshot,
};
use crate::report::status::{HistoryMark, PaymentStatus};

fn period(
    label: &str,
    totals: (f64, f64, f64),
    collection_rate: f64,
    units_paid: &str,
    unpaid_prev: f64,
    mpire: (f64, f64, f64),
    owner: (f64, f64, f64),
) -> PeriodSummary {
    let split = |(due, collected, outstanding): (f64, f64, f64)| PayerTotals {
        due,
        collected,
        outstanding,
    };
    PeriodSummary {
        label: label.to_string(),
        total_due: totals.0,
        total_collected: totals.1,
        total_outstanding: totals.2,
        collection_rate,
        units_paid: units_paid.to_string(),
        unpaid_prev,
        mpire: split(mpire),
        owner: split(owner),
    }
}

fn tenant(id: i64, unit: &str, name: &str, gateway: &str, paid_to: PayerCategory) -> Tenant {
    Tenant {
        id,
        unit: unit.to_string(),
        name: name.to_string(),
        rent: 250.0,
        gateway: gateway.to_string(),
        paid_to,
        status: OccupancyStatus::Active,
    }
}

fn payment(
    unit: &str,
    tenant: &str,
    paid: f64,
    status: PaymentStatus,
    paid_to: PayerCategory,
    days_late: f64,
    prev_balance: f64,
) -> PeriodPayment {
    PeriodPayment {
        unit: unit.to_string(),
        tenant: tenant.to_string(),
        due: 250.0,
        paid,
        balance: 250.0 - paid,
        status,
        paid_to,
        days_late,
        prev_balance,
    }
}

fn history(unit: &str, tenant: &str, marks: [HistoryMark; 2], times_late: u32, avg: f64) -> PaymentHistoryRow {
    PaymentHistoryRow {
        unit: unit.to_string(),
        tenant: tenant.to_string(),
        history: marks.to_vec(),
        times_late,
        avg_days_late: avg,
    }
}

/// Two periods, three tenants: one paid, one partial, one pending and at risk.
pub fn sample_report() -> ParsedReport {
    let dashboard = SummarySeries::new(vec![
        period(
            "JANUARY 26",
            (12500.0, 11200.0, 1300.0),
            0.896,
            "44/50",
            800.0,
            (7500.0, 7100.0, 400.0),
            (5000.0, 4100.0, 900.0),
        ),
        period(
            "FEBRUARY 26",
            (12500.0, 10800.0, 1700.0),
            0.864,
            "42/50",
            1300.0,
            (7500.0, 6800.0, 700.0),
            (5000.0, 4000.0, 1000.0),
        ),
    ]);

    let mut monthly_sheets = BTreeMap::new();
    monthly_sheets.insert(
        "FEBRUARY 26".to_string(),
        vec![
            payment("G-01", "Ahmed Al-Rashid", 250.0, PaymentStatus::Paid, PayerCategory::Mpire, 0.0, 0.0),
            payment("G-02", "Fatima Hassan", 100.0, PaymentStatus::Partial, PayerCategory::Mpire, 5.0, 0.0),
            payment("1-01", "Omar Khalil", 0.0, PaymentStatus::Pending, PayerCategory::Owner, 12.0, 200.0),
        ],
    );

    ParsedReport {
        months: dashboard.labels(),
        dashboard: Some(dashboard),
        tenants: vec![
            tenant(1, "G-01", "Ahmed Al-Rashid", "Bank Transfer", PayerCategory::Mpire),
            tenant(2, "G-02", "Fatima Hassan", "Bank Transfer", PayerCategory::Mpire),
            tenant(3, "1-01", "Omar Khalil", "Cash", PayerCategory::Owner),
        ],
        monthly_sheets,
        payment_history: vec![
            history("G-01", "Ahmed Al-Rashid", [HistoryMark::Paid, HistoryMark::Paid], 0, 0.0),
            history("G-02", "Fatima Hassan", [HistoryMark::Paid, HistoryMark::Partial], 1, 5.0),
            history("1-01", "Omar Khalil", [HistoryMark::Pending, HistoryMark::Pending], 2, 15.0),
        ],
        vacancy: Some(VacancySnapshot {
            total_units: 50,
            vacant: 2,
            occupancy: 0.96,
        }),
    }
}
