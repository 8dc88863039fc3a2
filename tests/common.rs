// Shared fixtures for integration tests
// Builds rent collection workbooks in memory with rust_xlsxwriter
#![allow(dead_code)]

use rust_xlsxwriter::Workbook as XlsxWorkbook;

#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

pub fn t(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

pub fn n(value: f64) -> Cell {
    Cell::Number(value)
}

/// One summary column: label plus the twelve metric values in sheet row order.
pub struct SummaryColumn {
    pub label: &'static str,
    pub total_due: f64,
    pub total_collected: f64,
    pub total_outstanding: f64,
    pub collection_rate: f64,
    pub units_paid: &'static str,
}

/// Payment row for a per-period sheet.
pub struct PaymentRow {
    pub unit: &'static str,
    pub tenant: &'static str,
    pub due: f64,
    pub paid: f64,
    pub balance: f64,
    pub status: &'static str,
    pub paid_to: &'static str,
}

#[derive(Default)]
pub struct WorkbookFixture {
    sheets: Vec<(String, Vec<Vec<Cell>>)>,
}

impl WorkbookFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push((name.to_string(), rows));
        self
    }

    /// DASHBOARD sheet with a title row above the "Metric" header.
    pub fn summary(self, columns: &[SummaryColumn]) -> Self {
        let mut header = vec![t("Metric")];
        header.extend(columns.iter().map(|c| t(c.label)));

        let rows = vec![
            vec![t("MPIRE Rent Collection Dashboard")],
            header,
            metric_row(columns, "Total Rent Due (OMR)", |c| n(c.total_due)),
            metric_row(columns, "Total Collected (OMR)", |c| n(c.total_collected)),
            metric_row(columns, "Total Outstanding (OMR)", |c| n(c.total_outstanding)),
            metric_row(columns, "Collection Rate", |c| n(c.collection_rate)),
            metric_row(columns, "Units Paid / Total", |c| t(c.units_paid)),
        ];
        self.sheet("DASHBOARD", rows)
    }

    /// Tenant Master sheet from (id, unit, name, rent, paid_to, status) rows.
    pub fn roster(self, tenants: &[(f64, &str, &str, f64, &str, &str)]) -> Self {
        let mut rows = vec![vec![
            t("#"),
            t("Unit"),
            t("Tenant"),
            t("Phone"),
            t("Rent"),
            t("Start"),
            t("End"),
            t("Deposit"),
            t("Gateway"),
            t("Paid To"),
            t("Status"),
        ]];
        for (id, unit, name, rent, paid_to, status) in tenants {
            rows.push(vec![
                n(*id),
                t(unit),
                t(name),
                Cell::Empty,
                n(*rent),
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                t("Bank"),
                t(paid_to),
                t(status),
            ]);
        }
        self.sheet("Tenant Master", rows)
    }

    pub fn period_sheet(self, name: &str, payments: &[PaymentRow]) -> Self {
        let mut rows = vec![period_header()];
        rows.extend(payments.iter().map(payment_cells));
        self.sheet(name, rows)
    }

    pub fn vacancy(self, total: f64, vacant: f64, occupancy: f64) -> Self {
        let rows = vec![
            vec![t("Vacancy Tracker")],
            vec![
                t("Total Units:"),
                n(total),
                Cell::Empty,
                t("Currently Vacant:"),
                n(vacant),
                Cell::Empty,
                t("Occupancy Rate:"),
                n(occupancy),
            ],
        ];
        self.sheet("Vacancy Tracker", rows)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut workbook = XlsxWorkbook::new();
        for (name, rows) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).expect("valid sheet name");
            for (r, row) in rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let (r, c) = (r as u32, c as u16);
                    match cell {
                        Cell::Text(value) => {
                            worksheet.write_string(r, c, value).expect("write text");
                        }
                        Cell::Number(value) => {
                            worksheet.write_number(r, c, *value).expect("write number");
                        }
                        Cell::Empty => {}
                    }
                }
            }
        }
        workbook.save_to_buffer().expect("serialize workbook")
    }
}

fn metric_row(
    columns: &[SummaryColumn],
    label: &str,
    value: impl Fn(&SummaryColumn) -> Cell,
) -> Vec<Cell> {
    let mut row = vec![t(label)];
    row.extend(columns.iter().map(value));
    row
}

pub fn period_header() -> Vec<Cell> {
    vec![
        t("Unit"),
        t("Tenant"),
        t("Due"),
        t("Due Date"),
        t("Paid"),
        t("Balance"),
        t("Status"),
        t("Paid Date"),
        t("Method"),
        t("Paid To"),
        t("Days Late"),
        t("Prev Balance"),
    ]
}

pub fn payment_cells(p: &PaymentRow) -> Vec<Cell> {
    vec![
        t(p.unit),
        t(p.tenant),
        n(p.due),
        Cell::Empty,
        n(p.paid),
        n(p.balance),
        t(p.status),
        Cell::Empty,
        Cell::Empty,
        t(p.paid_to),
        n(0.0),
        n(0.0),
    ]
}

pub fn january_summary() -> SummaryColumn {
    SummaryColumn {
        label: "JANUARY 26",
        total_due: 750.0,
        total_collected: 600.0,
        total_outstanding: 150.0,
        collection_rate: 0.8,
        units_paid: "2/3",
    }
}

pub fn standard_roster() -> Vec<(f64, &'static str, &'static str, f64, &'static str, &'static str)> {
    vec![
        (1.0, "A-101", "Ahmed Al Balushi", 250.0, "MPIRE", "Active"),
        (2.0, "A-102", "Fatma Al Hinai", 250.0, "OWNER", "Active"),
        (3.0, "A-103", "Salim Al Rawahi", 250.0, "MPIRE", "Active"),
    ]
}

/// Scenario fixture: summary declares January only, February exists as a sheet.
pub fn february_rows() -> Vec<PaymentRow> {
    vec![
        PaymentRow {
            unit: "A-101",
            tenant: "Ahmed Al Balushi",
            due: 250.0,
            paid: 250.0,
            balance: 0.0,
            status: "Paid",
            paid_to: "MPIRE",
        },
        PaymentRow {
            unit: "A-102",
            tenant: "Fatma Al Hinai",
            due: 250.0,
            paid: 100.0,
            balance: 150.0,
            status: "Partially Paid — balance owed",
            paid_to: "OWNER",
        },
    ]
}

/// A complete, valid workbook.
pub fn complete_workbook() -> WorkbookFixture {
    WorkbookFixture::new()
        .summary(&[january_summary()])
        .roster(&standard_roster())
        .period_sheet("FEBRUARY 26", &february_rows())
        .vacancy(50.0, 2.0, 0.96)
}
