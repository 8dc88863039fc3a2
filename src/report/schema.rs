//! Column schemas for each sheet kind of the rent collection workbook.
//!
//! Every field the extractor reads is looked up here by name; nothing downstream
//! hard-codes a column offset.
use std::fmt;

use crate::report::cells::SheetGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Summary,
    Roster,
    PaymentHistory,
    PeriodPayments,
    Vacancy,
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SheetKind::Summary => "summary",
            SheetKind::Roster => "tenant roster",
            SheetKind::PaymentHistory => "payment history",
            SheetKind::PeriodPayments => "period payments",
            SheetKind::Vacancy => "vacancy",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Unit,
    Name,
    Tenant,
    Rent,
    Gateway,
    PaidTo,
    Status,
    Due,
    Paid,
    Balance,
    DaysLate,
    PrevBalance,
    /// First of the per-period history columns.
    HistoryStart,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Id => "id",
            Field::Unit => "unit",
            Field::Name => "name",
            Field::Tenant => "tenant",
            Field::Rent => "rent",
            Field::Gateway => "gateway",
            Field::PaidTo => "paid to",
            Field::Status => "status",
            Field::Due => "due",
            Field::Paid => "paid",
            Field::Balance => "balance",
            Field::DaysLate => "days late",
            Field::PrevBalance => "previous balance",
            Field::HistoryStart => "history",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: Field,
    pub index: usize,
    /// Whether the header row is expected to label this column.
    pub required: bool,
}

const fn col(field: Field, index: usize, required: bool) -> ColumnSpec {
    ColumnSpec {
        field,
        index,
        required,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSchema {
    pub kind: SheetKind,
    /// Exact text of the first header cell.
    pub marker: &'static str,
    pub columns: &'static [ColumnSpec],
}

pub const SUMMARY_SCHEMA: SheetSchema = SheetSchema {
    kind: SheetKind::Summary,
    marker: "Metric",
    columns: &[],
};

pub const ROSTER_SCHEMA: SheetSchema = SheetSchema {
    kind: SheetKind::Roster,
    marker: "#",
    columns: &[
        col(Field::Id, 0, true),
        col(Field::Unit, 1, true),
        col(Field::Name, 2, true),
        col(Field::Rent, 4, true),
        col(Field::Gateway, 8, false),
        col(Field::PaidTo, 9, true),
        col(Field::Status, 10, false),
    ],
};

pub const PAYMENT_HISTORY_SCHEMA: SheetSchema = SheetSchema {
    kind: SheetKind::PaymentHistory,
    marker: "Unit",
    columns: &[
        col(Field::Unit, 0, true),
        col(Field::Tenant, 1, false),
        col(Field::HistoryStart, 2, false),
    ],
};

pub const PERIOD_PAYMENTS_SCHEMA: SheetSchema = SheetSchema {
    kind: SheetKind::PeriodPayments,
    marker: "Unit",
    columns: &[
        col(Field::Unit, 0, true),
        col(Field::Tenant, 1, true),
        col(Field::Due, 2, true),
        col(Field::Paid, 4, true),
        col(Field::Balance, 5, true),
        col(Field::Status, 6, true),
        col(Field::PaidTo, 9, true),
        col(Field::DaysLate, 10, false),
        col(Field::PrevBalance, 11, false),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{kind} schema has no column for field '{field}'")]
    MissingColumn { kind: SheetKind, field: Field },
}

impl SheetSchema {
    pub fn column(&self, field: Field) -> Result<usize, SchemaError> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.index)
            .ok_or(SchemaError::MissingColumn {
                kind: self.kind,
                field,
            })
    }

    /// Required columns whose header cell is empty.
    pub fn unlabeled_columns(&self, grid: &SheetGrid<'_>, header_row: usize) -> Vec<ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.required && grid.is_blank(header_row, c.index))
            .copied()
            .collect()
    }
}

/// Resolved roster column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterColumns {
    pub id: usize,
    pub unit: usize,
    pub name: usize,
    pub rent: usize,
    pub gateway: usize,
    pub paid_to: usize,
    pub status: usize,
}

impl RosterColumns {
    pub fn resolve(schema: &SheetSchema) -> Result<Self, SchemaError> {
        Ok(Self {
            id: schema.column(Field::Id)?,
            unit: schema.column(Field::Unit)?,
            name: schema.column(Field::Name)?,
            rent: schema.column(Field::Rent)?,
            gateway: schema.column(Field::Gateway)?,
            paid_to: schema.column(Field::PaidTo)?,
            status: schema.column(Field::Status)?,
        })
    }
}

/// Resolved payment-history column positions.
///
/// The rollup columns follow the per-period columns, so they depend on how many
/// periods the summary declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryColumns {
    pub unit: usize,
    pub tenant: usize,
    pub history_start: usize,
}

impl HistoryColumns {
    pub fn resolve(schema: &SheetSchema) -> Result<Self, SchemaError> {
        Ok(Self {
            unit: schema.column(Field::Unit)?,
            tenant: schema.column(Field::Tenant)?,
            history_start: schema.column(Field::HistoryStart)?,
        })
    }

    pub fn times_late(&self, period_count: usize) -> usize {
        self.history_start + period_count
    }

    pub fn avg_days_late(&self, period_count: usize) -> usize {
        self.history_start + period_count + 1
    }
}

/// Resolved per-period sheet column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodColumns {
    pub unit: usize,
    pub tenant: usize,
    pub due: usize,
    pub paid: usize,
    pub balance: usize,
    pub status: usize,
    pub paid_to: usize,
    pub days_late: usize,
    pub prev_balance: usize,
}

impl PeriodColumns {
    pub fn resolve(schema: &SheetSchema) -> Result<Self, SchemaError> {
        Ok(Self {
            unit: schema.column(Field::Unit)?,
            tenant: schema.column(Field::Tenant)?,
            due: schema.column(Field::Due)?,
            paid: schema.column(Field::Paid)?,
            balance: schema.column(Field::Balance)?,
            status: schema.column(Field::Status)?,
            paid_to: schema.column(Field::PaidTo)?,
            days_late: schema.column(Field::DaysLate)?,
            prev_balance: schema.column(Field::PrevBalance)?,
        })
    }
}

/// Metric rows of the summary sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryMetric {
    TotalDue,
    TotalCollected,
    TotalOutstanding,
    CollectionRate,
    UnitsPaid,
    UnpaidPrev,
    MpireDue,
    MpireCollected,
    MpireOutstanding,
    OwnerDue,
    OwnerCollected,
    OwnerOutstanding,
}

/// Summary sheet row labels (column A, exact match).
pub const SUMMARY_ROW_LABELS: [(&str, SummaryMetric); 12] = [
    ("Total Rent Due (OMR)", SummaryMetric::TotalDue),
    ("Total Collected (OMR)", SummaryMetric::TotalCollected),
    ("Total Outstanding (OMR)", SummaryMetric::TotalOutstanding),
    ("Collection Rate", SummaryMetric::CollectionRate),
    ("Units Paid / Total", SummaryMetric::UnitsPaid),
    ("Unpaid from Prev. Month", SummaryMetric::UnpaidPrev),
    ("MPIRE Rent Due", SummaryMetric::MpireDue),
    ("MPIRE Collected", SummaryMetric::MpireCollected),
    ("MPIRE Outstanding", SummaryMetric::MpireOutstanding),
    ("OWNER Rent Due", SummaryMetric::OwnerDue),
    ("OWNER Collected", SummaryMetric::OwnerCollected),
    ("OWNER Outstanding", SummaryMetric::OwnerOutstanding),
];

pub fn summary_metric_for(label: &str) -> Option<SummaryMetric> {
    SUMMARY_ROW_LABELS
        .iter()
        .find(|(text, _)| *text == label)
        .map(|(_, metric)| *metric)
}

/// A labelled value cell on the vacancy sheet; the value sits one column right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelledCell {
    pub label: &'static str,
    pub column: usize,
}

impl LabelledCell {
    pub fn value_column(&self) -> usize {
        self.column + 1
    }
}

pub const VACANCY_TOTAL_UNITS: LabelledCell = LabelledCell {
    label: "Total Units:",
    column: 0,
};

pub const VACANCY_CURRENTLY_VACANT: LabelledCell = LabelledCell {
    label: "Currently Vacant:",
    column: 3,
};

pub const VACANCY_OCCUPANCY_RATE: LabelledCell = LabelledCell {
    label: "Occupancy Rate:",
    column: 6,
};
