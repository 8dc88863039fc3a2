pub mod report_service;

pub use report_service::{DataSource, DeliverySettings, ReportService, ReportServiceError, SendOutcome};
