use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{info, instrument, warn};

use crate::email::{
    render_html, render_text, subject, DigestError, EmailMessage, EmailProvider, ProviderError,
    ReportDigest,
};
use crate::report::{
    sample_report, NormalizeError, Normalized, ParsedReport, ValidationError, WorkbookNormalizer,
};
use crate::storage::{ReportStore, StoreError};
use crate::utils::parse_recipients;

#[derive(Error, Debug)]
pub enum ReportServiceError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to access stored report: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error("Send failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("No dashboard data found. Upload an Excel file first.")]
    NoData,

    #[error("RESEND_API_KEY not configured")]
    MailerNotConfigured,

    #[error("REPORT_EMAIL_TO not configured")]
    RecipientsNotConfigured,

    #[error("Invalid email address")]
    InvalidRecipient,

    #[error("Background task failed: {0}")]
    Task(#[from] JoinError),
}

/// Sender and default recipients for report emails.
#[derive(Debug, Clone, Default)]
pub struct DeliverySettings {
    pub from: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub sent_to: Vec<String>,
    pub period: String,
    pub id: String,
    pub data_source: DataSource,
}

/// Upload, storage and email delivery of the current rent report.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    mailer: Option<Arc<dyn EmailProvider>>,
    normalizer: Arc<WorkbookNormalizer>,
    delivery: DeliverySettings,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        mailer: Option<Arc<dyn EmailProvider>>,
        delivery: DeliverySettings,
    ) -> Result<Self, ReportServiceError> {
        Ok(Self {
            store,
            mailer,
            normalizer: Arc::new(WorkbookNormalizer::new()?),
            delivery,
        })
    }

    /// Normalize uploaded workbook bytes, validate the result and store it.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn upload_workbook(&self, bytes: Vec<u8>) -> Result<Normalized, ReportServiceError> {
        let normalizer = Arc::clone(&self.normalizer);
        let normalized =
            tokio::task::spawn_blocking(move || normalizer.normalize_bytes(&bytes)).await??;

        self.save_report(&normalized.report).await?;
        info!(
            "Stored uploaded report: {} periods, {} tenants",
            normalized.report.months.len(),
            normalized.report.tenants.len()
        );
        Ok(normalized)
    }

    /// Validate and store an already-normalized report.
    pub async fn save_report(&self, report: &ParsedReport) -> Result<(), ReportServiceError> {
        report.validate()?;
        self.store.save(report).await?;
        Ok(())
    }

    pub async fn current_report(&self) -> Result<Option<ParsedReport>, ReportServiceError> {
        Ok(self.store.load().await?)
    }

    /// Remove the stored report. Returns whether there was one.
    pub async fn clear(&self) -> Result<bool, ReportServiceError> {
        Ok(self.store.delete().await?)
    }

    /// Email the digest of the stored report to the configured recipients.
    #[instrument(skip(self))]
    pub async fn send_weekly_report(&self, today: NaiveDate) -> Result<SendOutcome, ReportServiceError> {
        let report = self
            .store
            .load()
            .await?
            .ok_or(ReportServiceError::NoData)?;
        let digest = ReportDigest::build(&report, today)?;

        let mailer = self.mailer()?;
        if self.delivery.recipients.is_empty() {
            return Err(ReportServiceError::RecipientsNotConfigured);
        }

        self.deliver(
            mailer,
            &digest,
            self.delivery.recipients.clone(),
            DataSource::Live,
        )
        .await
    }

    /// Email the digest to `to`, using the built-in sample report when nothing
    /// usable is stored.
    #[instrument(skip(self))]
    pub async fn send_test_email(&self, to: &str, today: NaiveDate) -> Result<SendOutcome, ReportServiceError> {
        let recipients = parse_recipients(to);
        if recipients.is_empty() || !to.contains('@') {
            return Err(ReportServiceError::InvalidRecipient);
        }
        let mailer = self.mailer()?;

        let (report, source) = match self.store.load().await {
            Ok(Some(report)) if report.dashboard.is_some() => (report, DataSource::Live),
            Ok(_) => (sample_report(), DataSource::Sample),
            Err(e) => {
                warn!("Could not read stored report, using sample data: {}", e);
                (sample_report(), DataSource::Sample)
            }
        };

        let digest = ReportDigest::build(&report, today)?;
        self.deliver(mailer, &digest, recipients, source).await
    }

    fn mailer(&self) -> Result<&Arc<dyn EmailProvider>, ReportServiceError> {
        self.mailer
            .as_ref()
            .ok_or(ReportServiceError::MailerNotConfigured)
    }

    async fn deliver(
        &self,
        mailer: &Arc<dyn EmailProvider>,
        digest: &ReportDigest,
        recipients: Vec<String>,
        source: DataSource,
    ) -> Result<SendOutcome, ReportServiceError> {
        let message = EmailMessage {
            from: self.delivery.from.clone(),
            to: recipients,
            subject: subject(digest, source == DataSource::Sample),
            html: render_html(digest),
            text: render_text(digest),
        };

        let receipt = mailer.send(&message).await?;
        info!(
            "Sent {} report for {} to {} recipient(s)",
            if source == DataSource::Sample { "sample" } else { "weekly" },
            digest.period,
            message.to.len()
        );

        Ok(SendOutcome {
            sent_to: message.to,
            period: digest.period.clone(),
            id: receipt.id,
            data_source: source,
        })
    }
}
