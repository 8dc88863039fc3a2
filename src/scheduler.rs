use chrono::Utc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::services::{ReportService, ReportServiceError};

/// Longest supported send interval (one leap year).
pub const MAX_INTERVAL_HOURS: u64 = 24 * 366;

/// Tick period for `interval_hours`, clamped to 1..=[`MAX_INTERVAL_HOURS`].
pub fn interval_period(interval_hours: u64) -> Duration {
    Duration::from_secs(interval_hours.clamp(1, MAX_INTERVAL_HOURS) * 60 * 60)
}

/// Send the weekly digest every `interval_hours`, starting one interval from now.
#[instrument(skip(report_service), fields(interval_hours = %interval_hours))]
pub async fn start_report_scheduler(report_service: ReportService, interval_hours: u64) {
    if interval_hours > MAX_INTERVAL_HOURS {
        warn!(
            "Report interval of {} hours exceeds {}; using the maximum",
            interval_hours, MAX_INTERVAL_HOURS
        );
    }
    let period = interval_period(interval_hours);
    let mut interval = time::interval_at(Instant::now() + period, period);

    info!("Report scheduler started with {} hour interval", interval_hours);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - sending weekly report");

        match report_service
            .send_weekly_report(Utc::now().date_naive())
            .await
        {
            Ok(outcome) => {
                info!(
                    "Weekly report for {} sent to {} recipient(s)",
                    outcome.period,
                    outcome.sent_to.len()
                );
            }
            Err(ReportServiceError::NoData) => {
                debug!("No stored report yet; skipping weekly send");
            }
            Err(e) => {
                error!("Failed to send weekly report: {}", e);
            }
        }
    }
}
