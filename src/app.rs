use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::email::{EmailProvider, ResendProvider};
use crate::scheduler;
use crate::services::{DeliverySettings, ReportService};
use crate::storage::FileReportStore;

/// Application with the spawned server and background scheduler
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub report_scheduler_handle: Option<JoinHandle<()>>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// This creates the report store, the email provider (when an API key is
    /// configured) and the report service, and spawns:
    /// - HTTP API server (Axum)
    /// - Weekly report scheduler (unless the interval is 0)
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let store = Arc::new(FileReportStore::new(&config.data_dir, &config.report_blob_key).await?);

        let mailer: Option<Arc<dyn EmailProvider>> = match &config.resend_api_key {
            Some(key) => Some(Arc::new(ResendProvider::new(&config.resend_api_url, key)?)),
            None => {
                warn!("RESEND_API_KEY not set; report emails are disabled");
                None
            }
        };

        let report_service = ReportService::new(
            store,
            mailer,
            DeliverySettings {
                from: config.report_email_from.clone(),
                recipients: config.report_email_to.clone(),
            },
        )?;

        let report_scheduler_handle = if config.report_interval_hours > 0 {
            let service = report_service.clone();
            let interval = config.report_interval_hours;
            Some(tokio::spawn(async move {
                scheduler::start_report_scheduler(service, interval).await;
            }))
        } else {
            info!("Report scheduler disabled (REPORT_INTERVAL_HOURS=0)");
            None
        };

        let app_state = AppState {
            report_service,
            report_secret: config.report_secret.clone(),
            max_upload_bytes: config.max_upload_bytes,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            report_scheduler_handle,
        })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
