use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rent_report_service::app::Application;
use rent_report_service::config::Config;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rent_report_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    info!(
        "Starting rent report service on {} (data dir {}, mailer {}, interval {}h)",
        config.server_addr(),
        config.data_dir,
        if config.resend_api_key.is_some() { "enabled" } else { "disabled" },
        config.report_interval_hours
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await
}
