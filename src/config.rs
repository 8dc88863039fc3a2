use std::env;

use crate::utils::parse_recipients;

pub const DEFAULT_EMAIL_FROM: &str = "MPIRE Reports <reports@resend.dev>";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: String,
    pub report_blob_key: String,
    pub report_secret: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub report_email_to: Vec<String>,
    pub report_email_from: String,
    /// 0 disables the scheduled send.
    pub report_interval_hours: u64,
    pub max_upload_bytes: usize,
}

/// Non-empty value of an environment variable.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            report_blob_key: env::var("REPORT_BLOB_KEY")
                .unwrap_or_else(|_| "mpire-dashboard.json".to_string()),
            report_secret: optional("REPORT_SECRET"),
            resend_api_key: optional("RESEND_API_KEY"),
            resend_api_url: env::var("RESEND_API_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            report_email_to: optional("REPORT_EMAIL_TO")
                .map(|raw| parse_recipients(&raw))
                .unwrap_or_default(),
            report_email_from: optional("REPORT_EMAIL_FROM")
                .unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            report_interval_hours: env::var("REPORT_INTERVAL_HOURS")
                .unwrap_or_else(|_| "168".to_string())
                .parse()
                .unwrap_or(168),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
