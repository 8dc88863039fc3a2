use async_trait::async_trait;
use backon::{BackoffBuilder, ExponentialBuilder};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Email API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Email API unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether a later attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Connection(_) | ProviderError::Unavailable { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendReceipt {
    pub id: String,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Resend HTTP API client (`POST {api_url}/emails`).
pub struct ResendProvider {
    client: Client,
    api_url: String,
    api_key: String,
    backoff: ExponentialBuilder,
}

impl ResendProvider {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            backoff: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(8))
                .with_factor(2.0)
                .with_max_times(3),
        })
    }

    /// Override the retry schedule for transient failures.
    pub fn with_retry(mut self, min_delay: Duration, max_times: usize) -> Self {
        self.backoff = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(min_delay.saturating_mul(16))
            .with_factor(2.0)
            .with_max_times(max_times);
        self
    }

    async fn send_once(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        let url = format!("{}/emails", self.api_url);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SendReceipt>()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(ProviderError::Unavailable {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        let mut delays = self.backoff.clone().build();

        loop {
            match self.send_once(message).await {
                Ok(receipt) => {
                    info!(id = %receipt.id, "Email sent");
                    return Ok(receipt);
                }
                Err(e) if e.is_transient() => match delays.next() {
                    Some(delay) => {
                        warn!("Email send failed ({}), retrying in {:?}", e, delay);
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
    }
}

/// Records messages instead of sending them.
#[derive(Default)]
pub struct MockEmailProvider {
    sent: Mutex<Vec<EmailMessage>>,
    fail_with: Option<String>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send is rejected with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        if let Some(reason) = &self.fail_with {
            return Err(ProviderError::Rejected {
                status: 422,
                message: reason.clone(),
            });
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| ProviderError::Configuration("mock provider lock poisoned".to_string()))?;
        sent.push(message.clone());

        info!(to = ?message.to, subject = %message.subject, "[MOCK] Email would be sent");
        Ok(SendReceipt {
            id: format!("mock-email-{}", sent.len()),
        })
    }
}
