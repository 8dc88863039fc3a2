// Weekly report email: digest computation, rendering and delivery

pub mod digest;
pub mod provider;
pub mod render;

pub use digest::{target_period, DigestError, RateBand, ReportDigest};
pub use provider::{EmailMessage, EmailProvider, MockEmailProvider, ProviderError, ResendProvider, SendReceipt};
pub use render::{render_html, render_text, subject};
