//! Mail composition and delivery framework with pluggable channel support.
//!
//! Curated alerts are turned into an [`OutgoingMail`] by
//! [`template::compose_mail`] and delivered through a
//! [`NotificationChannel`]. Built-in channels are `email` (SMTP via
//! lettre) and `mock` (logs and records the mail, used when no SMTP
//! server is configured).

pub mod channels;
pub mod error;
pub mod plugin;
pub mod template;
pub mod utils;


use async_trait::async_trait;

pub use error::{NotifyError, Result};
pub use template::{
    compose_mail, AlertLine, MailDefaults, MailOverrides, OutgoingMail, PassthroughRenderer,
    TemplateRenderer,
};

/// Delivery outcome for a single recipient.
#[derive(Debug, Clone)]
pub struct RecipientResult {
    pub recipient: String,
    pub status: String,
    pub error: Option<String>,
}

/// Aggregated delivery outcome for one mail.
#[derive(Debug, Clone, Default)]
pub struct SendResponse {
    pub retry_count: u32,
    pub recipient_results: Vec<RecipientResult>,
}

impl SendResponse {
    /// True when every recipient was delivered to.
    pub fn all_succeeded(&self) -> bool {
        self.recipient_results.iter().all(|r| r.status == "success")
    }
}

/// A delivery channel that sends a composed mail to its recipients.
///
/// Implementations are created by the corresponding
/// [`plugin::ChannelPlugin`] and shared behind the server state.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers the mail, reporting a per-recipient outcome.
    ///
    /// # Errors
    ///
    /// Returns an error only when the mail cannot be attempted at all
    /// (e.g. an unparseable sender address); per-recipient failures are
    /// reported inside [`SendResponse`].
    async fn send(&self, mail: &OutgoingMail) -> Result<SendResponse>;

    /// Returns the channel type name (e.g., `"email"`, `"mock"`).
    fn channel_type(&self) -> &str;
}

impl std::fmt::Debug for dyn NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("channel_type", &self.channel_type())
            .finish()
    }
}
