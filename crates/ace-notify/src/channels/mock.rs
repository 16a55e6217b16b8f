use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::plugin::ChannelPlugin;
use crate::template::OutgoingMail;
use crate::{NotificationChannel, RecipientResult, SendResponse};

/// Channel that records mails instead of delivering them.
///
/// The default when no SMTP server is configured: the platform curates
/// and stamps alerts as sent without any real email leaving the host.
/// Tests inspect the recorded mails through [`MockChannel::sent`].
#[derive(Default)]
pub struct MockChannel {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every mail sent through this channel so far.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for MockChannel {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendResponse> {
        tracing::info!(
            subject = %mail.subject,
            to = ?mail.to,
            cc = ?mail.cc,
            "Mock channel: recording mail instead of sending"
        );
        let recipient_results = mail
            .to
            .iter()
            .map(|r| RecipientResult {
                recipient: r.clone(),
                status: "success".to_string(),
                error: None,
            })
            .collect();
        self.sent.lock().unwrap().push(mail.clone());
        Ok(SendResponse {
            retry_count: 0,
            recipient_results,
        })
    }

    fn channel_type(&self) -> &str {
        "mock"
    }
}

pub struct MockPlugin;

impl ChannelPlugin for MockPlugin {
    fn name(&self) -> &str {
        "mock"
    }

    fn validate_config(&self, _config: &Value) -> Result<()> {
        Ok(())
    }

    fn create_channel(&self, _config: &Value) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(MockChannel::new()))
    }
}
