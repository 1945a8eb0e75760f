//! Log-backed email delivery.
//!
//! Messages are written to the structured log instead of handed to an SMTP
//! relay. Notification jobs treat delivery as best-effort and record what
//! they sent in the notification ledger, so swapping in a real relay later
//! only touches this adapter.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{EmailError, EmailMessage, EmailSender};

/// Email sender that renders messages into the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(
            recipients = %message.recipients.join(", "),
            subject = %message.subject,
            template = %message.template,
            context = ?message.context,
            "email dispatched"
        );
        Ok(())
    }
}
