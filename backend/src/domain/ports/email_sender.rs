//! Port for outbound email.
//!
//! The domain decides when to email and what context to pass; rendering
//! and delivery belong to the adapter. Messages name a template and carry
//! a flat string context map for it.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by email adapters.
    pub enum EmailError {
        /// The mail backend refused or failed the handoff.
        Delivery { message: String } =>
            "email delivery failed: {message}",
    }
}

/// A templated email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Subject line.
    pub subject: String,
    /// Recipient addresses.
    pub recipients: Vec<String>,
    /// Template name the adapter renders.
    pub template: String,
    /// Flat template context.
    pub context: BTreeMap<String, String>,
}

impl EmailMessage {
    /// A message to a single recipient.
    #[must_use]
    pub fn to(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            recipients: vec![recipient.into()],
            template: template.into(),
            context: BTreeMap::new(),
        }
    }

    /// Add one context entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Port for handing messages to the mail backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Fixture implementation that silently accepts every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmailSender;

#[async_trait]
impl EmailSender for FixtureEmailSender {
    async fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
        Ok(())
    }
}
