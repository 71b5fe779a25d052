//! Private-message notifications
//!
//! Delivery is best effort: the dispatch site spawns a task and logs
//! failures. A feedback operation never fails because its follow-up
//! message could not be delivered.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::models::{classify, Feedback, RatingClass};

/// A private message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub recipient_username: String,
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait PrivateMessenger: Send + Sync {
    /// Deliver one message, raising on hard failure. Callers catch and log.
    async fn send(&self, notice: &Notice) -> Result<()>;
}

/// Messenger posting to the forum's private-message endpoint
pub struct ForumMessenger {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
    system_actor: String,
}

impl ForumMessenger {
    pub fn new(endpoint: String, api_token: String, system_actor: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_token,
            system_actor,
        }
    }
}

#[async_trait]
impl PrivateMessenger for ForumMessenger {
    async fn send(&self, notice: &Notice) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&json!({
                "from": self.system_actor,
                "to": notice.recipient_username,
                "title": notice.title,
                "body": notice.body,
            }))
            .send()
            .await
            .context("forum private-message request failed")?
            .error_for_status()
            .context("forum private-message endpoint rejected the message")?;

        Ok(())
    }
}

/// Fallback messenger used when no forum endpoint is configured
pub struct LogMessenger;

#[async_trait]
impl PrivateMessenger for LogMessenger {
    async fn send(&self, notice: &Notice) -> Result<()> {
        tracing::info!(
            recipient = %notice.recipient_username,
            title = %notice.title,
            "private message (no forum endpoint configured)"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch. Failures are logged, never propagated.
pub fn deliver(messenger: Arc<dyn PrivateMessenger>, notice: Notice) {
    tokio::spawn(async move {
        if let Err(error) = messenger.send(&notice).await {
            tracing::warn!(
                recipient = %notice.recipient_username,
                %error,
                "failed to deliver private message"
            );
        }
    });
}

// ===== Message builders =====

pub fn feedback_received(author_username: &str, recipient_username: &str, feedback: &Feedback) -> Notice {
    let tone = match classify(feedback.rating) {
        RatingClass::Positive => "positive",
        RatingClass::Neutral => "neutral",
        RatingClass::Negative => "negative",
    };
    Notice {
        recipient_username: recipient_username.to_string(),
        title: "You have received new feedback".to_string(),
        body: format!(
            "{} left you {} feedback ({}/5) for ticket {}.",
            author_username, tone, feedback.rating, feedback.ticket_number
        ),
    }
}

pub fn dispute_accepted(recipient_username: &str, feedback: &Feedback) -> Notice {
    Notice {
        recipient_username: recipient_username.to_string(),
        title: "Feedback dispute accepted".to_string(),
        body: format!(
            "Your dispute was accepted. The feedback for ticket {} has been removed from your profile.",
            feedback.ticket_number
        ),
    }
}

pub fn dispute_rejected(recipient_username: &str, feedback: &Feedback) -> Notice {
    Notice {
        recipient_username: recipient_username.to_string(),
        title: "Feedback dispute rejected".to_string(),
        body: format!(
            "Your dispute was rejected. The feedback for ticket {} stays on your profile and cannot be disputed again.",
            feedback.ticket_number
        ),
    }
}
