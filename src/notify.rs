//! Outbound update notices
//!
//! Uses reqwest with rustls for HTTP requests.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use urlencoding::encode;

use crate::constants::USER_AGENT;

/// Builds the human-readable change message for one address.
pub fn update_message(client_name: &str, address: &str) -> String {
    format!("{client_name} update notice/{client_name} updated to:{address}")
}

/// Delivers a change message for the named client.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, client_name: &str, address: &str) -> Result<()>;
}

//==============================================================================
// Sender
//==============================================================================

pub struct NotificationSender {
    base_url: String,
    client: reqwest::Client,
}

impl NotificationSender {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for NotificationSender {
    async fn notify(&self, client_name: &str, address: &str) -> Result<()> {
        let message = update_message(client_name, address);
        // The receiving endpoint expects the encoded message appended to the
        // base URL directly, not as a query parameter.
        let url = format!("{}{}", self.base_url, encode(&message));

        debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("notification GET failed")?;
        resp.error_for_status()
            .context("notification endpoint rejected the request")?;
        Ok(())
    }
}

//==============================================================================
// Tests
//==============================================================================
