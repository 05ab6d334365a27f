//! Cloudflare AAAA record updates
//!
//! One unconditional PUT per update against the v4 API. The updater is a
//! silent no-op while the provider settings are incomplete, so a bare
//! notifier deployment needs no extra configuration.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DnsProviderConfig;
use crate::constants::{CLOUDFLARE_API_BASE, DNS_RECORD_TYPE_AAAA, USER_AGENT};

/// Pushes a discovered address into a DNS record.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    async fn update_record(&self, address: &str) -> Result<()>;
}

//==============================================================================
// Types
//==============================================================================

#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: &'a str,
    proxied: bool,
}

//==============================================================================
// Updater
//==============================================================================

pub struct CloudflareUpdater {
    settings: DnsProviderConfig,
    client: reqwest::Client,
}

impl CloudflareUpdater {
    pub fn new(settings: DnsProviderConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("build reqwest client")?;

        Ok(Self { settings, client })
    }

    fn record_url(&self) -> String {
        let base = if self.settings.provider_base_url.is_empty() {
            CLOUDFLARE_API_BASE
        } else {
            self.settings.provider_base_url.as_str()
        };
        format!(
            "{}/client/v4/zones/{}/dns_records/{}",
            base, self.settings.zone_id, self.settings.record_id
        )
    }
}

#[async_trait]
impl RecordUpdater for CloudflareUpdater {
    async fn update_record(&self, address: &str) -> Result<()> {
        if !self.settings.is_enabled() {
            debug!("DNS provider not configured; skipping record update");
            return Ok(());
        }

        let url = self.record_url();
        let payload = serde_json::to_string(&RecordPayload {
            record_type: DNS_RECORD_TYPE_AAAA,
            name: &self.settings.domain_name,
            content: address,
            proxied: false,
        })?;

        debug!("PUT {}", url);
        let resp = self
            .client
            .put(&url)
            .header("X-Auth-Email", self.settings.account_email.as_str())
            .header("X-Auth-Key", self.settings.token.as_str())
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
            .context("PUT request failed")?;

        let status = resp.status();
        if status != StatusCode::OK {
            bail!("DNS record update failed with status {}", status.as_u16());
        }

        info!(
            "AAAA record for {} set to {}",
            self.settings.domain_name, address
        );
        Ok(())
    }
}

//==============================================================================
// Tests
//==============================================================================
