//! Configuration module for ipv6notify
//!
//! Configuration is merged from three sources, highest precedence first:
//! command-line flags, the JSON config file, built-in defaults. The merged
//! value is validated once at startup and immutable afterwards.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Deserialize;
use tracing::warn;
use zeroize::ZeroizeOnDrop;

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_HTTP_PORT, DEFAULT_POLL_INTERVAL_MINUTES};

//==============================================================================
// Config
//==============================================================================

/// Runtime configuration for the ipv6notify daemon
///
/// # Fields
///
/// - `client_name`: name used in outbound update notices
/// - `poll_interval`: time between publish cycles (minutes granularity)
/// - `http_port`: port for the local status endpoint
/// - `notification_base_url`: URL prefix the encoded notice is appended to
/// - `dns_provider`: optional Cloudflare record settings; updates are a no-op
///   unless [`DnsProviderConfig::is_enabled`] holds
#[derive(Debug, Clone)]
pub struct Config {
    pub client_name: String,
    pub poll_interval: Duration,
    pub http_port: u16,
    pub notification_base_url: String,
    pub dns_provider: DnsProviderConfig,
}

/// Cloudflare record settings
///
/// The API token is wrapped in `Zeroizing` so it is cleared from memory when
/// the config is dropped.
#[derive(Debug, Clone, Default, ZeroizeOnDrop)]
pub struct DnsProviderConfig {
    /// API token sent as `X-Auth-Key`
    #[zeroize(skip)]
    pub token: zeroize::Zeroizing<String>,
    /// Zone the record lives in
    #[zeroize(skip)]
    pub zone_id: String,
    /// Identifier of the AAAA record to overwrite
    #[zeroize(skip)]
    pub record_id: String,
    /// Domain name written into the record body
    #[zeroize(skip)]
    pub domain_name: String,
    /// API base URL; empty means the Cloudflare default
    #[zeroize(skip)]
    pub provider_base_url: String,
    /// Account email sent as `X-Auth-Email`
    #[zeroize(skip)]
    pub account_email: String,
}

impl DnsProviderConfig {
    /// Record updates only happen when token, zone and record ID are all set.
    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty() && !self.zone_id.is_empty() && !self.record_id.is_empty()
    }
}

/// Values supplied on the command line; each overrides the file value
/// field-by-field when present.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub client_name: Option<String>,
    pub interval_minutes: Option<u64>,
    pub http_port: Option<u16>,
}

impl Config {
    /// Loads configuration from the JSON file and applies CLI overrides.
    ///
    /// A missing or unparseable config file is not fatal: a warning is logged
    /// and defaults are used, matching the best-effort startup behavior of
    /// the rest of the daemon. Validation failures of the merged value are
    /// fatal.
    pub fn load(config_path: Option<PathBuf>, overrides: CliOverrides) -> Result<Self> {
        let file = Self::load_file(config_path);
        let config = Self::merge(file, overrides)?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(config_path: Option<PathBuf>) -> FileConfig {
        let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("config file {} not read ({}); using defaults", path.display(), e);
                return FileConfig::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!("config file {} not parsed ({}); using defaults", path.display(), e);
                FileConfig::default()
            }
        }
    }

    fn merge(file: FileConfig, overrides: CliOverrides) -> Result<Self> {
        let minutes = overrides
            .interval_minutes
            .or(file.poll_interval)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MINUTES);
        if minutes == 0 {
            bail!("pollInterval must be greater than zero");
        }

        let dns = file.dns_provider.unwrap_or_default();
        Ok(Self {
            client_name: overrides
                .client_name
                .or(file.client_name)
                .unwrap_or_default(),
            poll_interval: Duration::from_secs(minutes * 60),
            http_port: overrides
                .http_port
                .or(file.http_port)
                .unwrap_or(DEFAULT_HTTP_PORT),
            notification_base_url: file.notification_base_url.unwrap_or_default(),
            dns_provider: DnsProviderConfig {
                token: zeroize::Zeroizing::new(dns.token.unwrap_or_default()),
                zone_id: dns.zone_id.unwrap_or_default(),
                record_id: dns.record_id.unwrap_or_default(),
                domain_name: dns.domain_name.unwrap_or_default(),
                provider_base_url: dns.provider_base_url.unwrap_or_default(),
                account_email: dns.account_email.unwrap_or_default(),
            },
        })
    }

    fn validate(&self) -> Result<()> {
        if self.notification_base_url.is_empty() {
            warn!("notificationBaseURL is empty; update notices will fail until configured");
        }
        if self.dns_provider.is_enabled() {
            if self.dns_provider.domain_name.is_empty() {
                bail!("domainName is required when the DNS provider is configured");
            }
            validate_domain_name(&self.dns_provider.domain_name)?;
        }
        Ok(())
    }
}

/// Validates a DNS name: dot-separated labels of letters, digits, `-` and
/// `_`, no label longer than 63 characters, 253 total. A trailing dot (FQDN
/// notation) is accepted and ignored.
pub fn validate_domain_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    let name = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if name.is_empty() {
        bail!("domain name cannot be empty");
    }
    if name.len() > 253 {
        bail!("domain name too long (max 253 characters, got {})", name.len());
    }
    for label in name.split('.') {
        if label.is_empty() {
            bail!("domain name contains an empty label");
        }
        if label.len() > 63 {
            bail!("domain name label too long (max 63 characters, got {})", label.len());
        }
        if label.starts_with('-') || label.ends_with('-') {
            bail!("domain name label cannot start or end with a hyphen");
        }
        for ch in label.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
                bail!("domain name contains invalid character: '{}'", ch);
            }
        }
    }
    Ok(())
}

//==============================================================================
// File format
//==============================================================================

/// JSON configuration file structure; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    #[serde(rename = "clientName")]
    client_name: Option<String>,
    #[serde(rename = "pollInterval")]
    poll_interval: Option<u64>,
    #[serde(rename = "httpPort")]
    http_port: Option<u16>,
    #[serde(rename = "notificationBaseURL")]
    notification_base_url: Option<String>,
    #[serde(rename = "dnsProvider")]
    dns_provider: Option<FileDnsProvider>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileDnsProvider {
    token: Option<String>,
    #[serde(rename = "zoneID")]
    zone_id: Option<String>,
    #[serde(rename = "recordID")]
    record_id: Option<String>,
    #[serde(rename = "domainName")]
    domain_name: Option<String>,
    #[serde(rename = "providerBaseURL")]
    provider_base_url: Option<String>,
    #[serde(rename = "accountEmail")]
    account_email: Option<String>,
}

//==============================================================================
// Tests
//==============================================================================
