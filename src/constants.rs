//! Common constants used throughout the ipv6notify application

use std::time::Duration;

//==============================================================================
// Cloudflare API Constants
//==============================================================================

/// Default Cloudflare API base URL (overridable via `providerBaseURL`)
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com";

/// DNS record type for IPv6 addresses
pub const DNS_RECORD_TYPE_AAAA: &str = "AAAA";

//==============================================================================
// HTTP Constants
//==============================================================================

/// User agent string for outbound HTTP requests
pub const USER_AGENT: &str = "ipv6notify/0.1";

/// Timeout applied to every outbound HTTP call
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

//==============================================================================
// Configuration Defaults
//==============================================================================

/// Config file read when no `--config` flag is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Default publish interval in minutes
pub const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 5;

/// Default port for the local status endpoint
pub const DEFAULT_HTTP_PORT: u16 = 8080;
