//! Publish pipeline for ipv6notify
//!
//! One cycle runs discover → notify → update-DNS. The notification and the
//! record update are best-effort and independent: either may fail without
//! aborting the cycle or suppressing the other leg. Cycles repeat on a fixed
//! interval with no jitter, no backoff and no skip-on-failure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::cloudflare::RecordUpdater;
use crate::config::Config;
use crate::metrics;
use crate::notify::Notifier;
use crate::resolver::AddressSource;

//==============================================================================
// Types
//==============================================================================

/// Outcome of one publish cycle.
///
/// `notified` and `dns_updated` stay `None` when no address was discovered
/// and the downstream legs never ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub address: Option<String>,
    pub notified: Option<bool>,
    pub dns_updated: Option<bool>,
    pub finished_at: DateTime<Utc>,
}

impl PublishResult {
    fn skipped() -> Self {
        Self {
            address: None,
            notified: None,
            dns_updated: None,
            finished_at: Utc::now(),
        }
    }
}

//==============================================================================
// Daemon
//==============================================================================

/// Drives the periodic detect-and-publish loop.
pub struct Daemon {
    config: Arc<Config>,
    resolver: Arc<dyn AddressSource>,
    notifier: Arc<dyn Notifier>,
    updater: Arc<dyn RecordUpdater>,
}

impl Daemon {
    pub fn new(
        config: Arc<Config>,
        resolver: Arc<dyn AddressSource>,
        notifier: Arc<dyn Notifier>,
        updater: Arc<dyn RecordUpdater>,
    ) -> Self {
        Self {
            config,
            resolver,
            notifier,
            updater,
        }
    }

    /// Runs one cycle immediately, then one per interval until shutdown.
    ///
    /// The shutdown signal is observed during the interval sleep, so a stop
    /// request never waits for the next tick. A dropped sender counts as a
    /// stop request.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "starting publish loop (interval: {} seconds)",
            self.config.poll_interval.as_secs()
        );

        self.run_cycle().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested; stopping publish loop");
                        break;
                    }
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// Runs a single discover → notify → update-DNS cycle.
    pub async fn run_cycle(&self) -> PublishResult {
        metrics::record_cycle();

        let address = match self.resolver.find_public_ipv6() {
            Ok(Some(address)) => address,
            Ok(None) => {
                warn!("no global IPv6 address found; nothing to publish");
                return PublishResult::skipped();
            }
            Err(e) => {
                metrics::record_resolve_failure();
                error!("interface enumeration failed: {:#}", e);
                return PublishResult::skipped();
            }
        };

        info!("publishing {}", address);

        let notified = match self
            .notifier
            .notify(&self.config.client_name, &address)
            .await
        {
            Ok(()) => {
                info!("update notice for {} delivered", self.config.client_name);
                true
            }
            Err(e) => {
                error!("notification failed: {:#}", e);
                false
            }
        };
        metrics::record_notification(notified);

        let dns_updated = match self.updater.update_record(&address).await {
            Ok(()) => true,
            Err(e) => {
                error!("DNS record update failed: {:#}", e);
                false
            }
        };
        metrics::record_dns_update(dns_updated);

        let result = PublishResult {
            address: Some(address),
            notified: Some(notified),
            dns_updated: Some(dns_updated),
            finished_at: Utc::now(),
        };
        debug!("publish cycle finished at {}", result.finished_at);
        result
    }
}

//==============================================================================
// Tests
//==============================================================================
