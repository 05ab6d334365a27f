use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ipv6notify::cloudflare::CloudflareUpdater;
use ipv6notify::config::{CliOverrides, Config};
use ipv6notify::constants::HTTP_TIMEOUT;
use ipv6notify::daemon::Daemon;
use ipv6notify::notify::{NotificationSender, Notifier};
use ipv6notify::resolver::{AddressSource, SystemResolver};
use ipv6notify::status::StatusServer;

//==============================================================================
// Main
//==============================================================================

#[derive(Debug, Parser)]
#[command(name = "ipv6notify")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Client name used in update notices
    #[arg(short = 'n', long)]
    name: Option<String>,
    /// Publish interval in minutes
    #[arg(short, long)]
    interval: Option<u64>,
    /// Port for the local status endpoint
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Arc::new(
        Config::load(
            args.config,
            CliOverrides {
                client_name: args.name,
                interval_minutes: args.interval,
                http_port: args.port,
            },
        )
        .context("Config load failed")?,
    );

    let resolver: Arc<dyn AddressSource> = Arc::new(SystemResolver);
    let notifier: Arc<dyn Notifier> = Arc::new(NotificationSender::new(
        &config.notification_base_url,
        HTTP_TIMEOUT,
    )?);
    let updater = Arc::new(CloudflareUpdater::new(
        config.dns_provider.clone(),
        HTTP_TIMEOUT,
    )?);

    // A failed bind costs only the endpoint; the publish loop runs regardless.
    let status_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let _status_server = match StatusServer::start(status_addr, Arc::clone(&resolver)).await {
        Ok(server) => {
            info!("address queries served at http://{}/getip", server.local_addr());
            Some(server)
        }
        Err(e) => {
            error!("status server failed to start: {:#}", e);
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!("signal handler setup failed: {}", e);
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => info!("SIGTERM received"),
            _ = tokio::signal::ctrl_c() => info!("interrupt received"),
        }
        let _ = shutdown_tx.send(true);
    });

    let daemon = Daemon::new(config, resolver, notifier, updater);
    daemon.run(shutdown_rx).await;

    info!("ipv6notify stopped");
    Ok(())
}
