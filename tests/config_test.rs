//! Integration tests for configuration loading

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use ipv6notify::config::{CliOverrides, Config};

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, contents).expect("write config");
    (dir, path)
}

#[test]
fn config_load_from_file() {
    let (_dir, path) = write_config(
        r#"{
            "clientName": "host1",
            "pollInterval": 2,
            "httpPort": 8088,
            "notificationBaseURL": "https://push.example.net/send/",
            "dnsProvider": {
                "token": "cf_token",
                "zoneID": "zone1",
                "recordID": "rec1",
                "domainName": "home.example.net",
                "accountEmail": "ops@example.net"
            }
        }"#,
    );

    let cfg = Config::load(Some(path), CliOverrides::default()).expect("config load");
    assert_eq!(cfg.client_name, "host1");
    assert_eq!(cfg.poll_interval, Duration::from_secs(120));
    assert_eq!(cfg.http_port, 8088);
    assert_eq!(cfg.notification_base_url, "https://push.example.net/send/");
    assert!(cfg.dns_provider.is_enabled());
    assert_eq!(cfg.dns_provider.zone_id, "zone1");
    assert_eq!(cfg.dns_provider.record_id, "rec1");
    assert_eq!(cfg.dns_provider.domain_name, "home.example.net");
    assert_eq!(cfg.dns_provider.account_email, "ops@example.net");
    // No override given; the Cloudflare default applies downstream.
    assert_eq!(cfg.dns_provider.provider_base_url, "");
}

#[test]
fn config_flags_override_file() {
    let (_dir, path) = write_config(
        r#"{
            "clientName": "filehost",
            "pollInterval": 30,
            "httpPort": 9000
        }"#,
    );

    let cfg = Config::load(
        Some(path),
        CliOverrides {
            client_name: Some("clihost".to_string()),
            interval_minutes: Some(1),
            http_port: Some(9100),
        },
    )
    .expect("config load");

    assert_eq!(cfg.client_name, "clihost");
    assert_eq!(cfg.poll_interval, Duration::from_secs(60));
    assert_eq!(cfg.http_port, 9100);
}

#[test]
fn config_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("does_not_exist.json");

    let cfg = Config::load(Some(path), CliOverrides::default()).expect("config load");
    assert_eq!(cfg.client_name, "");
    assert_eq!(cfg.poll_interval, Duration::from_secs(5 * 60));
    assert!(!cfg.dns_provider.is_enabled());
}

#[test]
fn config_unparseable_file_falls_back_to_defaults() {
    let (_dir, path) = write_config("{ this is not json");

    let cfg = Config::load(Some(path), CliOverrides::default()).expect("config load");
    assert_eq!(cfg.client_name, "");
    assert!(!cfg.dns_provider.is_enabled());
}

#[test]
fn config_flags_still_apply_without_a_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("missing.json");

    let cfg = Config::load(
        Some(path),
        CliOverrides {
            client_name: Some("host1".to_string()),
            interval_minutes: Some(1),
            http_port: Some(8088),
        },
    )
    .expect("config load");

    assert_eq!(cfg.client_name, "host1");
    assert_eq!(cfg.poll_interval, Duration::from_secs(60));
    assert_eq!(cfg.http_port, 8088);
}

#[test]
fn config_zero_interval_is_rejected() {
    let (_dir, path) = write_config(r#"{"pollInterval": 0}"#);

    let err = Config::load(Some(path), CliOverrides::default()).expect_err("zero interval");
    assert!(format!("{err}").contains("pollInterval"));
}

#[test]
fn config_zero_interval_flag_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("missing.json");

    let err = Config::load(
        Some(path),
        CliOverrides {
            client_name: None,
            interval_minutes: Some(0),
            http_port: None,
        },
    )
    .expect_err("zero interval");
    assert!(format!("{err}").contains("pollInterval"));
}

#[test]
fn config_partial_dns_provider_stays_disabled() {
    let (_dir, path) = write_config(
        r#"{
            "dnsProvider": {
                "token": "cf_token",
                "domainName": "home.example.net"
            }
        }"#,
    );

    let cfg = Config::load(Some(path), CliOverrides::default()).expect("config load");
    assert!(!cfg.dns_provider.is_enabled());
}

#[test]
fn config_enabled_dns_provider_with_bad_domain_is_rejected() {
    let (_dir, path) = write_config(
        r#"{
            "dnsProvider": {
                "token": "cf_token",
                "zoneID": "zone1",
                "recordID": "rec1",
                "domainName": "bad domain.example.net"
            }
        }"#,
    );

    let err = Config::load(Some(path), CliOverrides::default()).expect_err("bad domain");
    assert!(format!("{err}").contains("invalid character"));
}
