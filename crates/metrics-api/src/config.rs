//! Server-side configuration surface.
//!
//! A `clap::Parser` struct with `env = "..."` attributes on each flag,
//! layered with an optional JSON config file underneath. Precedence is
//! environment variable, then command-line flag, then JSON config file,
//! then built-in default — checked in that order per field, since
//! clap's own env integration alone only gives flag-or-env, not
//! file-as-a-third-tier.

use crate::errors::ConfigError;
use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line flags for the metrics server.
///
/// Every field is optional here — `None` means "not provided on the
/// command line", which lets [`ServerSettings::resolve`] fall through to
/// the environment, then the config file, then the default.
#[derive(Parser, Debug, Default)]
#[command(name = "metrics-server", version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ingest server for the metrics telemetry system")]
pub struct Cli {
    /// Listen address, e.g. `0.0.0.0:8080`.
    #[arg(short = 'a', long = "address")]
    pub address: Option<String>,

    /// Snapshot interval in seconds; `0` means synchronous save-on-write.
    #[arg(short = 'i', long = "store-interval")]
    pub store_interval: Option<u64>,

    /// Path to the snapshot file for the file-backed store.
    #[arg(short = 'f', long = "file-storage-path")]
    pub file_storage_path: Option<PathBuf>,

    /// Restore the store from the snapshot file on startup.
    #[arg(short = 'r', long = "restore")]
    pub restore: Option<bool>,

    /// Relational backend connection string.
    #[arg(short = 'd', long = "database-dsn")]
    pub database_dsn: Option<String>,

    /// Shared HMAC-SHA256 key.
    #[arg(short = 'k', long = "key")]
    pub hmac_key: Option<String>,

    /// Path to the PEM-encoded RSA private key used to decrypt bodies.
    #[arg(long = "crypto-key")]
    pub private_key_path: Option<PathBuf>,

    /// Trusted CIDR that `X-Real-IP` must fall within.
    #[arg(short = 't', long = "trusted-subnet")]
    pub trusted_subnet: Option<String>,

    /// Path to append audit events to, one JSON line per event.
    #[arg(long = "audit-file")]
    pub audit_file: Option<PathBuf>,

    /// URL of a remote collector to POST audit events to.
    #[arg(long = "audit-url")]
    pub audit_url: Option<String>,

    /// JSON configuration file, lowest-precedence layer above the defaults.
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<PathBuf>,
}

/// On-disk JSON configuration file shape. Every field is optional; absent
/// fields leave the default (or a higher-precedence value) untouched.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    address: Option<String>,
    store_interval: Option<u64>,
    file_storage_path: Option<PathBuf>,
    restore: Option<bool>,
    database_dsn: Option<String>,
    hmac_key: Option<String>,
    private_key_path: Option<PathBuf>,
    trusted_subnet: Option<String>,
    audit_file: Option<PathBuf>,
    audit_url: Option<String>,
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub address: SocketAddr,
    pub store_interval: Duration,
    pub file_storage_path: Option<PathBuf>,
    pub restore: bool,
    pub database_dsn: Option<String>,
    pub hmac_key: String,
    pub private_key_path: Option<PathBuf>,
    pub trusted_subnet: Option<String>,
    pub audit_file: Option<PathBuf>,
    pub audit_url: Option<String>,
}

impl ServerSettings {
    /// Resolve settings from `cli`, falling back through the environment,
    /// an optional JSON config file named by `cli.config_path`, and
    /// built-in defaults, in that order of precedence.
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config_path {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };

        let address = resolve_string(
            "ADDRESS",
            cli.address,
            file.address,
            "0.0.0.0:8080".to_string(),
        )
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::Invalid {
            message: format!("invalid listen address: {e}"),
        })?;

        let store_interval_secs =
            resolve_parsed("STORE_INTERVAL", cli.store_interval, file.store_interval, 300)?;

        let file_storage_path = resolve_optional_path(
            "FILE_STORAGE_PATH",
            cli.file_storage_path,
            file.file_storage_path,
        );

        let restore = resolve_parsed("RESTORE", cli.restore, file.restore, false)?;

        let database_dsn =
            resolve_optional_string("DATABASE_DSN", cli.database_dsn, file.database_dsn);

        let hmac_key = resolve_string("KEY", cli.hmac_key, file.hmac_key, String::new());

        let private_key_path = resolve_optional_path(
            "CRYPTO_KEY",
            cli.private_key_path,
            file.private_key_path,
        );

        let trusted_subnet =
            resolve_optional_string("TRUSTED_SUBNET", cli.trusted_subnet, file.trusted_subnet);

        let audit_file = resolve_optional_path("AUDIT_FILE", cli.audit_file, file.audit_file);

        let audit_url = resolve_optional_string("AUDIT_URL", cli.audit_url, file.audit_url);

        Ok(Self {
            address,
            store_interval: Duration::from_secs(store_interval_secs),
            file_storage_path,
            restore,
            database_dsn,
            hmac_key,
            private_key_path,
            trusted_subnet,
            audit_file,
            audit_url,
        })
    }
}

fn load_file_config(path: &PathBuf) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
        message: format!("failed to read config file {}: {e}", path.display()),
    })?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::Invalid {
        message: format!("failed to parse config file {}: {e}", path.display()),
    })
}

fn resolve_string(env_key: &str, cli: Option<String>, file: Option<String>, default: String) -> String {
    std::env::var(env_key).ok().or(cli).or(file).unwrap_or(default)
}

fn resolve_optional_string(
    env_key: &str,
    cli: Option<String>,
    file: Option<String>,
) -> Option<String> {
    std::env::var(env_key).ok().or(cli).or(file)
}

fn resolve_optional_path(
    env_key: &str,
    cli: Option<PathBuf>,
    file: Option<PathBuf>,
) -> Option<PathBuf> {
    std::env::var(env_key).ok().map(PathBuf::from).or(cli).or(file)
}

fn resolve_parsed<T>(
    env_key: &str,
    cli: Option<T>,
    file: Option<T>,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = std::env::var(env_key) {
        return raw.parse().map_err(|e| ConfigError::Invalid {
            message: format!("invalid value for {env_key}: {e}"),
        });
    }
    Ok(cli.or(file).unwrap_or(default))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
