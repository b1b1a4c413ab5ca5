//! Agent-side configuration surface.
//!
//! Same layered precedence as `metrics_api::config::ServerSettings`:
//! environment variable, then command-line flag, then JSON config file,
//! then built-in default, resolved per field.

use clap::Parser;
use metrics_core::retry::RetryPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Command-line flags for the metrics agent. Every field is optional — a
/// `None` means "not provided on the command line", letting
/// [`AgentSettings::resolve`] fall through the remaining precedence tiers.
#[derive(Parser, Debug, Default)]
#[command(name = "metrics-agent", version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sampling and dispatch agent for the metrics telemetry system")]
pub struct Cli {
    /// Server base address, e.g. `http://localhost:8080`.
    #[arg(short = 'a', long = "address")]
    pub address: Option<String>,

    /// Sampler tick interval in seconds.
    #[arg(short = 'p', long = "poll-interval")]
    pub poll_interval: Option<u64>,

    /// Report/dispatch interval in seconds.
    #[arg(short = 'r', long = "report-interval")]
    pub report_interval: Option<u64>,

    /// Batch size; `0` or negative selects individual dispatch mode.
    #[arg(short = 'b', long = "batch-size")]
    pub batch_size: Option<i64>,

    /// Number of concurrent worker tasks.
    #[arg(short = 'l', long = "rate-limit")]
    pub rate_limit: Option<usize>,

    /// Shared HMAC-SHA256 key.
    #[arg(short = 'k', long = "key")]
    pub hmac_key: Option<String>,

    /// Path to the PEM-encoded RSA public key used to encrypt bodies.
    #[arg(long = "crypto-key")]
    pub public_key_path: Option<PathBuf>,

    /// Disable retries outright (single attempt, no schedule).
    #[arg(long = "disable-retry")]
    pub disable_retry: bool,

    /// Use the full (slow) retry schedule, overriding test-mode defaults.
    #[arg(long = "enable-full-retry")]
    pub enable_full_retry: bool,

    /// Use the fast retry schedule meant for tests / low-latency runs.
    #[arg(long = "test-mode")]
    pub test_mode: bool,

    /// JSON configuration file, lowest-precedence layer above the defaults.
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    address: Option<String>,
    poll_interval: Option<u64>,
    report_interval: Option<u64>,
    batch_size: Option<i64>,
    rate_limit: Option<usize>,
    hmac_key: Option<String>,
    public_key_path: Option<PathBuf>,
}

/// Fully resolved agent configuration.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub server_address: String,
    pub poll_interval: Duration,
    pub report_interval: Duration,
    pub batch_size: i64,
    pub rate_limit: usize,
    pub hmac_key: String,
    pub public_key_path: Option<PathBuf>,
    pub retry_policy: RetryPolicy,
}

impl AgentSettings {
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config_path {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };

        let server_address = resolve_string(
            "ADDRESS",
            cli.address.clone(),
            file.address,
            "http://localhost:8080".to_string(),
        );

        let poll_interval_secs =
            resolve_parsed("POLL_INTERVAL", cli.poll_interval, file.poll_interval, 2)?;
        let report_interval_secs = resolve_parsed(
            "REPORT_INTERVAL",
            cli.report_interval,
            file.report_interval,
            10,
        )?;
        let batch_size = resolve_parsed("BATCH_SIZE", cli.batch_size, file.batch_size, 0)?;
        let rate_limit = resolve_parsed("RATE_LIMIT", cli.rate_limit, file.rate_limit, 10)?;
        let hmac_key = resolve_string("KEY", cli.hmac_key.clone(), file.hmac_key, String::new());
        let public_key_path = resolve_optional_path(
            "CRYPTO_KEY",
            cli.public_key_path.clone(),
            file.public_key_path,
        );

        let retry_policy = resolve_retry_policy(&cli);

        Ok(Self {
            server_address,
            poll_interval: Duration::from_secs(poll_interval_secs),
            report_interval: Duration::from_secs(report_interval_secs),
            batch_size,
            rate_limit,
            hmac_key,
            public_key_path,
            retry_policy,
        })
    }
}

/// `TEST_MODE` takes priority (fast schedule for tests/low-latency runs),
/// then `DISABLE_RETRY` (single attempt), then `ENABLE_FULL_RETRY` (the
/// recommended default schedule); absent all three flags the default
/// schedule is used anyway, since it's also what `ENABLE_FULL_RETRY` asks
/// for explicitly.
fn resolve_retry_policy(cli: &Cli) -> RetryPolicy {
    let test_mode = env_flag("TEST_MODE") || cli.test_mode;
    let disable_retry = env_flag("DISABLE_RETRY") || cli.disable_retry;
    let enable_full_retry = env_flag("ENABLE_FULL_RETRY") || cli.enable_full_retry;

    if test_mode {
        RetryPolicy::fast()
    } else if disable_retry {
        RetryPolicy::no_retry()
    } else if enable_full_retry {
        RetryPolicy::default_policy()
    } else {
        RetryPolicy::default_policy()
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
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
