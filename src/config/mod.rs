//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "corriere";
const DEFAULT_BACKEND_BASE_URL: &str = "http://127.0.0.1:3000/api/";
const DEFAULT_BACKEND_ENVIRONMENT: &str = "development";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_SWR_SECS: u64 = 600;
const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 3600;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 10_000;
const DEFAULT_METRICS_CAPACITY: usize = 1000;

/// Command-line arguments for the corriere binary.
#[derive(Debug, Parser)]
#[command(name = "corriere", version, about = "Resilient content-access layer")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "CORRIERE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Warm the cache with critical collections before reporting diagnostics.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub preload: bool,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the backend base URL.
    #[arg(long = "backend-base-url", value_name = "URL")]
    pub backend_base_url: Option<String>,

    /// Toggle backend access; when disabled every read serves fallback data.
    #[arg(
        long = "backend-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub backend_enabled: Option<bool>,

    /// Override the per-request timeout.
    #[arg(long = "backend-request-timeout-seconds", value_name = "SECONDS")]
    pub backend_request_timeout_seconds: Option<u64>,

    /// Override the deployment environment label.
    #[arg(long = "backend-environment", value_name = "NAME")]
    pub backend_environment: Option<String>,

    /// Toggle response caching.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache freshness window.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the stale-while-revalidate window.
    #[arg(long = "cache-swr-seconds", value_name = "SECONDS")]
    pub cache_swr_seconds: Option<u64>,

    /// Override the advisory maximum entry age.
    #[arg(long = "cache-max-age-seconds", value_name = "SECONDS")]
    pub cache_max_age_seconds: Option<u64>,

    /// Override the retry budget after the initial attempt.
    #[arg(long = "retry-max-retries", value_name = "COUNT")]
    pub retry_max_retries: Option<u32>,

    /// Override the first backoff delay.
    #[arg(long = "retry-base-delay-ms", value_name = "MILLIS")]
    pub retry_base_delay_ms: Option<u64>,

    /// Override the backoff ceiling.
    #[arg(long = "retry-max-delay-ms", value_name = "MILLIS")]
    pub retry_max_delay_ms: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the performance ledger capacity.
    #[arg(long = "metrics-capacity", value_name = "COUNT")]
    pub metrics_capacity: Option<usize>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub cache: CacheSettings,
    pub retry: RetrySettings,
    pub logging: LoggingSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: Url,
    pub enabled: bool,
    pub request_timeout: Duration,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub stale_while_revalidate_seconds: u64,
    pub max_age_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            stale_while_revalidate_seconds: DEFAULT_CACHE_SWR_SECS,
            max_age_seconds: DEFAULT_CACHE_MAX_AGE_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct MetricsSettings {
    pub capacity: usize,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_METRICS_CAPACITY,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("CORRIERE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    backend: RawBackendSettings,
    cache: RawCacheSettings,
    retry: RawRetrySettings,
    logging: RawLoggingSettings,
    metrics: RawMetricsSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = overrides.backend_base_url.as_ref() {
            self.backend.base_url = Some(url.clone());
        }
        if let Some(enabled) = overrides.backend_enabled {
            self.backend.enabled = Some(enabled);
        }
        if let Some(seconds) = overrides.backend_request_timeout_seconds {
            self.backend.request_timeout_seconds = Some(seconds);
        }
        if let Some(environment) = overrides.backend_environment.as_ref() {
            self.backend.environment = Some(environment.clone());
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(swr) = overrides.cache_swr_seconds {
            self.cache.stale_while_revalidate_seconds = Some(swr);
        }
        if let Some(max_age) = overrides.cache_max_age_seconds {
            self.cache.max_age_seconds = Some(max_age);
        }
        if let Some(retries) = overrides.retry_max_retries {
            self.retry.max_retries = Some(retries);
        }
        if let Some(delay) = overrides.retry_base_delay_ms {
            self.retry.base_delay_ms = Some(delay);
        }
        if let Some(delay) = overrides.retry_max_delay_ms {
            self.retry.max_delay_ms = Some(delay);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(capacity) = overrides.metrics_capacity {
            self.metrics.capacity = Some(capacity);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            backend,
            cache,
            retry,
            logging,
            metrics,
        } = raw;

        let backend = build_backend_settings(backend)?;
        let cache = build_cache_settings(cache)?;
        let retry = build_retry_settings(retry)?;
        let logging = build_logging_settings(logging)?;
        let metrics = build_metrics_settings(metrics)?;

        Ok(Self {
            backend,
            cache,
            retry,
            logging,
            metrics,
        })
    }
}

fn build_backend_settings(backend: RawBackendSettings) -> Result<BackendSettings, LoadError> {
    let raw_url = backend
        .base_url
        .unwrap_or_else(|| DEFAULT_BACKEND_BASE_URL.to_string());
    let mut base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("backend.base_url", format!("failed to parse: {err}")))?;
    // `Url::join` drops the final segment without this, silently rewriting
    // every collection path.
    if !base_url.path().ends_with('/') {
        base_url.set_path(&format!("{}/", base_url.path()));
    }

    let timeout_secs = backend
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "backend.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(BackendSettings {
        base_url,
        enabled: backend.enabled.unwrap_or(true),
        request_timeout: Duration::from_secs(timeout_secs),
        environment: backend
            .environment
            .unwrap_or_else(|| DEFAULT_BACKEND_ENVIRONMENT.to_string()),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    let stale_while_revalidate_seconds = cache
        .stale_while_revalidate_seconds
        .unwrap_or(DEFAULT_CACHE_SWR_SECS);
    let max_age_seconds = cache.max_age_seconds.unwrap_or(DEFAULT_CACHE_MAX_AGE_SECS);

    if stale_while_revalidate_seconds < ttl_seconds {
        return Err(LoadError::invalid(
            "cache.stale_while_revalidate_seconds",
            "must not be shorter than cache.ttl_seconds",
        ));
    }
    if max_age_seconds < stale_while_revalidate_seconds {
        return Err(LoadError::invalid(
            "cache.max_age_seconds",
            "must not be shorter than cache.stale_while_revalidate_seconds",
        ));
    }

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        ttl_seconds,
        stale_while_revalidate_seconds,
        max_age_seconds,
    })
}

fn build_retry_settings(retry: RawRetrySettings) -> Result<RetrySettings, LoadError> {
    let base_delay_ms = retry.base_delay_ms.unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS);
    let max_delay_ms = retry.max_delay_ms.unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS);

    if max_delay_ms < base_delay_ms {
        return Err(LoadError::invalid(
            "retry.max_delay_ms",
            "must not be shorter than retry.base_delay_ms",
        ));
    }

    Ok(RetrySettings {
        max_retries: retry.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        base_delay_ms,
        max_delay_ms,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_metrics_settings(metrics: RawMetricsSettings) -> Result<MetricsSettings, LoadError> {
    let capacity = metrics.capacity.unwrap_or(DEFAULT_METRICS_CAPACITY);
    if capacity == 0 {
        return Err(LoadError::invalid(
            "metrics.capacity",
            "must be greater than zero",
        ));
    }

    Ok(MetricsSettings { capacity })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    base_url: Option<String>,
    enabled: Option<bool>,
    request_timeout_seconds: Option<u64>,
    environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    ttl_seconds: Option<u64>,
    stale_while_revalidate_seconds: Option<u64>,
    max_age_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRetrySettings {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMetricsSettings {
    capacity: Option<usize>,
}
