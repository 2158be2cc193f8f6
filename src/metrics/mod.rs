//! In-process performance ledger.
//!
//! A capped, append-only list of [`PerformanceMetric`] records backing the
//! facade's diagnostics: response timings, cache hit rate, and error rate.
//! Operational counters go to the `metrics` facade as well so external
//! recorders see the same signals.

use std::collections::VecDeque;
use std::sync::Mutex;

use metrics::{counter, histogram};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::debug;

use crate::sync::mutex_lock;

const SOURCE: &str = "metrics::monitor";

const METRIC_REQUEST_MS: &str = "corriere_request_ms";
const METRIC_BACKEND_ERROR: &str = "corriere_backend_error_total";

/// Default number of retained metrics before the oldest are evicted.
pub const DEFAULT_LEDGER_CAPACITY: usize = 1000;

const UNIT_MS: &str = "ms";
const UNIT_COUNT: &str = "count";

const CACHE_HIT_NAME: &str = "cache_hit";
const CACHE_MISS_NAME: &str = "cache_miss";
const DURATION_SUFFIX: &str = "_duration";
const ERROR_SUFFIX: &str = "_error";

/// A single recorded measurement.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetric {
    pub name: String,
    pub value: f64,
    pub unit: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl PerformanceMetric {
    fn count(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 1.0,
            unit: UNIT_COUNT,
            recorded_at: OffsetDateTime::now_utc(),
            context: None,
        }
    }

    fn duration_ms(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            unit: UNIT_MS,
            recorded_at: OffsetDateTime::now_utc(),
            context: None,
        }
    }
}

/// Aggregate view over the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub uptime_seconds: f64,
    pub total_metrics: usize,
    pub average_response_time_ms: f64,
    /// Error-tagged metrics as a percentage of response-time metrics.
    pub error_rate: f64,
    /// Cache hits as a percentage of all recorded cache lookups.
    pub cache_hit_rate: f64,
    /// Resident set size, when the platform exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage_bytes: Option<u64>,
}

/// Point-in-time snapshot attached to a measured backend request.
#[derive(Debug, Clone, Serialize)]
pub struct CmsMetrics {
    pub response_time_ms: f64,
    pub cache_hit_rate: f64,
    pub error_rate: f64,
    pub request_count: usize,
}

/// Process-wide metrics ledger with ring-buffer eviction.
///
/// Constructed once by the composition root and shared via `Arc`; tests
/// build fresh instances instead of relying on globals.
pub struct PerformanceMonitor {
    capacity: usize,
    started_at: Instant,
    ledger: Mutex<VecDeque<PerformanceMetric>>,
}

impl PerformanceMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            started_at: Instant::now(),
            ledger: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a metric, evicting the oldest entries beyond capacity.
    pub fn record(&self, metric: PerformanceMetric) {
        let mut ledger = mutex_lock(&self.ledger, SOURCE, "record");
        ledger.push_back(metric);
        while ledger.len() > self.capacity {
            ledger.pop_front();
        }
    }

    pub fn record_cache_hit(&self) {
        self.record(PerformanceMetric::count(CACHE_HIT_NAME));
    }

    pub fn record_cache_miss(&self) {
        self.record(PerformanceMetric::count(CACHE_MISS_NAME));
    }

    /// Run a backend operation, recording its duration and outcome.
    ///
    /// Returns the operation's result together with a point-in-time
    /// snapshot of the ledger's aggregate rates.
    pub async fn measure<T, E, F>(&self, operation: &str, fut: F) -> (Result<T, E>, CmsMetrics)
    where
        E: std::fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        let started = Instant::now();
        let result = fut.await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        histogram!(METRIC_REQUEST_MS, "operation" => operation.to_string()).record(elapsed_ms);
        self.record(PerformanceMetric::duration_ms(
            format!("{operation}{DURATION_SUFFIX}"),
            elapsed_ms,
        ));

        if let Err(err) = &result {
            counter!(METRIC_BACKEND_ERROR, "operation" => operation.to_string()).increment(1);
            self.record(PerformanceMetric {
                name: format!("{operation}{ERROR_SUFFIX}"),
                value: 1.0,
                unit: UNIT_COUNT,
                recorded_at: OffsetDateTime::now_utc(),
                context: Some(err.to_string()),
            });
        }

        let snapshot = self.cms_snapshot(elapsed_ms);
        debug!(
            target: "corriere::metrics",
            operation,
            elapsed_ms,
            success = result.is_ok(),
            "measured backend request"
        );
        (result, snapshot)
    }

    /// Aggregate view over everything currently retained.
    pub fn summary(&self) -> PerformanceSummary {
        let ledger = mutex_lock(&self.ledger, SOURCE, "summary");

        let mut response_count = 0usize;
        let mut response_total_ms = 0.0f64;
        let mut error_count = 0usize;
        let mut hits = 0usize;
        let mut misses = 0usize;

        for metric in ledger.iter() {
            if metric.name.ends_with(DURATION_SUFFIX) && metric.unit == UNIT_MS {
                response_count += 1;
                response_total_ms += metric.value;
            } else if metric.name.ends_with(ERROR_SUFFIX) {
                error_count += 1;
            } else if metric.name == CACHE_HIT_NAME {
                hits += 1;
            } else if metric.name == CACHE_MISS_NAME {
                misses += 1;
            }
        }

        PerformanceSummary {
            uptime_seconds: self.started_at.elapsed().as_secs_f64(),
            total_metrics: ledger.len(),
            average_response_time_ms: if response_count > 0 {
                response_total_ms / response_count as f64
            } else {
                0.0
            },
            error_rate: percentage(error_count, response_count),
            cache_hit_rate: percentage(hits, hits + misses),
            memory_usage_bytes: process_memory_bytes(),
        }
    }

    /// Error rate scoped to operations whose name starts with `prefix`.
    pub fn error_rate_for(&self, prefix: &str) -> f64 {
        let ledger = mutex_lock(&self.ledger, SOURCE, "error_rate_for");
        let errors = ledger
            .iter()
            .filter(|m| m.name.starts_with(prefix) && m.name.ends_with(ERROR_SUFFIX))
            .count();
        let responses = ledger
            .iter()
            .filter(|m| m.name.starts_with(prefix) && m.name.ends_with(DURATION_SUFFIX))
            .count();
        percentage(errors, responses)
    }

    fn cms_snapshot(&self, response_time_ms: f64) -> CmsMetrics {
        let ledger = mutex_lock(&self.ledger, SOURCE, "cms_snapshot");

        let mut hits = 0usize;
        let mut misses = 0usize;
        let mut errors = 0usize;
        let mut responses = 0usize;

        for metric in ledger.iter() {
            if metric.name == CACHE_HIT_NAME {
                hits += 1;
            } else if metric.name == CACHE_MISS_NAME {
                misses += 1;
            } else if metric.name.ends_with(ERROR_SUFFIX) {
                errors += 1;
            } else if metric.name.ends_with(DURATION_SUFFIX) {
                responses += 1;
            }
        }

        CmsMetrics {
            response_time_ms,
            cache_hit_rate: percentage(hits, hits + misses),
            error_rate: percentage(errors, responses),
            request_count: responses,
        }
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(target_os = "linux")]
fn process_memory_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * 4096)
}

#[cfg(not(target_os = "linux"))]
fn process_memory_bytes() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_counts_all_recorded_cache_events() {
        let monitor = PerformanceMonitor::new(64);
        monitor.record_cache_hit();
        monitor.record_cache_hit();
        monitor.record_cache_hit();
        monitor.record_cache_miss();

        assert_eq!(monitor.summary().cache_hit_rate, 75.0);
    }

    #[test]
    fn ledger_evicts_oldest_beyond_capacity() {
        let monitor = PerformanceMonitor::new(10);
        for i in 0..15 {
            monitor.record(PerformanceMetric {
                name: format!("m{i}"),
                value: f64::from(i),
                unit: UNIT_COUNT,
                recorded_at: OffsetDateTime::now_utc(),
                context: None,
            });
        }

        let summary = monitor.summary();
        assert_eq!(summary.total_metrics, 10);

        let ledger = monitor.ledger.lock().expect("ledger lock");
        assert_eq!(ledger.front().expect("oldest retained").name, "m5");
        assert_eq!(ledger.back().expect("newest retained").name, "m14");
    }

    #[tokio::test]
    async fn measure_records_duration_and_success() {
        let monitor = PerformanceMonitor::new(64);
        let (result, metrics) = monitor
            .measure("blog_posts", async { Ok::<_, std::io::Error>(3) })
            .await;

        assert_eq!(result.expect("operation succeeds"), 3);
        assert_eq!(metrics.request_count, 1);
        assert_eq!(metrics.error_rate, 0.0);
        assert_eq!(monitor.summary().error_rate, 0.0);
    }

    #[tokio::test]
    async fn measure_records_failures_into_error_rate() {
        let monitor = PerformanceMonitor::new(64);
        let (result, _) = monitor
            .measure("case_studies", async {
                Err::<(), _>(std::io::Error::other("backend down"))
            })
            .await;
        assert!(result.is_err());

        let (result, metrics) = monitor
            .measure("case_studies", async { Ok::<_, std::io::Error>(()) })
            .await;
        assert!(result.is_ok());

        // 1 error over 2 measured responses.
        assert_eq!(metrics.error_rate, 50.0);
        assert_eq!(monitor.summary().error_rate, 50.0);
        assert_eq!(monitor.error_rate_for("case_studies"), 50.0);
        assert_eq!(monitor.error_rate_for("blog_posts"), 0.0);
    }

    #[test]
    fn summary_averages_response_times() {
        let monitor = PerformanceMonitor::new(64);
        monitor.record(PerformanceMetric::duration_ms("a_duration", 10.0));
        monitor.record(PerformanceMetric::duration_ms("b_duration", 30.0));

        assert_eq!(monitor.summary().average_response_time_ms, 20.0);
    }
}
