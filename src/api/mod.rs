//! Public content-access facade.
//!
//! Every read goes through here: backend first (via cache and retry), static
//! fallback on failure. Callers never see a transport error, only a result
//! tagged with where the data came from.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{CachePolicy, CacheStats, CacheStore};
use crate::client::{ClientError, ContentClient, DocumentQuery, RetryConfig};
use crate::config::Settings;
use crate::domain::entities::{
    BlogPostRecord, CaseStudyRecord, DocumentPage, TeamMemberRecord,
};
use crate::domain::types::{ContentSource, DocumentStatus, Locale};
use crate::fallback::{FallbackProvider, ValidationReport};
use crate::metrics::{CmsMetrics, PerformanceMonitor, PerformanceSummary};

const METRIC_FALLBACK_SERVED: &str = "corriere_fallback_served_total";

/// A list of documents plus where they came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResult<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub total_pages: u64,
    pub source: ContentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CmsMetrics>,
}

impl<T> ContentResult<T> {
    fn from_page(page: DocumentPage<T>, source: ContentSource, metrics: Option<CmsMetrics>) -> Self {
        Self {
            docs: page.docs,
            total_docs: page.total_docs,
            total_pages: page.total_pages,
            source,
            metrics,
        }
    }
}

/// A single-document lookup plus where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult<T> {
    pub doc: Option<T>,
    pub source: ContentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CmsMetrics>,
}

/// Snapshot returned by [`ContentApi::performance_diagnostics`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub environment: String,
    pub backend_enabled: bool,
    pub fallback_dataset_version: &'static str,
    pub performance: PerformanceSummary,
    pub cache: CacheStats,
}

/// Composition root and sole entry point for content reads.
pub struct ContentApi {
    client: ContentClient,
    fallback: FallbackProvider,
    cache: Arc<CacheStore>,
    monitor: Arc<PerformanceMonitor>,
    backend_enabled: bool,
    environment: String,
}

impl ContentApi {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let monitor = Arc::new(PerformanceMonitor::new(settings.metrics.capacity));
        let cache = Arc::new(CacheStore::new(
            CachePolicy::from(&settings.cache),
            Arc::clone(&monitor),
        ));
        let client = ContentClient::new(
            &settings.backend,
            RetryConfig::from(&settings.retry),
            Arc::clone(&cache),
        )?;

        Ok(Self {
            client,
            fallback: FallbackProvider::new(),
            cache,
            monitor,
            backend_enabled: settings.backend.enabled,
            environment: settings.backend.environment.clone(),
        })
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    /// Published blog posts, newest-first as the backend orders them.
    ///
    /// `fallback_override` replaces the static dataset when degradation is
    /// served, for callers that carry their own substitute content.
    pub async fn published_blog_posts(
        &self,
        locale: Option<Locale>,
        limit: u32,
        fallback_override: Option<DocumentPage<BlogPostRecord>>,
    ) -> ContentResult<BlogPostRecord> {
        if !self.backend_enabled {
            return self.fallback_posts(locale, limit, fallback_override, None);
        }

        let query = list_query(locale, limit);
        let (result, metrics) = self
            .monitor
            .measure("blog_posts", self.client.blog_posts(query))
            .await;
        match result {
            Ok(page) => ContentResult::from_page(page, ContentSource::Cms, Some(metrics)),
            Err(error) => {
                warn!(target: "corriere::api", %error, "blog post fetch failed, serving fallback");
                self.fallback_posts(locale, limit, fallback_override, Some(metrics))
            }
        }
    }

    /// Look up a published blog post by slug.
    pub async fn blog_post(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> LookupResult<BlogPostRecord> {
        if !self.backend_enabled {
            record_fallback("blog_post");
            return LookupResult {
                doc: self.fallback.blog_post(slug),
                source: ContentSource::Fallback,
                metrics: None,
            };
        }

        let (result, metrics) = self
            .monitor
            .measure("blog_post", self.client.blog_post_by_slug(slug, locale))
            .await;
        match result {
            Ok(doc) => LookupResult {
                doc,
                source: ContentSource::Cms,
                metrics: Some(metrics),
            },
            Err(error) => {
                warn!(target: "corriere::api", %error, slug, "blog post lookup failed, serving fallback");
                record_fallback("blog_post");
                LookupResult {
                    doc: self.fallback.blog_post(slug),
                    source: ContentSource::Fallback,
                    metrics: Some(metrics),
                }
            }
        }
    }

    /// Published case studies.
    pub async fn published_case_studies(
        &self,
        locale: Option<Locale>,
        limit: u32,
        fallback_override: Option<DocumentPage<CaseStudyRecord>>,
    ) -> ContentResult<CaseStudyRecord> {
        if !self.backend_enabled {
            return self.fallback_studies(locale, limit, fallback_override, None);
        }

        let query = list_query(locale, limit);
        let (result, metrics) = self
            .monitor
            .measure("case_studies", self.client.case_studies(query))
            .await;
        match result {
            Ok(page) => ContentResult::from_page(page, ContentSource::Cms, Some(metrics)),
            Err(error) => {
                warn!(target: "corriere::api", %error, "case study fetch failed, serving fallback");
                self.fallback_studies(locale, limit, fallback_override, Some(metrics))
            }
        }
    }

    /// Look up a published case study by slug.
    pub async fn case_study(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> LookupResult<CaseStudyRecord> {
        if !self.backend_enabled {
            record_fallback("case_study");
            return LookupResult {
                doc: self.fallback.case_study(slug),
                source: ContentSource::Fallback,
                metrics: None,
            };
        }

        let (result, metrics) = self
            .monitor
            .measure("case_study", self.client.case_study_by_slug(slug, locale))
            .await;
        match result {
            Ok(doc) => LookupResult {
                doc,
                source: ContentSource::Cms,
                metrics: Some(metrics),
            },
            Err(error) => {
                warn!(target: "corriere::api", %error, slug, "case study lookup failed, serving fallback");
                record_fallback("case_study");
                LookupResult {
                    doc: self.fallback.case_study(slug),
                    source: ContentSource::Fallback,
                    metrics: Some(metrics),
                }
            }
        }
    }

    /// Active team members in roster order.
    pub async fn team_members(
        &self,
        locale: Option<Locale>,
        fallback_override: Option<DocumentPage<TeamMemberRecord>>,
    ) -> ContentResult<TeamMemberRecord> {
        if !self.backend_enabled {
            return self.fallback_members(locale, fallback_override, None);
        }

        let (result, metrics) = self
            .monitor
            .measure("team_members", self.client.team_members(locale))
            .await;
        match result {
            Ok(page) => ContentResult::from_page(page, ContentSource::Cms, Some(metrics)),
            Err(error) => {
                warn!(target: "corriere::api", %error, "team member fetch failed, serving fallback");
                self.fallback_members(locale, fallback_override, Some(metrics))
            }
        }
    }

    /// Warm the cache with the collections every page needs.
    pub async fn preload_critical_content(&self, locale: Option<Locale>) {
        let (posts, studies, members) = tokio::join!(
            self.published_blog_posts(locale, 10, None),
            self.published_case_studies(locale, 10, None),
            self.team_members(locale, None),
        );
        info!(
            target: "corriere::api",
            blog_posts = posts.docs.len(),
            case_studies = studies.docs.len(),
            team_members = members.docs.len(),
            "critical content preloaded"
        );
    }

    /// Drop cached responses, optionally only those whose key contains
    /// `fragment`.
    pub fn clear_cache(&self, fragment: Option<&str>) {
        self.cache.clear(fragment);
    }

    pub fn validate_fallback_data(&self) -> ValidationReport {
        self.fallback.validate()
    }

    pub fn performance_diagnostics(&self) -> Diagnostics {
        Diagnostics {
            environment: self.environment.clone(),
            backend_enabled: self.backend_enabled,
            fallback_dataset_version: crate::fallback::DATASET_VERSION,
            performance: self.monitor.summary(),
            cache: self.cache.stats(),
        }
    }

    fn fallback_posts(
        &self,
        locale: Option<Locale>,
        limit: u32,
        fallback_override: Option<DocumentPage<BlogPostRecord>>,
        metrics: Option<CmsMetrics>,
    ) -> ContentResult<BlogPostRecord> {
        record_fallback("blog_posts");
        let page =
            fallback_override.unwrap_or_else(|| self.fallback.blog_posts(locale, limit as usize));
        ContentResult::from_page(page, ContentSource::Fallback, metrics)
    }

    fn fallback_studies(
        &self,
        locale: Option<Locale>,
        limit: u32,
        fallback_override: Option<DocumentPage<CaseStudyRecord>>,
        metrics: Option<CmsMetrics>,
    ) -> ContentResult<CaseStudyRecord> {
        record_fallback("case_studies");
        let page = fallback_override
            .unwrap_or_else(|| self.fallback.case_studies(locale, limit as usize));
        ContentResult::from_page(page, ContentSource::Fallback, metrics)
    }

    fn fallback_members(
        &self,
        locale: Option<Locale>,
        fallback_override: Option<DocumentPage<TeamMemberRecord>>,
        metrics: Option<CmsMetrics>,
    ) -> ContentResult<TeamMemberRecord> {
        record_fallback("team_members");
        let page = fallback_override.unwrap_or_else(|| self.fallback.team_members(locale));
        ContentResult::from_page(page, ContentSource::Fallback, metrics)
    }
}

fn record_fallback(operation: &str) {
    counter!(METRIC_FALLBACK_SERVED, "operation" => operation.to_string()).increment(1);
}

fn list_query(locale: Option<Locale>, limit: u32) -> DocumentQuery {
    let mut query = DocumentQuery::new()
        .status(DocumentStatus::Published)
        .limit(limit);
    if let Some(locale) = locale {
        query = query.locale(locale);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BackendSettings, CacheSettings, LogFormat, LoggingSettings, MetricsSettings,
        RetrySettings,
    };
    use std::time::Duration;
    use url::Url;

    fn disabled_settings() -> Settings {
        Settings {
            backend: BackendSettings {
                base_url: Url::parse("http://127.0.0.1:1/api/").unwrap(),
                enabled: false,
                request_timeout: Duration::from_secs(5),
                environment: "test".into(),
            },
            cache: CacheSettings::default(),
            retry: RetrySettings::default(),
            logging: LoggingSettings {
                level: tracing::level_filters::LevelFilter::WARN,
                format: LogFormat::Compact,
            },
            metrics: MetricsSettings::default(),
        }
    }

    #[tokio::test]
    async fn disabled_backend_serves_fallback_without_io() {
        let api = ContentApi::new(&disabled_settings()).unwrap();

        let posts = api.published_blog_posts(None, 10, None).await;
        assert_eq!(posts.source, ContentSource::Fallback);
        assert!(!posts.docs.is_empty());
        assert!(posts.metrics.is_none());

        let members = api.team_members(None, None).await;
        assert_eq!(members.source, ContentSource::Fallback);
        assert!(!members.docs.is_empty());
    }

    #[tokio::test]
    async fn caller_supplied_fallback_takes_precedence() {
        let api = ContentApi::new(&disabled_settings()).unwrap();
        let substitute = DocumentPage::<BlogPostRecord>::empty();
        let posts = api.published_blog_posts(None, 10, Some(substitute)).await;
        assert_eq!(posts.source, ContentSource::Fallback);
        assert!(posts.docs.is_empty());
    }

    #[tokio::test]
    async fn disabled_backend_slug_miss_is_none() {
        let api = ContentApi::new(&disabled_settings()).unwrap();
        let lookup = api.blog_post("no-such-slug", None).await;
        assert_eq!(lookup.source, ContentSource::Fallback);
        assert!(lookup.doc.is_none());
    }

    #[tokio::test]
    async fn diagnostics_reflect_configuration() {
        let api = ContentApi::new(&disabled_settings()).unwrap();
        let diag = api.performance_diagnostics();
        assert_eq!(diag.environment, "test");
        assert!(!diag.backend_enabled);
        assert_eq!(diag.fallback_dataset_version, crate::fallback::DATASET_VERSION);
    }
}
