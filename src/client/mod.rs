//! Content backend client.
//!
//! Every read follows the same path: a fresh cache hit returns without I/O;
//! a usable-stale hit returns immediately while a detached background
//! refresh updates the entry; a miss fetches through the retry handler and
//! stores the result. Concurrent cold-cache reads of the same key are not
//! coalesced; both fetches converge on the same cache entry.

pub mod error;
mod query;
mod retry;

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheStore, RequestSignature};
use crate::config::BackendSettings;
use crate::domain::entities::{BlogPostRecord, CaseStudyRecord, DocumentPage, TeamMemberRecord};
use crate::domain::types::{DocumentStatus, Locale, MemberStatus};

pub use error::{ClientError, Retryability};
pub use query::DocumentQuery;
pub use retry::{RetryConfig, RetryHandler};

/// Backend collection slugs.
pub const BLOG_POSTS: &str = "blog-posts";
pub const CASE_STUDIES: &str = "case-studies";
pub const TEAM_MEMBERS: &str = "team-members";

/// Client over the content backend's paginated collection API.
#[derive(Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base: Url,
    retry: RetryHandler,
    cache: Arc<CacheStore>,
}

impl ContentClient {
    pub fn new(
        backend: &BackendSettings,
        retry: RetryConfig,
        cache: Arc<CacheStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .timeout(backend.request_timeout)
            .build()
            .map_err(ClientError::from_transport)?;

        Ok(Self {
            http,
            base: backend.base_url.clone(),
            retry: RetryHandler::new(retry),
            cache,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("corriere/", env!("CARGO_PKG_VERSION"))
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// List blog posts matching `query`.
    pub async fn blog_posts(
        &self,
        query: DocumentQuery,
    ) -> Result<DocumentPage<BlogPostRecord>, ClientError> {
        self.fetch_page(BLOG_POSTS, &query).await
    }

    /// Look up a single published blog post by slug.
    pub async fn blog_post_by_slug(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> Result<Option<BlogPostRecord>, ClientError> {
        let query = slug_query(slug, locale);
        let page = self.fetch_page::<BlogPostRecord>(BLOG_POSTS, &query).await?;
        Ok(page.docs.into_iter().next())
    }

    /// List case studies matching `query`.
    pub async fn case_studies(
        &self,
        query: DocumentQuery,
    ) -> Result<DocumentPage<CaseStudyRecord>, ClientError> {
        self.fetch_page(CASE_STUDIES, &query).await
    }

    /// Look up a single published case study by slug.
    pub async fn case_study_by_slug(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> Result<Option<CaseStudyRecord>, ClientError> {
        let query = slug_query(slug, locale);
        let page = self
            .fetch_page::<CaseStudyRecord>(CASE_STUDIES, &query)
            .await?;
        Ok(page.docs.into_iter().next())
    }

    /// List active team members.
    pub async fn team_members(
        &self,
        locale: Option<Locale>,
    ) -> Result<DocumentPage<TeamMemberRecord>, ClientError> {
        let mut query = DocumentQuery::new().member_status(MemberStatus::Active);
        if let Some(locale) = locale {
            query = query.locale(locale);
        }
        self.fetch_page(TEAM_MEMBERS, &query).await
    }

    /// The uniform read path: fresh hit, stale hit plus detached refresh,
    /// or retry-wrapped fetch.
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        query: &DocumentQuery,
    ) -> Result<DocumentPage<T>, ClientError> {
        let signature = RequestSignature::get(query.endpoint(collection));

        if let Some(page) = self.cache.get::<DocumentPage<T>>(&signature) {
            return Ok(page);
        }

        if let Some(page) = self.cache.get_stale::<DocumentPage<T>>(&signature) {
            self.spawn_refresh(collection, query.clone(), signature);
            return Ok(page);
        }

        let value = self.fetch_remote(collection, query).await?;
        self.cache.set(&signature, &value);
        decode_page(value)
    }

    /// Fetch fresh data and update the cache without blocking the caller.
    /// Failures are logged and dropped; the caller already has stale data.
    fn spawn_refresh(
        &self,
        collection: &'static str,
        query: DocumentQuery,
        signature: RequestSignature,
    ) {
        let client = self.clone();
        tokio::spawn(async move {
            match client.fetch_remote(collection, &query).await {
                Ok(value) => {
                    client.cache.set(&signature, &value);
                    debug!(
                        target: "corriere::client",
                        collection,
                        "background refresh replaced stale entry"
                    );
                }
                Err(err) => {
                    warn!(
                        target: "corriere::client",
                        collection,
                        error = %err,
                        "background refresh failed, stale entry remains"
                    );
                }
            }
        });
    }

    async fn fetch_remote(
        &self,
        collection: &'static str,
        query: &DocumentQuery,
    ) -> Result<Value, ClientError> {
        self.retry
            .execute(collection, || self.request_value(collection, query))
            .await
    }

    async fn request_value(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Value, ClientError> {
        let url = self.base.join(collection)?;
        let response = self
            .http
            .get(url)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), detail));
        }

        response
            .json::<Value>()
            .await
            .map_err(ClientError::from_transport)
    }
}

fn slug_query(slug: &str, locale: Option<Locale>) -> DocumentQuery {
    let mut query = DocumentQuery::new()
        .status(DocumentStatus::Published)
        .slug(slug)
        .limit(1);
    if let Some(locale) = locale {
        query = query.locale(locale);
    }
    query
}

fn decode_page<T: DeserializeOwned>(value: Value) -> Result<DocumentPage<T>, ClientError> {
    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}
