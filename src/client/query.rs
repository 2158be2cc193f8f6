//! Backend list-query construction.
//!
//! Pairs are emitted in a fixed order so two logically identical queries
//! produce the same endpoint string (and therefore the same cache key).
//! Absent fields are omitted entirely, never sent empty.

use crate::domain::types::{DocumentStatus, Locale, MemberStatus};

/// Query parameters for a collection list request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    status: Option<&'static str>,
    slug: Option<String>,
    limit: Option<u32>,
    page: Option<u32>,
    locale: Option<Locale>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status.as_str());
        self
    }

    pub fn member_status(mut self, status: MemberStatus) -> Self {
        self.status = Some(status.as_str());
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Query pairs in emission order: status, slug, limit, page, locale.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("where[status][equals]".to_string(), status.to_string()));
        }
        if let Some(slug) = &self.slug {
            pairs.push(("where[slug][equals]".to_string(), slug.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(locale) = self.locale {
            pairs.push(("locale".to_string(), locale.as_str().to_string()));
        }
        pairs
    }

    /// The `collection?key=value&…` endpoint string used for cache keys.
    pub fn endpoint(&self, collection: &str) -> String {
        let pairs = self.to_pairs();
        if pairs.is_empty() {
            return collection.to_string();
        }
        let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{collection}?{}", query.join("&"))
    }
}
