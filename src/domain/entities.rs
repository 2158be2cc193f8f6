//! Content documents mirrored from the backend's collection schemas.
//!
//! These are read-only from this crate's perspective: retrieved, cached,
//! and handed to page-rendering code, never created or mutated here.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{DocumentStatus, Locale, MemberStatus};

/// A blog post document from the `blog-posts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub locale: Locale,
    pub status: DocumentStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A case study document from the `case-studies` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub client_name: String,
    pub industry: String,
    pub summary: String,
    pub locale: Locale,
    pub status: DocumentStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// A team member document from the `team-members` collection.
///
/// Team members have no slug; they are listed, never fetched individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRecord {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub locale: Locale,
    pub status: MemberStatus,
    pub sort_order: i32,
}

/// The backend's paginated list envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub total_pages: u64,
}

impl<T> DocumentPage<T> {
    /// An empty page, used when even fallback data has nothing to offer.
    pub fn empty() -> Self {
        Self {
            docs: Vec::new(),
            total_docs: 0,
            total_pages: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_post_deserializes_backend_shape() {
        let payload = serde_json::json!({
            "id": "74a0a2f4-3c74-4ba1-9a63-e357b2f5b316",
            "slug": "launch-notes",
            "title": "Launch Notes",
            "excerpt": "What shipped this quarter.",
            "body": "Full launch narrative.",
            "locale": "en",
            "status": "published",
            "publishedAt": "2025-04-01T09:00:00Z",
            "updatedAt": "2025-04-02T10:30:00Z"
        });

        let post: BlogPostRecord = serde_json::from_value(payload).expect("deserialize");
        assert_eq!(post.slug, "launch-notes");
        assert_eq!(post.status, DocumentStatus::Published);
        assert!(post.published_at.is_some());
    }

    #[test]
    fn missing_published_at_is_none() {
        let payload = serde_json::json!({
            "id": "74a0a2f4-3c74-4ba1-9a63-e357b2f5b316",
            "slug": "draft-notes",
            "title": "Draft Notes",
            "excerpt": "",
            "body": "",
            "locale": "de",
            "status": "draft",
            "updatedAt": "2025-04-02T10:30:00Z"
        });

        let post: BlogPostRecord = serde_json::from_value(payload).expect("deserialize");
        assert!(post.published_at.is_none());
    }

    #[test]
    fn page_envelope_uses_camel_case() {
        let payload = serde_json::json!({
            "docs": [],
            "totalDocs": 42,
            "totalPages": 5
        });

        let page: DocumentPage<BlogPostRecord> =
            serde_json::from_value(payload).expect("deserialize");
        assert_eq!(page.total_docs, 42);
        assert_eq!(page.total_pages, 5);
        assert!(page.is_empty());
    }
}
