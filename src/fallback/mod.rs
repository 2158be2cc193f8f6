//! Static fallback dataset.
//!
//! A versioned, in-crate substitute for every content collection, served
//! when the backend is disabled or failing. Built once at startup and never
//! mutated; validation is diagnostic, not fatal, since this is backup data
//! for an already-degraded state.

mod data;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{BlogPostRecord, CaseStudyRecord, DocumentPage, TeamMemberRecord};
use crate::domain::types::{DocumentStatus, Locale, MemberStatus};

pub use data::DATASET_VERSION;

/// The complete static dataset.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackDataSet {
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    pub blog_posts: Vec<BlogPostRecord>,
    pub case_studies: Vec<CaseStudyRecord>,
    pub team_members: Vec<TeamMemberRecord>,
}

/// Outcome of structural validation over the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Read access to the fallback dataset, mirroring the content client's
/// surface.
pub struct FallbackProvider {
    data: FallbackDataSet,
}

impl FallbackProvider {
    pub fn new() -> Self {
        let blog_posts = data::POSTS
            .iter()
            .map(|seed| BlogPostRecord {
                id: Uuid::new_v4(),
                slug: seed.slug.to_string(),
                title: seed.title.to_string(),
                excerpt: seed.excerpt.to_string(),
                body: seed.body.to_string(),
                locale: seed.locale,
                status: seed.status,
                published_at: seed.published_at,
                updated_at: seed.updated_at,
            })
            .collect();

        let case_studies = data::CASE_STUDIES
            .iter()
            .map(|seed| CaseStudyRecord {
                id: Uuid::new_v4(),
                slug: seed.slug.to_string(),
                title: seed.title.to_string(),
                client_name: seed.client_name.to_string(),
                industry: seed.industry.to_string(),
                summary: seed.summary.to_string(),
                locale: seed.locale,
                status: seed.status,
                published_at: seed.published_at,
            })
            .collect();

        let team_members = data::TEAM_MEMBERS
            .iter()
            .map(|seed| TeamMemberRecord {
                id: Uuid::new_v4(),
                name: seed.name.to_string(),
                role: seed.role.to_string(),
                bio: seed.bio.to_string(),
                locale: seed.locale,
                status: seed.status,
                sort_order: seed.sort_order,
            })
            .collect();

        Self {
            data: FallbackDataSet {
                version: data::DATASET_VERSION,
                last_updated: data::DATASET_LAST_UPDATED,
                blog_posts,
                case_studies,
                team_members,
            },
        }
    }

    pub fn dataset(&self) -> &FallbackDataSet {
        &self.data
    }

    /// Published blog posts, optionally narrowed to a locale.
    pub fn blog_posts(
        &self,
        locale: Option<Locale>,
        limit: usize,
    ) -> DocumentPage<BlogPostRecord> {
        let matching: Vec<BlogPostRecord> = self
            .data
            .blog_posts
            .iter()
            .filter(|post| post.status == DocumentStatus::Published)
            .filter(|post| locale.is_none_or(|l| post.locale == l))
            .cloned()
            .collect();
        paginate(matching, limit)
    }

    pub fn blog_post(&self, slug: &str) -> Option<BlogPostRecord> {
        self.data
            .blog_posts
            .iter()
            .find(|post| post.status == DocumentStatus::Published && post.slug == slug)
            .cloned()
    }

    /// Published case studies, optionally narrowed to a locale.
    pub fn case_studies(
        &self,
        locale: Option<Locale>,
        limit: usize,
    ) -> DocumentPage<CaseStudyRecord> {
        let matching: Vec<CaseStudyRecord> = self
            .data
            .case_studies
            .iter()
            .filter(|study| study.status == DocumentStatus::Published)
            .filter(|study| locale.is_none_or(|l| study.locale == l))
            .cloned()
            .collect();
        paginate(matching, limit)
    }

    pub fn case_study(&self, slug: &str) -> Option<CaseStudyRecord> {
        self.data
            .case_studies
            .iter()
            .find(|study| study.status == DocumentStatus::Published && study.slug == slug)
            .cloned()
    }

    /// Active team members in roster order.
    pub fn team_members(&self, locale: Option<Locale>) -> DocumentPage<TeamMemberRecord> {
        let mut matching: Vec<TeamMemberRecord> = self
            .data
            .team_members
            .iter()
            .filter(|member| member.status == MemberStatus::Active)
            .filter(|member| locale.is_none_or(|l| member.locale == l))
            .cloned()
            .collect();
        matching.sort_by_key(|member| member.sort_order);
        let total = matching.len() as u64;
        DocumentPage {
            docs: matching,
            total_docs: total,
            total_pages: u64::from(total > 0),
        }
    }

    /// Check every record for required identity fields and non-empty
    /// essential content. Failures are reported, never thrown.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        for post in &self.data.blog_posts {
            if post.slug.is_empty() {
                errors.push(format!("blog post {} has an empty slug", post.id));
            }
            if post.title.is_empty() {
                errors.push(format!("blog post `{}` has an empty title", post.slug));
            }
            if post.body.is_empty() && post.status == DocumentStatus::Published {
                errors.push(format!("published blog post `{}` has no body", post.slug));
            }
        }

        for study in &self.data.case_studies {
            if study.slug.is_empty() {
                errors.push(format!("case study {} has an empty slug", study.id));
            }
            if study.title.is_empty() {
                errors.push(format!("case study `{}` has an empty title", study.slug));
            }
            if study.summary.is_empty() {
                errors.push(format!("case study `{}` has no summary", study.slug));
            }
        }

        for member in &self.data.team_members {
            if member.name.is_empty() {
                errors.push(format!("team member {} has an empty name", member.id));
            }
            if member.role.is_empty() {
                errors.push(format!("team member `{}` has no role", member.name));
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

impl Default for FallbackProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<T>(docs: Vec<T>, limit: usize) -> DocumentPage<T> {
    let total = docs.len() as u64;
    let limit = limit.max(1);
    let truncated: Vec<T> = docs.into_iter().take(limit).collect();
    DocumentPage {
        docs: truncated,
        total_docs: total,
        total_pages: total.div_ceil(limit as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_dataset_passes_validation() {
        let provider = FallbackProvider::new();
        let report = provider.validate();
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn blog_posts_exclude_drafts() {
        let provider = FallbackProvider::new();
        let page = provider.blog_posts(None, 10);
        assert!(page.docs.iter().all(|p| p.status == DocumentStatus::Published));
        assert!(
            !page
                .docs
                .iter()
                .any(|p| p.slug == "quarterly-roadmap-preview")
        );
    }

    #[test]
    fn locale_filter_narrows_results() {
        let provider = FallbackProvider::new();
        let page = provider.blog_posts(Some(Locale::De), 10);
        assert!(!page.docs.is_empty());
        assert!(page.docs.iter().all(|p| p.locale == Locale::De));
    }

    #[test]
    fn limit_truncates_but_totals_count_everything() {
        let provider = FallbackProvider::new();
        let page = provider.blog_posts(None, 1);
        assert_eq!(page.docs.len(), 1);
        assert!(page.total_docs > 1);
        assert_eq!(page.total_pages, page.total_docs);
    }

    #[test]
    fn slug_lookup_misses_return_none() {
        let provider = FallbackProvider::new();
        assert!(provider.blog_post("nonexistent-slug").is_none());
        assert!(provider.case_study("nonexistent-slug").is_none());
    }

    #[test]
    fn team_roster_is_active_only_and_ordered() {
        let provider = FallbackProvider::new();
        let page = provider.team_members(None);
        assert!(page.docs.iter().all(|m| m.status == MemberStatus::Active));
        let orders: Vec<i32> = page.docs.iter().map(|m| m.sort_order).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        assert_eq!(orders, sorted);
        assert!(!page.docs.iter().any(|m| m.name == "Felix Brandt"));
    }
}
