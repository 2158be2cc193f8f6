use time::OffsetDateTime;
use time::macros::datetime;

use crate::domain::types::{DocumentStatus, Locale, MemberStatus};

/// Version tag for the shipped dataset; bump when the seeds change.
pub const DATASET_VERSION: &str = "2025.08.1";
pub const DATASET_LAST_UPDATED: OffsetDateTime = datetime!(2025-08-04 09:00 UTC);

pub struct SeedPost {
    pub slug: &'static str,
    pub title: &'static str,
    pub excerpt: &'static str,
    pub body: &'static str,
    pub locale: Locale,
    pub status: DocumentStatus,
    pub published_at: Option<OffsetDateTime>,
    pub updated_at: OffsetDateTime,
}

pub struct SeedStudy {
    pub slug: &'static str,
    pub title: &'static str,
    pub client_name: &'static str,
    pub industry: &'static str,
    pub summary: &'static str,
    pub locale: Locale,
    pub status: DocumentStatus,
    pub published_at: Option<OffsetDateTime>,
}

pub struct SeedMember {
    pub name: &'static str,
    pub role: &'static str,
    pub bio: &'static str,
    pub locale: Locale,
    pub status: MemberStatus,
    pub sort_order: i32,
}

pub static POSTS: [SeedPost; 5] = [
    SeedPost {
        slug: "platform-launch-recap",
        title: "Platform Launch Recap",
        excerpt: "Highlights from the spring platform release and what our customers can expect next.",
        body: "The spring release consolidated three years of integration work into a single deployment surface. \
               Customers migrating from the legacy pipeline keep their existing connectors while gaining \
               scheduled exports, audit trails, and regional data residency controls.",
        locale: Locale::En,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-04-14 08:00 UTC)),
        updated_at: datetime!(2025-04-15 10:30 UTC),
    },
    SeedPost {
        slug: "observability-field-notes",
        title: "Observability Field Notes",
        excerpt: "What two quarters of production telemetry taught us about alert fatigue.",
        body: "We cut our paging volume by two thirds without missing an incident. The trick was not smarter \
               thresholds but fewer, better-owned signals: every alert now names the dashboard that explains it \
               and the runbook that resolves it.",
        locale: Locale::En,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-05-26 08:00 UTC)),
        updated_at: datetime!(2025-05-26 08:00 UTC),
    },
    SeedPost {
        slug: "edge-caching-strategie",
        title: "Edge-Caching-Strategie für Inhalte",
        excerpt: "Wie wir Inhalte näher an unsere europäischen Kunden bringen.",
        body: "Unsere europäischen Landing-Pages werden jetzt aus regionalen Caches bedient. Die Ursprungslast \
               sank um 80 Prozent, und die mittlere Antwortzeit liegt unter 60 Millisekunden.",
        locale: Locale::De,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-06-09 07:00 UTC)),
        updated_at: datetime!(2025-06-10 09:15 UTC),
    },
    SeedPost {
        slug: "architecture-de-contenu",
        title: "Architecture de contenu résiliente",
        excerpt: "Servir du contenu même quand le CMS ne répond plus.",
        body: "Une page marketing ne devrait jamais afficher une erreur parce que le CMS est indisponible. \
               Nous décrivons ici la stratégie de cache et de repli qui garantit une réponse, fraîche ou non.",
        locale: Locale::Fr,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-07-01 07:00 UTC)),
        updated_at: datetime!(2025-07-01 07:00 UTC),
    },
    SeedPost {
        slug: "quarterly-roadmap-preview",
        title: "Quarterly Roadmap Preview",
        excerpt: "A first look at the autumn roadmap.",
        body: "Draft narrative for the autumn roadmap announcement; held back until the dates are confirmed.",
        locale: Locale::En,
        status: DocumentStatus::Draft,
        published_at: None,
        updated_at: datetime!(2025-07-22 16:00 UTC),
    },
];

pub static CASE_STUDIES: [SeedStudy; 3] = [
    SeedStudy {
        slug: "meridian-logistics",
        title: "Meridian Logistics: Tracking a Global Fleet",
        client_name: "Meridian Logistics",
        industry: "Transportation",
        summary: "Meridian consolidated eleven regional tracking systems onto our platform, cutting \
                  dispatch latency from minutes to seconds across 4,000 vehicles.",
        locale: Locale::En,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-03-03 09:00 UTC)),
    },
    SeedStudy {
        slug: "nordbank-compliance",
        title: "Nordbank: Compliance Reporting at Scale",
        client_name: "Nordbank AG",
        industry: "Financial Services",
        summary: "Automated regulatory exports replaced a quarterly manual process, with full audit \
                  lineage for every figure in every filing.",
        locale: Locale::En,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-04-28 09:00 UTC)),
    },
    SeedStudy {
        slug: "atelier-lumen",
        title: "Atelier Lumen : un catalogue multilingue",
        client_name: "Atelier Lumen",
        industry: "Retail",
        summary: "Un catalogue de 12 000 références publié en trois langues depuis une seule source de vérité.",
        locale: Locale::Fr,
        status: DocumentStatus::Published,
        published_at: Some(datetime!(2025-06-16 08:00 UTC)),
    },
];

pub static TEAM_MEMBERS: [SeedMember; 4] = [
    SeedMember {
        name: "Ingrid Halvorsen",
        role: "Chief Executive Officer",
        bio: "Ingrid founded the company after a decade building logistics platforms, and still reviews \
              every incident postmortem personally.",
        locale: Locale::En,
        status: MemberStatus::Active,
        sort_order: 1,
    },
    SeedMember {
        name: "Tomás Herrera",
        role: "Head of Engineering",
        bio: "Tomás leads the platform group and writes the engineering newsletter nobody wants to unsubscribe from.",
        locale: Locale::En,
        status: MemberStatus::Active,
        sort_order: 2,
    },
    SeedMember {
        name: "Amara Diallo",
        role: "Design Director",
        bio: "Amara owns the design system and the accessibility bar every release has to clear.",
        locale: Locale::En,
        status: MemberStatus::Active,
        sort_order: 3,
    },
    SeedMember {
        name: "Felix Brandt",
        role: "Developer Advocate",
        bio: "Felix ran our community programs until mid-2025.",
        locale: Locale::En,
        status: MemberStatus::Inactive,
        sort_order: 4,
    },
];
