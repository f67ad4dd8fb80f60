//! Built-in content shown when the store has nothing to offer.
//!
//! Store results reach the page handlers as a [`ContentSet`]. The choice between
//! stored rows and the fallback set is made exactly once, by
//! [`ContentSet::or_fallback`], so a failed fetch and an empty table render the same
//! way while the failure still shows up in the logs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{AboutPageSection, ContentSource, GrowthBlueprint, Service},
};

/// ContentSet
///
/// Rows fetched for a public page, or nothing usable.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSet<T> {
    Fetched(Vec<T>),
    Empty,
}

impl<T> ContentSet<T> {
    /// Folds a store result into a content set. Failures are logged, never surfaced.
    pub fn from_result(result: Result<Vec<T>, StoreError>, what: &str) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => ContentSet::Empty,
            Ok(rows) => ContentSet::Fetched(rows),
            Err(e) => {
                tracing::error!(error = %e, content = what, "content fetch failed, using fallback");
                ContentSet::Empty
            }
        }
    }

    pub fn or_fallback(self, fallback: impl FnOnce() -> Vec<T>) -> (Vec<T>, ContentSource) {
        match self {
            ContentSet::Fetched(rows) => (rows, ContentSource::Store),
            ContentSet::Empty => (fallback(), ContentSource::Fallback),
        }
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn service(n: u128, title: &str, slug: &str, description: &str, features: &[&str]) -> Service {
    Service {
        id: Uuid::from_u128(0x5e41_0000 + n),
        title: title.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        content: None,
        image_url: None,
        features: strings(features),
        published: true,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn services() -> Vec<Service> {
    vec![
        service(
            1,
            "Content Marketing",
            "content-marketing",
            "Create compelling content that engages your audience and builds brand authority. \
             Our data-backed approach ensures your content resonates with your target users.",
            &[
                "SEO-optimized blog content",
                "Whitepapers & case studies",
                "Email campaigns",
                "Social media strategy",
            ],
        ),
        service(
            2,
            "Lead Generation",
            "lead-generation",
            "Drive high-quality leads with targeted campaigns specifically designed for SaaS \
             companies. We identify and engage potential customers at every stage of the funnel.",
            &[
                "Qualified lead targeting",
                "Conversion optimization",
                "Marketing automation",
                "Lead nurturing workflows",
            ],
        ),
        service(
            3,
            "Market Research",
            "market-research",
            "Gain deep insights into your market with comprehensive research and competitor \
             analysis. Understand trends, gaps, and opportunities within your niche.",
            &[
                "Competitor analysis",
                "Market sizing",
                "User interviews",
                "Trend forecasting",
            ],
        ),
        service(
            4,
            "Growth Strategy",
            "growth-strategy",
            "Develop data-backed growth strategies that align with your business goals. Our \
             experts help you identify the most effective channels for sustainable growth.",
            &[
                "Channel optimization",
                "Pricing strategy",
                "Expansion planning",
                "Retention analysis",
            ],
        ),
    ]
}

fn blueprint(n: u128, title: &str, slug: &str, description: &str) -> GrowthBlueprint {
    GrowthBlueprint {
        id: Uuid::from_u128(0xb1_0000 + n),
        title: title.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        content: None,
        image_url: None,
        categories: Vec::new(),
        tags: Vec::new(),
        published: true,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub fn blueprints() -> Vec<GrowthBlueprint> {
    vec![
        blueprint(
            1,
            "Founder Interviews",
            "founder-interviews",
            "In-depth conversations with successful SaaS founders about their growth journeys",
        ),
        blueprint(
            2,
            "Case Studies",
            "case-studies",
            "Detailed analysis of real SaaS companies that achieved product-market fit",
        ),
        blueprint(
            3,
            "Project Breakdowns",
            "project-breakdowns",
            "Technical and strategic breakdown of real-world SaaS products and features",
        ),
        blueprint(
            4,
            "Success Stories",
            "success-stories",
            "How founders overcame challenges and scaled their SaaS businesses effectively",
        ),
    ]
}

fn section(n: u128, name: &str, title: &str, content: &str) -> AboutPageSection {
    AboutPageSection {
        id: Uuid::from_u128(0xab_0000 + n),
        section_name: name.to_string(),
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        image_url: None,
        order_index: i32::try_from(n).ok(),
        updated_at: epoch(),
    }
}

pub fn about_sections() -> Vec<AboutPageSection> {
    vec![
        section(
            1,
            "mission",
            "Our Mission",
            "<p>Our mission is to empower SaaS founders with data-driven research and insights \
             that lead to informed decisions and sustainable growth. We believe that success in \
             the competitive SaaS landscape requires a deep understanding of market dynamics, \
             user needs, and emerging trends.</p>",
        ),
        section(
            2,
            "vision",
            "Our Vision",
            "<p>We envision a future where every SaaS company, regardless of size, has access to \
             high-quality market research and data-driven strategies that were once only \
             available to enterprise organizations with substantial budgets.</p>",
        ),
        section(
            3,
            "story",
            "Our Story",
            "<p>Fusion Focus was born from a simple observation: SaaS founders were making \
             critical business decisions based on intuition rather than data.</p>\
             <p>We started as a small research team in 2024, dedicated to providing affordable, \
             high-quality market insights to early-stage SaaS companies.</p>",
        ),
        section(
            4,
            "values",
            "Our Values",
            "<p>At Fusion Focus, our work is guided by these core values:</p><ul>\
             <li><strong>Data-Driven Excellence:</strong> We believe in the power of data to \
             reveal insights and guide strategic decisions.</li>\
             <li><strong>Founder-Centric Approach:</strong> We tailor our work to the challenges \
             SaaS founders actually face.</li>\
             <li><strong>Continuous Learning:</strong> We stay ahead of a fast-moving technology \
             landscape.</li>\
             <li><strong>Transparent Partnership:</strong> We build relationships on honesty and \
             shared goals.</li></ul>",
        ),
    ]
}
