use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Content Tables (Mapped to Database) ---

/// Service
///
/// A consulting offering from the `services` table. Publicly visible only while
/// `published` is true; `slug` is the URL key used by the marketing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    // Rich text (HTML) body.
    pub content: Option<String>,
    pub image_url: Option<String>,
    // Ordered bullet list. A NULL column reads as empty.
    pub features: Vec<String>,
    pub published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// GrowthBlueprint
///
/// A long-form strategy write-up from the `growth_blueprints` table. Same lifecycle
/// as [`Service`], tagged with free-form categories and tags instead of features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct GrowthBlueprint {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactStatus
///
/// Triage state of a contact submission. Stored as text in `contact_submissions.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ContactStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

#[derive(Debug, Error)]
#[error("unknown contact status `{0}`")]
pub struct UnknownStatus(pub String);

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::InProgress => "in-progress",
            ContactStatus::Completed => "completed",
        }
    }
}

impl TryFrom<String> for ContactStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "new" => Ok(ContactStatus::New),
            "in-progress" => Ok(ContactStatus::InProgress),
            "completed" => Ok(ContactStatus::Completed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// ContactSubmission
///
/// A message left through the public contact form (`contact_submissions` table).
/// Only admins may change its status or delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// AboutPageSection
///
/// One block of the about page (`about_page` table), keyed by `section_name`
/// and rendered in `order_index` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AboutPageSection {
    pub id: Uuid,
    pub section_name: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub order_index: Option<i32>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Admin
///
/// Row of the `admins` allowlist. Membership is decided by email equality alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Section keys the about page knows how to render.
pub const ABOUT_SECTION_NAMES: [&str; 5] = ["mission", "vision", "story", "values", "team"];

// --- Request Payloads (Input Schemas) ---

/// ServiceInput
///
/// Admin form payload for creating a service. An empty `slug` is derived from the title.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ServiceInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// ServiceChanges
///
/// Partial update for a service. Absent fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ServiceChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// BlueprintInput
///
/// Admin form payload for creating a growth blueprint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlueprintInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

/// BlueprintChanges
///
/// Partial update for a growth blueprint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlueprintChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// ContactRequest
///
/// Public contact form payload (POST /api/contact). Missing fields deserialize as
/// empty strings so they are reported as field errors instead of a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub company: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// ContactStatusUpdate
///
/// Admin payload moving a submission through its triage states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactStatusUpdate {
    pub status: ContactStatus,
}

/// AboutSectionInput
///
/// Admin payload for a new about page section.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AboutSectionInput {
    #[serde(default)]
    pub section_name: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub order_index: Option<i32>,
}

/// AboutSectionChanges
///
/// Partial update for an about page section.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AboutSectionChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

/// LoginRequest
///
/// Credentials forwarded verbatim to the Session Store. The password is never logged
/// or persisted by this service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// --- Query Parameters ---

/// Whitelisted ordering columns for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
        }
    }
}

/// ListOptions
///
/// Listing controls shared by every content type: optional positive `limit`, an
/// ordering column (default `created_at`) and direction (default descending).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOptions {
    pub limit: Option<i64>,
    pub order_by: Option<SortField>,
    pub ascending: Option<bool>,
}

impl ListOptions {
    pub fn with_limit(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// The limit to apply, if any. Zero or negative values mean "no limit".
    pub fn effective_limit(&self) -> Option<i64> {
        self.limit.filter(|limit| *limit > 0)
    }

    pub fn sort_field(&self) -> SortField {
        self.order_by.unwrap_or_default()
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending.unwrap_or(false)
    }
}

/// ContactFilter
///
/// Admin listing filter for contact submissions, newest first.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub limit: Option<i64>,
}

// --- Output Schemas ---

/// SessionUser
///
/// Identity of the signed-in user as reported back to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub is_admin: bool,
}

/// AdminCheckResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminCheckResponse {
    pub is_admin: bool,
}

/// PublishedState
///
/// Result of a publish toggle: the row id and its new visibility.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PublishedState {
    pub id: Uuid,
    pub published: bool,
}

/// ContactCreated
///
/// Response of the public contact endpoint (201).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactCreated {
    pub success: bool,
    pub data: ContactSubmission,
}

/// DashboardSummary
///
/// Counters and the latest submissions shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardSummary {
    pub total_services: i64,
    pub published_services: i64,
    pub total_blueprints: i64,
    pub published_blueprints: i64,
    pub new_contacts: i64,
    pub recent_contacts: Vec<ContactSubmission>,
}

/// ConfigReport
///
/// Which settings are present. Values are never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigReport {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub jwt_secret: String,
    pub app_env: String,
}

/// DbConnectionReport
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DbConnectionReport {
    pub success: bool,
    pub message: String,
    pub admin_count: i64,
}

// --- Page Payloads (Presentation Boundary) ---

/// Where the rows of a page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ContentSource {
    Store,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ServicesPage {
    pub services: Vec<Service>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlueprintsPage {
    pub blueprints: Vec<GrowthBlueprint>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AboutPage {
    pub sections: Vec<AboutPageSection>,
    pub source: ContentSource,
}

/// HomePage
///
/// Landing page teaser: a few services and the latest blueprints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HomePage {
    pub services: ServicesPage,
    pub blueprints: BlueprintsPage,
}

/// LoginPage
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginPage {
    pub redirect_to: Option<String>,
}

/// Query string of the admin login page, carrying the path the Route Guard interrupted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginPageQuery {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
}

/// UnauthorizedPage
///
/// Shown to signed-in users who are not on the admin allowlist.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UnauthorizedPage {
    pub message: String,
    pub home_path: String,
}
