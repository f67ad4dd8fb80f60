use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        AboutPageSection, AboutSectionChanges, AboutSectionInput, Admin, BlueprintChanges,
        BlueprintInput, ContactFilter, ContactRequest, ContactStatus, ContactSubmission,
        GrowthBlueprint, ListOptions, Service, ServiceChanges, ServiceInput, SortField,
    },
    repository::{ContentTable, PublishableTable, Repository},
};

/// Rows that can be ordered by the whitelisted listing columns.
trait Listed: Clone {
    fn id(&self) -> Uuid;
    fn slug(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn title(&self) -> &str;
    fn published(&self) -> bool;
}

impl Listed for Service {
    fn id(&self) -> Uuid {
        self.id
    }
    fn slug(&self) -> &str {
        &self.slug
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn published(&self) -> bool {
        self.published
    }
}

impl Listed for GrowthBlueprint {
    fn id(&self) -> Uuid {
        self.id
    }
    fn slug(&self) -> &str {
        &self.slug
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn published(&self) -> bool {
        self.published
    }
}

fn list<T: Listed>(rows: &[T], published_only: bool, opts: &ListOptions) -> Vec<T> {
    let mut out: Vec<T> = rows
        .iter()
        .filter(|row| !published_only || row.published())
        .cloned()
        .collect();

    match opts.sort_field() {
        SortField::CreatedAt => out.sort_by_key(|row| row.created_at()),
        SortField::UpdatedAt => out.sort_by_key(|row| row.updated_at()),
        SortField::Title => out.sort_by(|a, b| a.title().cmp(b.title())),
    }
    if !opts.is_ascending() {
        out.reverse();
    }
    if let Some(limit) = opts.effective_limit() {
        out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    out
}

/// Same rule as the UNIQUE slug columns: no other row may already use `slug`.
fn ensure_slug_free<T: Listed>(
    rows: &[T],
    slug: &str,
    except: Option<Uuid>,
) -> Result<(), StoreError> {
    if rows
        .iter()
        .any(|row| row.slug() == slug && Some(row.id()) != except)
    {
        Err(StoreError::SlugTaken)
    } else {
        Ok(())
    }
}

#[derive(Default)]
struct Tables {
    services: Vec<Service>,
    blueprints: Vec<GrowthBlueprint>,
    contacts: Vec<ContactSubmission>,
    about: Vec<AboutPageSection>,
    admins: Vec<Admin>,
    last_write: Option<DateTime<Utc>>,
}

impl Tables {
    /// Server clock for writes. Strictly increasing, even when two writes land in the
    /// same clock tick.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_write {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_write = Some(stamp);
        stamp
    }
}

/// InMemoryRepository
///
/// `Repository` holding every table in process memory. Mirrors the Postgres
/// implementation's semantics (published filtering, ordering, partial updates, unique
/// slugs, server-assigned ids and timestamps) and can simulate a store outage.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    failing: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose every call fails with [`StoreError::Unavailable`].
    pub fn new_failing() -> Self {
        let repo = Self::default();
        repo.set_failing(true);
        repo
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seeds the admin allowlist.
    pub async fn add_admin(&self, email: &str) -> Admin {
        let mut tables = self.tables.write().await;
        let admin = Admin {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: tables.tick(),
        };
        tables.admins.push(admin.clone());
        admin
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_published_services(&self, opts: &ListOptions) -> Result<Vec<Service>, StoreError> {
        self.check()?;
        Ok(list(&self.tables.read().await.services, true, opts))
    }

    async fn get_published_service_by_slug(&self, slug: &str) -> Result<Option<Service>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .services
            .iter()
            .find(|s| s.published && s.slug == slug)
            .cloned())
    }

    async fn list_services(&self, opts: &ListOptions) -> Result<Vec<Service>, StoreError> {
        self.check()?;
        Ok(list(&self.tables.read().await.services, false, opts))
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, input: ServiceInput) -> Result<Service, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        ensure_slug_free(&tables.services, &input.slug, None)?;
        let now = tables.tick();
        let service = Service {
            id: Uuid::new_v4(),
            title: input.title,
            slug: input.slug,
            description: input.description,
            content: input.content,
            image_url: input.image_url,
            features: input.features,
            published: input.published,
            created_at: now,
            updated_at: now,
        };
        tables.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(&self, id: Uuid, changes: ServiceChanges) -> Result<Option<Service>, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        // An unknown id is "not found", not a conflict.
        let exists = tables.services.iter().any(|s| s.id == id);
        if let Some(slug) = changes.slug.as_deref().filter(|_| exists) {
            ensure_slug_free(&tables.services, slug, Some(id))?;
        }
        let now = tables.tick();
        let Some(service) = tables.services.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            service.title = title;
        }
        if let Some(slug) = changes.slug {
            service.slug = slug;
        }
        if let Some(description) = changes.description {
            service.description = Some(description);
        }
        if let Some(content) = changes.content {
            service.content = Some(content);
        }
        if let Some(image_url) = changes.image_url {
            service.image_url = Some(image_url);
        }
        if let Some(features) = changes.features {
            service.features = features;
        }
        if let Some(published) = changes.published {
            service.published = published;
        }
        service.updated_at = now;
        Ok(Some(service.clone()))
    }

    async fn list_published_blueprints(&self, opts: &ListOptions) -> Result<Vec<GrowthBlueprint>, StoreError> {
        self.check()?;
        Ok(list(&self.tables.read().await.blueprints, true, opts))
    }

    async fn get_published_blueprint_by_slug(&self, slug: &str) -> Result<Option<GrowthBlueprint>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .blueprints
            .iter()
            .find(|b| b.published && b.slug == slug)
            .cloned())
    }

    async fn list_blueprints(&self, opts: &ListOptions) -> Result<Vec<GrowthBlueprint>, StoreError> {
        self.check()?;
        Ok(list(&self.tables.read().await.blueprints, false, opts))
    }

    async fn get_blueprint(&self, id: Uuid) -> Result<Option<GrowthBlueprint>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.blueprints.iter().find(|b| b.id == id).cloned())
    }

    async fn create_blueprint(&self, input: BlueprintInput) -> Result<GrowthBlueprint, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        ensure_slug_free(&tables.blueprints, &input.slug, None)?;
        let now = tables.tick();
        let blueprint = GrowthBlueprint {
            id: Uuid::new_v4(),
            title: input.title,
            slug: input.slug,
            description: input.description,
            content: input.content,
            image_url: input.image_url,
            categories: input.categories,
            tags: input.tags,
            published: input.published,
            created_at: now,
            updated_at: now,
        };
        tables.blueprints.push(blueprint.clone());
        Ok(blueprint)
    }

    async fn update_blueprint(&self, id: Uuid, changes: BlueprintChanges) -> Result<Option<GrowthBlueprint>, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        // An unknown id is "not found", not a conflict.
        let exists = tables.blueprints.iter().any(|b| b.id == id);
        if let Some(slug) = changes.slug.as_deref().filter(|_| exists) {
            ensure_slug_free(&tables.blueprints, slug, Some(id))?;
        }
        let now = tables.tick();
        let Some(blueprint) = tables.blueprints.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            blueprint.title = title;
        }
        if let Some(slug) = changes.slug {
            blueprint.slug = slug;
        }
        if let Some(description) = changes.description {
            blueprint.description = Some(description);
        }
        if let Some(content) = changes.content {
            blueprint.content = Some(content);
        }
        if let Some(image_url) = changes.image_url {
            blueprint.image_url = Some(image_url);
        }
        if let Some(categories) = changes.categories {
            blueprint.categories = categories;
        }
        if let Some(tags) = changes.tags {
            blueprint.tags = tags;
        }
        if let Some(published) = changes.published {
            blueprint.published = published;
        }
        blueprint.updated_at = now;
        Ok(Some(blueprint.clone()))
    }

    async fn create_contact_submission(&self, request: ContactRequest) -> Result<ContactSubmission, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            company: request.company,
            message: request.message,
            status: ContactStatus::New,
            created_at: now,
            updated_at: now,
        };
        tables.contacts.push(submission.clone());
        Ok(submission)
    }

    async fn list_contact_submissions(&self, filter: &ContactFilter) -> Result<Vec<ContactSubmission>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut out: Vec<ContactSubmission> = tables
            .contacts
            .iter()
            .filter(|c| filter.status.is_none_or(|status| c.status == status))
            .cloned()
            .collect();
        out.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        if let Some(limit) = filter.limit.filter(|l| *l > 0) {
            out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(out)
    }

    async fn get_contact_submission(&self, id: Uuid) -> Result<Option<ContactSubmission>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn set_contact_status(&self, id: Uuid, status: ContactStatus) -> Result<Option<ContactSubmission>, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        Ok(tables.contacts.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.updated_at = now;
            c.clone()
        }))
    }

    async fn list_about_sections(&self) -> Result<Vec<AboutPageSection>, StoreError> {
        self.check()?;
        let mut sections = self.tables.read().await.about.clone();
        sections.sort_by_key(|s| (s.order_index.is_none(), s.order_index));
        Ok(sections)
    }

    async fn create_about_section(&self, input: AboutSectionInput) -> Result<AboutPageSection, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let section = AboutPageSection {
            id: Uuid::new_v4(),
            section_name: input.section_name,
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            order_index: input.order_index,
            updated_at: now,
        };
        tables.about.push(section.clone());
        Ok(section)
    }

    async fn update_about_section(&self, id: Uuid, changes: AboutSectionChanges) -> Result<Option<AboutPageSection>, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let Some(section) = tables.about.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(section_name) = changes.section_name {
            section.section_name = section_name;
        }
        if let Some(title) = changes.title {
            section.title = Some(title);
        }
        if let Some(content) = changes.content {
            section.content = Some(content);
        }
        if let Some(image_url) = changes.image_url {
            section.image_url = Some(image_url);
        }
        if let Some(order_index) = changes.order_index {
            section.order_index = Some(order_index);
        }
        section.updated_at = now;
        Ok(Some(section.clone()))
    }

    async fn delete(&self, table: ContentTable, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let removed = match table {
            ContentTable::Services => {
                let before = tables.services.len();
                tables.services.retain(|s| s.id != id);
                before != tables.services.len()
            }
            ContentTable::GrowthBlueprints => {
                let before = tables.blueprints.len();
                tables.blueprints.retain(|b| b.id != id);
                before != tables.blueprints.len()
            }
            ContentTable::ContactSubmissions => {
                let before = tables.contacts.len();
                tables.contacts.retain(|c| c.id != id);
                before != tables.contacts.len()
            }
            ContentTable::AboutPage => {
                let before = tables.about.len();
                tables.about.retain(|s| s.id != id);
                before != tables.about.len()
            }
        };
        Ok(removed)
    }

    async fn toggle_published(&self, table: PublishableTable, id: Uuid) -> Result<Option<bool>, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let toggled = match table {
            PublishableTable::Services => tables.services.iter_mut().find(|s| s.id == id).map(|s| {
                s.published = !s.published;
                s.updated_at = now;
                s.published
            }),
            PublishableTable::GrowthBlueprints => {
                tables.blueprints.iter_mut().find(|b| b.id == id).map(|b| {
                    b.published = !b.published;
                    b.updated_at = now;
                    b.published
                })
            }
        };
        Ok(toggled)
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.admins.iter().find(|a| a.email == email).cloned())
    }

    async fn count_admins(&self) -> Result<i64, StoreError> {
        self.check()?;
        let count = self.tables.read().await.admins.len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
