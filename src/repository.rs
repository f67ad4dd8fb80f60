use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{
        AboutPageSection, AboutSectionChanges, AboutSectionInput, Admin, BlueprintChanges,
        BlueprintInput, ContactFilter, ContactRequest, ContactStatus, ContactSubmission,
        GrowthBlueprint, ListOptions, Service, ServiceChanges, ServiceInput,
    },
};

/// The content tables addressed by the shared row operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentTable {
    Services,
    GrowthBlueprints,
    ContactSubmissions,
    AboutPage,
}

impl ContentTable {
    pub fn name(self) -> &'static str {
        match self {
            ContentTable::Services => "services",
            ContentTable::GrowthBlueprints => "growth_blueprints",
            ContentTable::ContactSubmissions => "contact_submissions",
            ContentTable::AboutPage => "about_page",
        }
    }
}

/// The content tables that carry a `published` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishableTable {
    Services,
    GrowthBlueprints,
}

impl PublishableTable {
    pub fn table(self) -> ContentTable {
        match self {
            PublishableTable::Services => ContentTable::Services,
            PublishableTable::GrowthBlueprints => ContentTable::GrowthBlueprints,
        }
    }
}

/// Repository Trait
///
/// Abstract contract over the hosted content tables. Handlers only see this trait, so
/// the Postgres store and the in-memory store are interchangeable.
///
/// Every operation reports store failures as [`StoreError`]; "no rows" is never an
/// error (empty `Vec`, `None`, or `false`). Slugs are unique per table: a create or
/// update that would reuse one fails with [`StoreError::SlugTaken`] and writes nothing.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Services ---
    // Public listing. Only rows with published = true.
    async fn list_published_services(&self, opts: &ListOptions) -> Result<Vec<Service>, StoreError>;
    async fn get_published_service_by_slug(&self, slug: &str) -> Result<Option<Service>, StoreError>;
    // Admin listing, drafts included.
    async fn list_services(&self, opts: &ListOptions) -> Result<Vec<Service>, StoreError>;
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, StoreError>;
    async fn create_service(&self, input: ServiceInput) -> Result<Service, StoreError>;
    async fn update_service(&self, id: Uuid, changes: ServiceChanges) -> Result<Option<Service>, StoreError>;

    // --- Growth Blueprints ---
    async fn list_published_blueprints(&self, opts: &ListOptions) -> Result<Vec<GrowthBlueprint>, StoreError>;
    async fn get_published_blueprint_by_slug(&self, slug: &str) -> Result<Option<GrowthBlueprint>, StoreError>;
    async fn list_blueprints(&self, opts: &ListOptions) -> Result<Vec<GrowthBlueprint>, StoreError>;
    async fn get_blueprint(&self, id: Uuid) -> Result<Option<GrowthBlueprint>, StoreError>;
    async fn create_blueprint(&self, input: BlueprintInput) -> Result<GrowthBlueprint, StoreError>;
    async fn update_blueprint(&self, id: Uuid, changes: BlueprintChanges) -> Result<Option<GrowthBlueprint>, StoreError>;

    // --- Contact Submissions ---
    // Status is always inserted as `new`.
    async fn create_contact_submission(&self, request: ContactRequest) -> Result<ContactSubmission, StoreError>;
    async fn list_contact_submissions(&self, filter: &ContactFilter) -> Result<Vec<ContactSubmission>, StoreError>;
    async fn get_contact_submission(&self, id: Uuid) -> Result<Option<ContactSubmission>, StoreError>;
    async fn set_contact_status(&self, id: Uuid, status: ContactStatus) -> Result<Option<ContactSubmission>, StoreError>;

    // --- About Page ---
    // Ordered by order_index.
    async fn list_about_sections(&self) -> Result<Vec<AboutPageSection>, StoreError>;
    async fn create_about_section(&self, input: AboutSectionInput) -> Result<AboutPageSection, StoreError>;
    async fn update_about_section(&self, id: Uuid, changes: AboutSectionChanges) -> Result<Option<AboutPageSection>, StoreError>;

    // --- Shared Row Operations ---
    /// Removes a row by id. Returns whether a row was actually removed.
    async fn delete(&self, table: ContentTable, id: Uuid) -> Result<bool, StoreError>;
    /// Flips `published` and refreshes `updated_at`. Returns the new value, or `None`
    /// when the id does not exist.
    async fn toggle_published(&self, table: PublishableTable, id: Uuid) -> Result<Option<bool>, StoreError>;

    // --- Admin Allowlist ---
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError>;
    async fn count_admins(&self) -> Result<i64, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const SERVICE_COLUMNS: &str = "id, title, slug, description, content, image_url, \
     COALESCE(features, '{}') AS features, published, created_at, updated_at";

const BLUEPRINT_COLUMNS: &str = "id, title, slug, description, content, image_url, \
     COALESCE(categories, '{}') AS categories, COALESCE(tags, '{}') AS tags, \
     published, created_at, updated_at";

const CONTACT_COLUMNS: &str =
    "id, name, email, company, message, status, created_at, updated_at";

const ABOUT_COLUMNS: &str = "id, section_name, title, content, image_url, order_index, updated_at";

/// PostgresRepository
///
/// `Repository` backed by the hosted Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Shared listing query: optional published filter, whitelisted ordering, optional limit.
    async fn list_rows<T>(
        &self,
        table: ContentTable,
        columns: &str,
        published_only: bool,
        opts: &ListOptions,
    ) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {columns} FROM {}", table.name()));
        if published_only {
            builder.push(" WHERE published = true");
        }
        builder.push(format!(
            " ORDER BY {} {}",
            opts.sort_field().column(),
            if opts.is_ascending() { "ASC" } else { "DESC" }
        ));
        if let Some(limit) = opts.effective_limit() {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        Ok(builder.build_query_as::<T>().fetch_all(&self.pool).await?)
    }

    async fn published_by_slug<T>(
        &self,
        table: ContentTable,
        columns: &str,
        slug: &str,
    ) -> Result<Option<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT {columns} FROM {} WHERE slug = $1 AND published = true LIMIT 1",
            table.name()
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn by_id<T>(&self, table: ContentTable, columns: &str, id: Uuid) -> Result<Option<T>, StoreError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT {columns} FROM {} WHERE id = $1", table.name());
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

/// The only unique columns written through this repository are the content slugs.
fn slug_conflict(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::SlugTaken,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_published_services(&self, opts: &ListOptions) -> Result<Vec<Service>, StoreError> {
        self.list_rows(ContentTable::Services, SERVICE_COLUMNS, true, opts).await
    }

    async fn get_published_service_by_slug(&self, slug: &str) -> Result<Option<Service>, StoreError> {
        self.published_by_slug(ContentTable::Services, SERVICE_COLUMNS, slug).await
    }

    async fn list_services(&self, opts: &ListOptions) -> Result<Vec<Service>, StoreError> {
        self.list_rows(ContentTable::Services, SERVICE_COLUMNS, false, opts).await
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, StoreError> {
        self.by_id(ContentTable::Services, SERVICE_COLUMNS, id).await
    }

    async fn create_service(&self, input: ServiceInput) -> Result<Service, StoreError> {
        let sql = format!(
            "INSERT INTO services (title, slug, description, content, image_url, features, published, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) RETURNING {SERVICE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Service>(&sql)
            .bind(input.title)
            .bind(input.slug)
            .bind(input.description)
            .bind(input.content)
            .bind(input.image_url)
            .bind(input.features)
            .bind(input.published)
            .fetch_one(&self.pool)
            .await
            .map_err(slug_conflict)?)
    }

    /// update_service
    ///
    /// Partial update through `COALESCE`: only columns whose field is `Some` change.
    /// `updated_at` is always refreshed.
    async fn update_service(&self, id: Uuid, changes: ServiceChanges) -> Result<Option<Service>, StoreError> {
        let sql = format!(
            "UPDATE services SET \
                title = COALESCE($2, title), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description), \
                content = COALESCE($5, content), \
                image_url = COALESCE($6, image_url), \
                features = COALESCE($7, features), \
                published = COALESCE($8, published), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {SERVICE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Service>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.slug)
            .bind(changes.description)
            .bind(changes.content)
            .bind(changes.image_url)
            .bind(changes.features)
            .bind(changes.published)
            .fetch_optional(&self.pool)
            .await
            .map_err(slug_conflict)?)
    }

    async fn list_published_blueprints(&self, opts: &ListOptions) -> Result<Vec<GrowthBlueprint>, StoreError> {
        self.list_rows(ContentTable::GrowthBlueprints, BLUEPRINT_COLUMNS, true, opts).await
    }

    async fn get_published_blueprint_by_slug(&self, slug: &str) -> Result<Option<GrowthBlueprint>, StoreError> {
        self.published_by_slug(ContentTable::GrowthBlueprints, BLUEPRINT_COLUMNS, slug).await
    }

    async fn list_blueprints(&self, opts: &ListOptions) -> Result<Vec<GrowthBlueprint>, StoreError> {
        self.list_rows(ContentTable::GrowthBlueprints, BLUEPRINT_COLUMNS, false, opts).await
    }

    async fn get_blueprint(&self, id: Uuid) -> Result<Option<GrowthBlueprint>, StoreError> {
        self.by_id(ContentTable::GrowthBlueprints, BLUEPRINT_COLUMNS, id).await
    }

    async fn create_blueprint(&self, input: BlueprintInput) -> Result<GrowthBlueprint, StoreError> {
        let sql = format!(
            "INSERT INTO growth_blueprints (title, slug, description, content, image_url, categories, tags, published, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW()) RETURNING {BLUEPRINT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, GrowthBlueprint>(&sql)
            .bind(input.title)
            .bind(input.slug)
            .bind(input.description)
            .bind(input.content)
            .bind(input.image_url)
            .bind(input.categories)
            .bind(input.tags)
            .bind(input.published)
            .fetch_one(&self.pool)
            .await
            .map_err(slug_conflict)?)
    }

    async fn update_blueprint(&self, id: Uuid, changes: BlueprintChanges) -> Result<Option<GrowthBlueprint>, StoreError> {
        let sql = format!(
            "UPDATE growth_blueprints SET \
                title = COALESCE($2, title), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description), \
                content = COALESCE($5, content), \
                image_url = COALESCE($6, image_url), \
                categories = COALESCE($7, categories), \
                tags = COALESCE($8, tags), \
                published = COALESCE($9, published), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {BLUEPRINT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, GrowthBlueprint>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.slug)
            .bind(changes.description)
            .bind(changes.content)
            .bind(changes.image_url)
            .bind(changes.categories)
            .bind(changes.tags)
            .bind(changes.published)
            .fetch_optional(&self.pool)
            .await
            .map_err(slug_conflict)?)
    }

    async fn create_contact_submission(&self, request: ContactRequest) -> Result<ContactSubmission, StoreError> {
        let sql = format!(
            "INSERT INTO contact_submissions (name, email, company, message, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ContactSubmission>(&sql)
            .bind(request.name)
            .bind(request.email)
            .bind(request.company)
            .bind(request.message)
            .bind(ContactStatus::New.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_contact_submissions(&self, filter: &ContactFilter) -> Result<Vec<ContactSubmission>, StoreError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {CONTACT_COLUMNS} FROM contact_submissions"));
        if let Some(status) = filter.status {
            builder.push(" WHERE status = ");
            builder.push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit.filter(|l| *l > 0) {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        Ok(builder
            .build_query_as::<ContactSubmission>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_contact_submission(&self, id: Uuid) -> Result<Option<ContactSubmission>, StoreError> {
        self.by_id(ContentTable::ContactSubmissions, CONTACT_COLUMNS, id).await
    }

    async fn set_contact_status(&self, id: Uuid, status: ContactStatus) -> Result<Option<ContactSubmission>, StoreError> {
        let sql = format!(
            "UPDATE contact_submissions SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ContactSubmission>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_about_sections(&self) -> Result<Vec<AboutPageSection>, StoreError> {
        let sql = format!("SELECT {ABOUT_COLUMNS} FROM about_page ORDER BY order_index ASC NULLS LAST");
        Ok(sqlx::query_as::<_, AboutPageSection>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_about_section(&self, input: AboutSectionInput) -> Result<AboutPageSection, StoreError> {
        let sql = format!(
            "INSERT INTO about_page (section_name, title, content, image_url, order_index, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING {ABOUT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, AboutPageSection>(&sql)
            .bind(input.section_name)
            .bind(input.title)
            .bind(input.content)
            .bind(input.image_url)
            .bind(input.order_index)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_about_section(&self, id: Uuid, changes: AboutSectionChanges) -> Result<Option<AboutPageSection>, StoreError> {
        let sql = format!(
            "UPDATE about_page SET \
                section_name = COALESCE($2, section_name), \
                title = COALESCE($3, title), \
                content = COALESCE($4, content), \
                image_url = COALESCE($5, image_url), \
                order_index = COALESCE($6, order_index), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {ABOUT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, AboutPageSection>(&sql)
            .bind(id)
            .bind(changes.section_name)
            .bind(changes.title)
            .bind(changes.content)
            .bind(changes.image_url)
            .bind(changes.order_index)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, table: ContentTable, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table.name());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// toggle_published
    ///
    /// Flips the flag in a single statement, so two concurrent toggles cannot both
    /// read the same old value.
    async fn toggle_published(&self, table: PublishableTable, id: Uuid) -> Result<Option<bool>, StoreError> {
        let sql = format!(
            "UPDATE {} SET published = NOT published, updated_at = NOW() WHERE id = $1 RETURNING published",
            table.table().name()
        );
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        Ok(sqlx::query_as::<_, Admin>(
            "SELECT id, email, created_at FROM admins WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn count_admins(&self) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?)
    }
}
