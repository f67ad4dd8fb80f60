//! Runs the `Repository` contract against a real Postgres database.
//!
//! Ignored by default: `DATABASE_URL=... cargo test -- --ignored`.

use fusion_focus::{
    error::StoreError,
    models::{BlueprintInput, ContactRequest, ContactStatus, ListOptions, ServiceInput},
    repository::{ContentTable, PostgresRepository, PublishableTable, Repository},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

/// Slugs are unique per table, so every test run gets its own.
fn unique_slug(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn test_published_filter_and_slug_lookup() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let live_slug = unique_slug("live");
    let draft_slug = unique_slug("draft");
    let live = repo
        .create_service(ServiceInput {
            title: "Live service".into(),
            slug: live_slug.clone(),
            published: true,
            ..ServiceInput::default()
        })
        .await
        .unwrap();
    let draft = repo
        .create_service(ServiceInput {
            title: "Draft service".into(),
            slug: draft_slug.clone(),
            ..ServiceInput::default()
        })
        .await
        .unwrap();

    let published = repo
        .list_published_services(&ListOptions::default())
        .await
        .unwrap();
    assert!(published.iter().all(|s| s.published));
    assert!(published.iter().any(|s| s.id == live.id));
    assert!(!published.iter().any(|s| s.id == draft.id));

    // A NULL features column reads back as empty.
    assert!(draft.features.is_empty());
    assert!(repo.get_published_service_by_slug(&draft_slug).await.unwrap().is_none());
    assert_eq!(
        repo.get_published_service_by_slug(&live_slug)
            .await
            .unwrap()
            .map(|s| s.id),
        Some(live.id)
    );

    repo.delete(ContentTable::Services, live.id).await.unwrap();
    repo.delete(ContentTable::Services, draft.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_duplicate_slug_is_reported_as_taken() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let slug = unique_slug("taken");

    let first = repo
        .create_service(ServiceInput {
            title: "First".into(),
            slug: slug.clone(),
            ..ServiceInput::default()
        })
        .await
        .unwrap();
    let duplicate = repo
        .create_service(ServiceInput {
            title: "Second".into(),
            slug: slug.clone(),
            ..ServiceInput::default()
        })
        .await;
    assert!(matches!(duplicate, Err(StoreError::SlugTaken)));

    repo.delete(ContentTable::Services, first.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_toggle_is_self_inverse() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let blueprint = repo
        .create_blueprint(BlueprintInput {
            title: "Toggle me".into(),
            slug: unique_slug("toggle"),
            tags: vec!["plg".into()],
            ..BlueprintInput::default()
        })
        .await
        .unwrap();

    let table = PublishableTable::GrowthBlueprints;
    assert_eq!(repo.toggle_published(table, blueprint.id).await.unwrap(), Some(true));
    assert_eq!(repo.toggle_published(table, blueprint.id).await.unwrap(), Some(false));
    assert_eq!(repo.toggle_published(table, Uuid::new_v4()).await.unwrap(), None);

    assert!(repo.delete(ContentTable::GrowthBlueprints, blueprint.id).await.unwrap());
    assert!(!repo.delete(ContentTable::GrowthBlueprints, blueprint.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_contact_status_round_trip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let submission = repo
        .create_contact_submission(ContactRequest {
            name: "Integration".into(),
            email: "integration@test.dev".into(),
            company: None,
            message: "Hello".into(),
        })
        .await
        .unwrap();
    assert_eq!(submission.status, ContactStatus::New);

    let updated = repo
        .set_contact_status(submission.id, ContactStatus::InProgress)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ContactStatus::InProgress);
    assert!(updated.updated_at >= submission.updated_at);

    repo.delete(ContentTable::ContactSubmissions, submission.id)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn test_admin_lookup_is_exact_match() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let email = format!("{}@admins.test", Uuid::new_v4().simple());

    sqlx::query("INSERT INTO admins (email) VALUES ($1)")
        .bind(&email)
        .execute(&ctx.pool)
        .await
        .unwrap();

    assert!(repo.find_admin_by_email(&email).await.unwrap().is_some());
    assert!(repo.find_admin_by_email("missing@admins.test").await.unwrap().is_none());
    assert!(repo.count_admins().await.unwrap() >= 1);

    sqlx::query("DELETE FROM admins WHERE email = $1")
        .bind(&email)
        .execute(&ctx.pool)
        .await
        .unwrap();
}
