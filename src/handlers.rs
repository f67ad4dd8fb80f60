use crate::{
    AppState,
    auth::{AdminUser, AuthUser, is_admin},
    config::{AppConfig, Env},
    error::{ApiError, StoreError},
    fallback::{self, ContentSet},
    guard::{DASHBOARD_PATH, LOGIN_PATH},
    models::{
        AboutPage, AboutPageSection, AboutSectionChanges, AboutSectionInput, AdminCheckResponse,
        BlueprintChanges, BlueprintInput, BlueprintsPage, ConfigReport, ContactCreated,
        ContactFilter, ContactRequest, ContactStatus, ContactStatusUpdate, ContactSubmission,
        DashboardSummary, DbConnectionReport, GrowthBlueprint, HomePage, ListOptions, LoginPage,
        LoginPageQuery, LoginRequest, LoginResponse, PublishedState, Service, ServiceChanges,
        ServiceInput, ServicesPage, SessionUser, UnauthorizedPage,
    },
    repository::{ContentTable, PublishableTable, Repository},
    validation,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

const HOME_SERVICES_LIMIT: i64 = 4;
const HOME_BLUEPRINTS_LIMIT: i64 = 3;
const DASHBOARD_RECENT_CONTACTS: i64 = 5;

// --- Public Content API ---

/// list_services
///
/// [Public Route] Published services only. Drafts never leave the store through here.
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "content",
    params(ListOptions),
    responses((status = 200, description = "Published services", body = [Service]))
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.repo.list_published_services(&opts).await?))
}

/// get_service_by_slug
///
/// [Public Route] A published service by its URL slug. Unknown and unpublished slugs
/// are both 404.
#[utoipa::path(
    get,
    path = "/api/services/{slug}",
    tag = "content",
    params(("slug" = String, Path, description = "Service slug")),
    responses(
        (status = 200, description = "Found", body = Service),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_service_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Service>, ApiError> {
    state
        .repo
        .get_published_service_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Service"))
}

#[utoipa::path(
    get,
    path = "/api/growth-blueprints",
    tag = "content",
    params(ListOptions),
    responses((status = 200, description = "Published growth blueprints", body = [GrowthBlueprint]))
)]
pub async fn list_blueprints(
    State(state): State<AppState>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<Vec<GrowthBlueprint>>, ApiError> {
    Ok(Json(state.repo.list_published_blueprints(&opts).await?))
}

#[utoipa::path(
    get,
    path = "/api/growth-blueprints/{slug}",
    tag = "content",
    params(("slug" = String, Path, description = "Growth blueprint slug")),
    responses(
        (status = 200, description = "Found", body = GrowthBlueprint),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_blueprint_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GrowthBlueprint>, ApiError> {
    state
        .repo
        .get_published_blueprint_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Growth blueprint"))
}

#[utoipa::path(
    get,
    path = "/api/about",
    tag = "content",
    responses((status = 200, description = "About page sections in display order", body = [AboutPageSection]))
)]
pub async fn list_about_sections(
    State(state): State<AppState>,
) -> Result<Json<Vec<AboutPageSection>>, ApiError> {
    Ok(Json(state.repo.list_about_sections().await?))
}

/// submit_contact
///
/// [Public Route] Contact Intake. Name, email and message are required after trimming;
/// a rejected payload never reaches the store. New submissions always start as `new`.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "content",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Stored", body = ContactCreated),
        (status = 400, description = "Field errors")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactCreated>), ApiError> {
    let request = validation::prepare_contact(payload)?;
    let submission = state.repo.create_contact_submission(request).await?;

    tracing::info!(id = %submission.id, "contact submission received");
    Ok((
        StatusCode::CREATED,
        Json(ContactCreated {
            success: true,
            data: submission,
        }),
    ))
}

// --- Session ---

fn session_cookie(config: &AppConfig, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.session_cookie.clone(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(config.env == Env::Production);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// login
///
/// [Public Route] Delegates the password check to the Session Store, then stores the
/// issued access token in the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    validation::check_login(&payload)?;

    let tokens = state
        .sessions
        .sign_in(payload.email.trim(), &payload.password)
        .await?;
    let is_admin = is_admin(state.repo.as_ref(), &tokens.user.email).await;

    tracing::info!(user_id = %tokens.user.id, is_admin, "signed in");
    let jar = jar.add(session_cookie(&state.config, tokens.access_token));
    Ok((
        jar,
        Json(LoginResponse {
            user: tokens.user,
            is_admin,
        }),
    ))
}

/// logout
///
/// [Public Route] Revokes the session upstream when possible and always clears the cookie.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(token) = jar.get(&state.config.session_cookie).map(|c| c.value().to_string()) {
        if let Err(e) = state.sessions.sign_out(&token).await {
            tracing::warn!(error = %e, "session revocation failed, clearing cookie anyway");
        }
    }

    let mut removal = Cookie::from(state.config.session_cookie.clone());
    removal.set_path("/");
    (jar.remove(removal), StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "auth",
    responses(
        (status = 200, description = "Current session", body = SessionUser),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_session(AuthUser(identity): AuthUser) -> Json<SessionUser> {
    Json(SessionUser {
        id: identity.user_id,
        email: identity.email,
    })
}

/// check_admin
///
/// [Authenticated Route] Whether the signed-in user is on the admin allowlist.
#[utoipa::path(
    post,
    path = "/api/auth/check-admin",
    tag = "auth",
    responses(
        (status = 200, description = "Membership", body = AdminCheckResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn check_admin(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> Json<AdminCheckResponse> {
    Json(AdminCheckResponse {
        is_admin: is_admin(state.repo.as_ref(), &identity.email).await,
    })
}

// --- Diagnostics ---

fn presence(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        "Missing"
    } else if value == default {
        "Default"
    } else {
        "Configured"
    }
    .to_string()
}

/// check_config
///
/// [Public Route] Reports which settings are present. Never echoes a value.
#[utoipa::path(
    get,
    path = "/api/check-config",
    tag = "diagnostics",
    responses((status = 200, description = "Configuration presence", body = ConfigReport))
)]
pub async fn check_config(State(config): State<AppConfig>) -> Json<ConfigReport> {
    let defaults = AppConfig::default();
    Json(ConfigReport {
        supabase_url: presence(&config.supabase_url, &defaults.supabase_url),
        supabase_anon_key: presence(&config.supabase_anon_key, &defaults.supabase_anon_key),
        jwt_secret: presence(&config.jwt_secret, &defaults.jwt_secret),
        app_env: config.env.as_str().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/check-db-connection",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Store reachable", body = DbConnectionReport),
        (status = 500, description = "Store unreachable")
    )
)]
pub async fn check_db_connection(
    State(state): State<AppState>,
) -> Result<Json<DbConnectionReport>, ApiError> {
    let admin_count = state.repo.count_admins().await?;
    Ok(Json(DbConnectionReport {
        success: true,
        message: "Database connection successful".to_string(),
        admin_count,
    }))
}

// --- Admin API: Services ---

#[utoipa::path(
    get,
    path = "/api/admin/services",
    tag = "admin",
    params(ListOptions),
    responses(
        (status = 200, description = "All services, drafts included", body = [Service]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn admin_list_services(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.repo.list_services(&opts).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/services/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "Found", body = Service), (status = 404, description = "Not Found"))
)]
pub async fn admin_get_service(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, ApiError> {
    state
        .repo
        .get_service(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Service"))
}

/// admin_create_service
///
/// [Admin Route] An empty slug is derived from the title before validation.
#[utoipa::path(
    post,
    path = "/api/admin/services",
    tag = "admin",
    request_body = ServiceInput,
    responses((status = 201, description = "Created", body = Service), (status = 400, description = "Field errors"))
)]
pub async fn admin_create_service(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<ServiceInput>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let input = validation::prepare_service(payload)?;
    let service = state.repo.create_service(input).await?;
    tracing::info!(id = %service.id, by = %admin.email, "service created");
    Ok((StatusCode::CREATED, Json(service)))
}

#[utoipa::path(
    put,
    path = "/api/admin/services/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = ServiceChanges,
    responses((status = 200, description = "Updated", body = Service), (status = 404, description = "Not Found"))
)]
pub async fn admin_update_service(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<ServiceChanges>,
) -> Result<Json<Service>, ApiError> {
    validation::check_service_changes(&changes)?;
    state
        .repo
        .update_service(id, changes)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Service"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/services/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn admin_delete_service(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_row(state.repo.as_ref(), ContentTable::Services, id, "Service", &admin.email).await
}

#[utoipa::path(
    post,
    path = "/api/admin/services/{id}/toggle-published",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "New visibility", body = PublishedState), (status = 404, description = "Not Found"))
)]
pub async fn admin_toggle_service(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublishedState>, ApiError> {
    toggle(state.repo.as_ref(), PublishableTable::Services, id, "Service").await
}

// --- Admin API: Growth Blueprints ---

#[utoipa::path(
    get,
    path = "/api/admin/growth-blueprints",
    tag = "admin",
    params(ListOptions),
    responses(
        (status = 200, description = "All growth blueprints, drafts included", body = [GrowthBlueprint]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn admin_list_blueprints(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(opts): Query<ListOptions>,
) -> Result<Json<Vec<GrowthBlueprint>>, ApiError> {
    Ok(Json(state.repo.list_blueprints(&opts).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/growth-blueprints/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Growth blueprint ID")),
    responses((status = 200, description = "Found", body = GrowthBlueprint), (status = 404, description = "Not Found"))
)]
pub async fn admin_get_blueprint(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GrowthBlueprint>, ApiError> {
    state
        .repo
        .get_blueprint(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Growth blueprint"))
}

#[utoipa::path(
    post,
    path = "/api/admin/growth-blueprints",
    tag = "admin",
    request_body = BlueprintInput,
    responses((status = 201, description = "Created", body = GrowthBlueprint), (status = 400, description = "Field errors"))
)]
pub async fn admin_create_blueprint(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<BlueprintInput>,
) -> Result<(StatusCode, Json<GrowthBlueprint>), ApiError> {
    let input = validation::prepare_blueprint(payload)?;
    let blueprint = state.repo.create_blueprint(input).await?;
    tracing::info!(id = %blueprint.id, by = %admin.email, "growth blueprint created");
    Ok((StatusCode::CREATED, Json(blueprint)))
}

#[utoipa::path(
    put,
    path = "/api/admin/growth-blueprints/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Growth blueprint ID")),
    request_body = BlueprintChanges,
    responses((status = 200, description = "Updated", body = GrowthBlueprint), (status = 404, description = "Not Found"))
)]
pub async fn admin_update_blueprint(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<BlueprintChanges>,
) -> Result<Json<GrowthBlueprint>, ApiError> {
    validation::check_blueprint_changes(&changes)?;
    state
        .repo
        .update_blueprint(id, changes)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Growth blueprint"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/growth-blueprints/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Growth blueprint ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn admin_delete_blueprint(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_row(
        state.repo.as_ref(),
        ContentTable::GrowthBlueprints,
        id,
        "Growth blueprint",
        &admin.email,
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/admin/growth-blueprints/{id}/toggle-published",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Growth blueprint ID")),
    responses((status = 200, description = "New visibility", body = PublishedState), (status = 404, description = "Not Found"))
)]
pub async fn admin_toggle_blueprint(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublishedState>, ApiError> {
    toggle(state.repo.as_ref(), PublishableTable::GrowthBlueprints, id, "Growth blueprint").await
}

// --- Admin API: Contacts ---

#[utoipa::path(
    get,
    path = "/api/admin/contacts",
    tag = "admin",
    params(ContactFilter),
    responses((status = 200, description = "Contact submissions, newest first", body = [ContactSubmission]))
)]
pub async fn admin_list_contacts(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<ContactSubmission>>, ApiError> {
    Ok(Json(state.repo.list_contact_submissions(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/contacts/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Contact submission ID")),
    responses((status = 200, description = "Found", body = ContactSubmission), (status = 404, description = "Not Found"))
)]
pub async fn admin_get_contact(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactSubmission>, ApiError> {
    state
        .repo
        .get_contact_submission(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Contact submission"))
}

#[utoipa::path(
    patch,
    path = "/api/admin/contacts/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Contact submission ID")),
    request_body = ContactStatusUpdate,
    responses((status = 200, description = "Updated", body = ContactSubmission), (status = 404, description = "Not Found"))
)]
pub async fn admin_update_contact_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ContactStatusUpdate>,
) -> Result<Json<ContactSubmission>, ApiError> {
    state
        .repo
        .set_contact_status(id, update.status)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Contact submission"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/contacts/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Contact submission ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn admin_delete_contact(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_row(
        state.repo.as_ref(),
        ContentTable::ContactSubmissions,
        id,
        "Contact submission",
        &admin.email,
    )
    .await
}

// --- Admin API: About Page ---

#[utoipa::path(
    get,
    path = "/api/admin/about",
    tag = "admin",
    responses((status = 200, description = "About page sections", body = [AboutPageSection]))
)]
pub async fn admin_list_about_sections(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AboutPageSection>>, ApiError> {
    Ok(Json(state.repo.list_about_sections().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/about",
    tag = "admin",
    request_body = AboutSectionInput,
    responses((status = 201, description = "Created", body = AboutPageSection), (status = 400, description = "Field errors"))
)]
pub async fn admin_create_about_section(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<AboutSectionInput>,
) -> Result<(StatusCode, Json<AboutPageSection>), ApiError> {
    let input = validation::prepare_about_section(payload)?;
    let section = state.repo.create_about_section(input).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

#[utoipa::path(
    put,
    path = "/api/admin/about/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "About section ID")),
    request_body = AboutSectionChanges,
    responses((status = 200, description = "Updated", body = AboutPageSection), (status = 404, description = "Not Found"))
)]
pub async fn admin_update_about_section(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut changes): Json<AboutSectionChanges>,
) -> Result<Json<AboutPageSection>, ApiError> {
    changes.section_name = changes.section_name.map(|name| name.trim().to_lowercase());
    validation::check_about_changes(&changes)?;
    state
        .repo
        .update_about_section(id, changes)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("About section"))
}

#[utoipa::path(
    delete,
    path = "/api/admin/about/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "About section ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn admin_delete_about_section(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_row(state.repo.as_ref(), ContentTable::AboutPage, id, "About section", &admin.email).await
}

/// admin_dashboard
///
/// [Admin Route] Counters for the dashboard cards plus the latest submissions.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "admin",
    responses((status = 200, description = "Dashboard summary", body = DashboardSummary))
)]
pub async fn admin_dashboard(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(dashboard_summary(state.repo.as_ref()).await?))
}

async fn delete_row(
    repo: &dyn Repository,
    table: ContentTable,
    id: Uuid,
    what: &'static str,
    by: &str,
) -> Result<StatusCode, ApiError> {
    if repo.delete(table, id).await? {
        tracing::info!(table = table.name(), %id, %by, "row deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(what))
    }
}

async fn toggle(
    repo: &dyn Repository,
    table: PublishableTable,
    id: Uuid,
    what: &'static str,
) -> Result<Json<PublishedState>, ApiError> {
    match repo.toggle_published(table, id).await? {
        Some(published) => Ok(Json(PublishedState { id, published })),
        None => Err(ApiError::NotFound(what)),
    }
}

async fn dashboard_summary(repo: &dyn Repository) -> Result<DashboardSummary, StoreError> {
    let services = repo.list_services(&ListOptions::default()).await?;
    let blueprints = repo.list_blueprints(&ListOptions::default()).await?;
    let new_contacts = repo
        .list_contact_submissions(&ContactFilter {
            status: Some(ContactStatus::New),
            limit: None,
        })
        .await?;
    let recent_contacts = repo
        .list_contact_submissions(&ContactFilter {
            status: None,
            limit: Some(DASHBOARD_RECENT_CONTACTS),
        })
        .await?;

    Ok(DashboardSummary {
        total_services: services.len() as i64,
        published_services: services.iter().filter(|s| s.published).count() as i64,
        total_blueprints: blueprints.len() as i64,
        published_blueprints: blueprints.iter().filter(|b| b.published).count() as i64,
        new_contacts: new_contacts.len() as i64,
        recent_contacts,
    })
}

// --- Public Pages (Presentation Boundary) ---

// The listing limit also caps the fallback set.
fn capped<T>(mut rows: Vec<T>, opts: &ListOptions) -> Vec<T> {
    if let Some(limit) = opts.effective_limit() {
        rows.truncate(limit as usize);
    }
    rows
}

async fn services_page_for(repo: &dyn Repository, opts: ListOptions) -> ServicesPage {
    let (services, source) =
        ContentSet::from_result(repo.list_published_services(&opts).await, "services")
            .or_fallback(fallback::services);
    ServicesPage {
        services: capped(services, &opts),
        source,
    }
}

async fn blueprints_page_for(repo: &dyn Repository, opts: ListOptions) -> BlueprintsPage {
    let (blueprints, source) =
        ContentSet::from_result(repo.list_published_blueprints(&opts).await, "growth blueprints")
            .or_fallback(fallback::blueprints);
    BlueprintsPage {
        blueprints: capped(blueprints, &opts),
        source,
    }
}

/// home_page
///
/// [Public Page] A few services and the latest blueprints. Either half falls back on
/// its own.
#[utoipa::path(
    get,
    path = "/pages/home",
    tag = "pages",
    responses((status = 200, description = "Landing page payload", body = HomePage))
)]
pub async fn home_page(State(state): State<AppState>) -> Json<HomePage> {
    let repo = state.repo.as_ref();
    Json(HomePage {
        services: services_page_for(repo, ListOptions::with_limit(HOME_SERVICES_LIMIT)).await,
        blueprints: blueprints_page_for(repo, ListOptions::with_limit(HOME_BLUEPRINTS_LIMIT))
            .await,
    })
}

#[utoipa::path(
    get,
    path = "/pages/services",
    tag = "pages",
    responses((status = 200, description = "Services page payload", body = ServicesPage))
)]
pub async fn services_page(State(state): State<AppState>) -> Json<ServicesPage> {
    Json(services_page_for(state.repo.as_ref(), ListOptions::default()).await)
}

/// service_page
///
/// [Public Page] A single service. Never falls back: an unknown slug, a draft and a
/// failed lookup are all "not found".
#[utoipa::path(
    get,
    path = "/pages/services/{slug}",
    tag = "pages",
    params(("slug" = String, Path, description = "Service slug")),
    responses((status = 200, description = "Found", body = Service), (status = 404, description = "Not Found"))
)]
pub async fn service_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Service>, ApiError> {
    match state.repo.get_published_service_by_slug(&slug).await {
        Ok(Some(service)) => Ok(Json(service)),
        Ok(None) => Err(ApiError::NotFound("Service")),
        Err(e) => {
            tracing::error!(error = %e, %slug, "service lookup failed");
            Err(ApiError::NotFound("Service"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/pages/growth-blueprints",
    tag = "pages",
    responses((status = 200, description = "Growth blueprints page payload", body = BlueprintsPage))
)]
pub async fn blueprints_page(State(state): State<AppState>) -> Json<BlueprintsPage> {
    Json(blueprints_page_for(state.repo.as_ref(), ListOptions::default()).await)
}

#[utoipa::path(
    get,
    path = "/pages/growth-blueprints/{slug}",
    tag = "pages",
    params(("slug" = String, Path, description = "Growth blueprint slug")),
    responses((status = 200, description = "Found", body = GrowthBlueprint), (status = 404, description = "Not Found"))
)]
pub async fn blueprint_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GrowthBlueprint>, ApiError> {
    match state.repo.get_published_blueprint_by_slug(&slug).await {
        Ok(Some(blueprint)) => Ok(Json(blueprint)),
        Ok(None) => Err(ApiError::NotFound("Growth blueprint")),
        Err(e) => {
            tracing::error!(error = %e, %slug, "growth blueprint lookup failed");
            Err(ApiError::NotFound("Growth blueprint"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/pages/about",
    tag = "pages",
    responses((status = 200, description = "About page payload", body = AboutPage))
)]
pub async fn about_page(State(state): State<AppState>) -> Json<AboutPage> {
    let (sections, source) =
        ContentSet::from_result(state.repo.list_about_sections().await, "about sections")
            .or_fallback(fallback::about_sections);
    Json(AboutPage { sections, source })
}

#[utoipa::path(
    get,
    path = "/unauthorized",
    tag = "pages",
    responses((status = 200, description = "Unauthorized page payload", body = UnauthorizedPage))
)]
pub async fn unauthorized_page() -> Json<UnauthorizedPage> {
    Json(UnauthorizedPage {
        message: "You don't have permission to access the admin area. This area is restricted \
                  to administrators only."
            .to_string(),
        home_path: "/".to_string(),
    })
}

// --- Admin Pages (behind the Route Guard) ---

pub async fn admin_index() -> Response {
    Redirect::temporary(DASHBOARD_PATH).into_response()
}

/// Answer for any path no route claims, admin or not. Under `/admin` it is only
/// reached once the Route Guard has admitted the requester.
pub async fn not_found_page() -> ApiError {
    ApiError::NotFound("Page")
}

#[utoipa::path(
    get,
    path = "/admin/login",
    tag = "admin-pages",
    params(LoginPageQuery),
    responses((status = 200, description = "Login page payload", body = LoginPage))
)]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    // Only same-site admin paths are honoured as a post-login destination.
    let redirect_to = query
        .redirect_to
        .filter(|path| crate::guard::is_admin_path(path) && path != LOGIN_PATH);
    Json(LoginPage { redirect_to })
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin-pages",
    responses((status = 200, description = "Dashboard payload", body = DashboardSummary))
)]
pub async fn dashboard_page(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(dashboard_summary(state.repo.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/admin/services",
    tag = "admin-pages",
    responses((status = 200, description = "Services table", body = [Service]))
)]
pub async fn admin_services_page(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.repo.list_services(&ListOptions::default()).await?))
}

#[utoipa::path(
    get,
    path = "/admin/services/{id}",
    tag = "admin-pages",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "Edit form payload", body = Service), (status = 404, description = "Not Found"))
)]
pub async fn admin_service_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, ApiError> {
    state
        .repo
        .get_service(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Service"))
}

#[utoipa::path(
    get,
    path = "/admin/growth-blueprints",
    tag = "admin-pages",
    responses((status = 200, description = "Growth blueprints table", body = [GrowthBlueprint]))
)]
pub async fn admin_blueprints_page(
    State(state): State<AppState>,
) -> Result<Json<Vec<GrowthBlueprint>>, ApiError> {
    Ok(Json(state.repo.list_blueprints(&ListOptions::default()).await?))
}

#[utoipa::path(
    get,
    path = "/admin/growth-blueprints/{id}",
    tag = "admin-pages",
    params(("id" = Uuid, Path, description = "Growth blueprint ID")),
    responses((status = 200, description = "Edit form payload", body = GrowthBlueprint), (status = 404, description = "Not Found"))
)]
pub async fn admin_blueprint_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GrowthBlueprint>, ApiError> {
    state
        .repo
        .get_blueprint(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Growth blueprint"))
}

#[utoipa::path(
    get,
    path = "/admin/contacts",
    tag = "admin-pages",
    params(ContactFilter),
    responses((status = 200, description = "Contact inbox", body = [ContactSubmission]))
)]
pub async fn admin_contacts_page(
    State(state): State<AppState>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<ContactSubmission>>, ApiError> {
    Ok(Json(state.repo.list_contact_submissions(&filter).await?))
}
