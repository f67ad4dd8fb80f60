//! Form schema checks applied before any store call.
//!
//! Every check reports field-level messages so the admin forms and the contact form
//! can highlight the offending input.

use reqwest::Url;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    ABOUT_SECTION_NAMES, AboutSectionChanges, AboutSectionInput, BlueprintChanges,
    BlueprintInput, ContactRequest, LoginRequest, ServiceChanges, ServiceInput,
};

const MIN_TITLE_LEN: usize = 3;
const MIN_SLUG_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Accumulated field errors of one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// slugify
///
/// Derives a URL slug from a title: lowercase, drop anything that is not a word
/// character, whitespace or hyphen, collapse runs of whitespace/underscores/hyphens
/// into one `-`, and trim leading and trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_dash = true;
        } else if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        }
    }
    slug
}

/// True when `slug` is non-empty and made only of `[a-z0-9-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Cheap shape check for an email address; the Session Store owns real verification.
pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn check_title(errors: &mut ValidationErrors, title: &str) {
    if title.trim().chars().count() < MIN_TITLE_LEN {
        errors.add("title", "Title must be at least 3 characters");
    }
}

fn check_slug(errors: &mut ValidationErrors, slug: &str) {
    if slug.chars().count() < MIN_SLUG_LEN {
        errors.add("slug", "Slug must be at least 3 characters");
    } else if !is_valid_slug(slug) {
        errors.add(
            "slug",
            "Slug can only contain lowercase letters, numbers, and hyphens",
        );
    }
}

fn check_image_url(errors: &mut ValidationErrors, image_url: Option<&str>) {
    match image_url.map(str::trim) {
        None | Some("") => {}
        Some(url) => {
            if Url::parse(url).is_err() {
                errors.add("image_url", "Must be a valid URL");
            }
        }
    }
}

fn check_section_name(errors: &mut ValidationErrors, name: &str) {
    if !ABOUT_SECTION_NAMES.contains(&name) {
        errors.add(
            "section_name",
            format!("Section must be one of: {}", ABOUT_SECTION_NAMES.join(", ")),
        );
    }
}

fn fill_slug(slug: &mut String, title: &str) {
    if slug.trim().is_empty() {
        *slug = slugify(title);
    } else {
        *slug = slug.trim().to_string();
    }
}

/// Normalises and validates a new service. Fills in the slug from the title when absent.
pub fn prepare_service(mut input: ServiceInput) -> Result<ServiceInput, ValidationErrors> {
    input.title = input.title.trim().to_string();
    fill_slug(&mut input.slug, &input.title);

    let mut errors = ValidationErrors::default();
    check_title(&mut errors, &input.title);
    check_slug(&mut errors, &input.slug);
    check_image_url(&mut errors, input.image_url.as_deref());
    errors.into_result().map(|()| input)
}

pub fn check_service_changes(changes: &ServiceChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(title) = &changes.title {
        check_title(&mut errors, title);
    }
    if let Some(slug) = &changes.slug {
        check_slug(&mut errors, slug);
    }
    check_image_url(&mut errors, changes.image_url.as_deref());
    errors.into_result()
}

/// Normalises and validates a new growth blueprint.
pub fn prepare_blueprint(mut input: BlueprintInput) -> Result<BlueprintInput, ValidationErrors> {
    input.title = input.title.trim().to_string();
    fill_slug(&mut input.slug, &input.title);

    let mut errors = ValidationErrors::default();
    check_title(&mut errors, &input.title);
    check_slug(&mut errors, &input.slug);
    check_image_url(&mut errors, input.image_url.as_deref());
    errors.into_result().map(|()| input)
}

pub fn check_blueprint_changes(changes: &BlueprintChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(title) = &changes.title {
        check_title(&mut errors, title);
    }
    if let Some(slug) = &changes.slug {
        check_slug(&mut errors, slug);
    }
    check_image_url(&mut errors, changes.image_url.as_deref());
    errors.into_result()
}

/// prepare_contact
///
/// Name, email and message must be present after trimming. A blank company is
/// stored as NULL.
pub fn prepare_contact(mut request: ContactRequest) -> Result<ContactRequest, ValidationErrors> {
    request.name = request.name.trim().to_string();
    request.email = request.email.trim().to_string();
    request.message = request.message.trim().to_string();
    request.company = request
        .company
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let mut errors = ValidationErrors::default();
    if request.name.is_empty() {
        errors.add("name", "Name is required");
    }
    if request.email.is_empty() {
        errors.add("email", "Email is required");
    }
    if request.message.is_empty() {
        errors.add("message", "Message is required");
    }
    errors.into_result().map(|()| request)
}

pub fn prepare_about_section(
    mut input: AboutSectionInput,
) -> Result<AboutSectionInput, ValidationErrors> {
    input.section_name = input.section_name.trim().to_lowercase();

    let mut errors = ValidationErrors::default();
    check_section_name(&mut errors, &input.section_name);
    check_image_url(&mut errors, input.image_url.as_deref());
    errors.into_result().map(|()| input)
}

pub fn check_about_changes(changes: &AboutSectionChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(name) = &changes.section_name {
        check_section_name(&mut errors, name);
    }
    check_image_url(&mut errors, changes.image_url.as_deref());
    errors.into_result()
}

pub fn check_login(request: &LoginRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if request.email.trim().is_empty() {
        errors.add("email", "Email is required");
    }
    if request.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}
