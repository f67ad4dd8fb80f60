use fusion_focus::{
    models::{
        ContactFilter, ContactStatus, ContentSource, ListOptions, ServiceChanges, ServiceInput,
        SortField,
    },
    validation,
};
use serde_json::json;

// --- Wire formats ---

#[test]
fn test_contact_status_uses_kebab_case() {
    assert_eq!(
        serde_json::to_value(ContactStatus::InProgress).unwrap(),
        json!("in-progress")
    );
    let parsed: ContactStatus = serde_json::from_value(json!("completed")).unwrap();
    assert_eq!(parsed, ContactStatus::Completed);
    assert!(serde_json::from_value::<ContactStatus>(json!("in_progress")).is_err());
}

#[test]
fn test_contact_status_from_stored_text() {
    // Mirrors the CHECK constraint on contact_submissions.status.
    for status in [
        ContactStatus::New,
        ContactStatus::InProgress,
        ContactStatus::Completed,
    ] {
        assert_eq!(
            ContactStatus::try_from(status.as_str().to_string()).unwrap(),
            status
        );
    }
    let err = ContactStatus::try_from("archived".to_string()).unwrap_err();
    assert_eq!(err.to_string(), "unknown contact status `archived`");
}

#[test]
fn test_content_source_serialization() {
    assert_eq!(serde_json::to_value(ContentSource::Store).unwrap(), json!("store"));
    assert_eq!(
        serde_json::to_value(ContentSource::Fallback).unwrap(),
        json!("fallback")
    );
}

#[test]
fn test_changes_omit_absent_fields() {
    let changes = ServiceChanges {
        published: Some(true),
        ..ServiceChanges::default()
    };
    assert_eq!(serde_json::to_value(&changes).unwrap(), json!({ "published": true }));
}

#[test]
fn test_service_input_defaults_missing_fields() {
    let input: ServiceInput = serde_json::from_value(json!({ "title": "Market Research" })).unwrap();
    assert_eq!(input.slug, "");
    assert!(input.features.is_empty());
    assert!(!input.published);
}

// --- Listing options ---

#[test]
fn test_list_options_defaults() {
    let opts = ListOptions::default();
    assert_eq!(opts.effective_limit(), None);
    assert_eq!(opts.sort_field(), SortField::CreatedAt);
    assert!(!opts.is_ascending());
}

#[test]
fn test_non_positive_limit_means_unlimited() {
    assert_eq!(ListOptions::with_limit(0).effective_limit(), None);
    assert_eq!(ListOptions::with_limit(-3).effective_limit(), None);
    assert_eq!(ListOptions::with_limit(3).effective_limit(), Some(3));
}

#[test]
fn test_list_options_from_query_string() {
    let opts: ListOptions =
        serde_json::from_value(json!({ "limit": 2, "order_by": "title", "ascending": true }))
            .unwrap();
    assert_eq!(opts.sort_field().column(), "title");
    assert!(opts.is_ascending());

    let filter: ContactFilter = serde_json::from_value(json!({ "status": "new" })).unwrap();
    assert_eq!(filter.status, Some(ContactStatus::New));
}

// --- Form rules ---

#[test]
fn test_contact_reports_every_missing_field() {
    let request = serde_json::from_value(json!({ "company": "Acme" })).unwrap();
    let errors = validation::prepare_contact(request).unwrap_err();

    assert!(errors.has("name"));
    assert!(errors.has("email"));
    assert!(errors.has("message"));
    assert!(!errors.has("company"));
}

#[test]
fn test_about_section_name_is_restricted() {
    let input = serde_json::from_value(json!({ "section_name": " Mission " })).unwrap();
    let prepared = validation::prepare_about_section(input).unwrap();
    assert_eq!(prepared.section_name, "mission");

    let input = serde_json::from_value(json!({ "section_name": "pricing" })).unwrap();
    assert!(validation::prepare_about_section(input).unwrap_err().has("section_name"));
}
