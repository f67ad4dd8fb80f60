/// Router Module Index
///
/// Routes are split by who may reach them. Access control is attached per module
/// (extractors or layers), never per route by hand.

/// Routes accessible to anonymous visitors: the public content API, contact intake,
/// sign-in and diagnostics. Content reads only ever see published rows.
pub mod public;

/// Routes that need a valid session but no admin membership.
pub mod authenticated;

/// The admin JSON API. Every handler takes the `AdminUser` extractor (401/403).
pub mod admin;

/// Page payloads: the public marketing pages and the admin pages behind the Route Guard.
pub mod pages;
