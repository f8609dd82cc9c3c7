use actix_web::HttpRequest;
use actix_web::http::header::ACCEPT_LANGUAGE;
use heck::ToKebabCase;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::utils::i18n::Language;

/// Length of the random suffix appended to generated slugs
pub const SLUG_SUFFIX_LENGTH: usize = 6;

/// Language for user-facing messages: explicit `lang` wins, then the
/// `Accept-Language` header, then English.
pub fn request_language(req: &HttpRequest, explicit: Option<&str>) -> Language {
    if let Some(tag) = explicit.filter(|t| !t.trim().is_empty()) {
        return Language::from_tag(tag);
    }
    req.headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default()
}

/// URL slug for a title, made unique with a short random suffix.
pub fn generate_slug(title: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_SUFFIX_LENGTH)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    let base = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .to_kebab_case();

    if base.is_empty() {
        suffix
    } else {
        format!("{}-{}", base, suffix)
    }
}
