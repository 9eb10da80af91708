//! Input validation shared by every caller of the dispatch operations.
//!
//! The forms in front of the core run the same checks first; the core repeats
//! them so a bad call can never persist a record without its mandatory text.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::CoreError;

/// Strict map-link pattern (Google Maps hosts and short links).
static MAPS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(google\.[a-z.]+/maps|maps\.google\.[a-z.]+|goo\.gl/maps|maps\.app\.goo\.gl)/.+$",
    )
    .expect("maps url pattern is valid")
});

/// Any of these in a link is enough for it to count as a location.
const MAP_KEYWORDS: [&str; 4] = ["maps", "google", "location", "place"];

/// Returns the trimmed value, or a validation error naming the field.
///
/// # Errors
///
/// `CoreError::Validation` when the value is absent or blank.
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

/// Whether a link matches the strict map-service pattern.
#[must_use]
pub fn is_map_service_link(url: &str) -> bool {
    MAPS_URL.is_match(url.trim())
}

/// Lenient check used by the incident form: strict pattern or any map keyword.
///
/// # Errors
///
/// `CoreError::Validation` when the link is blank or does not look like a location.
pub fn validate_maps_url(url: &str) -> Result<(), CoreError> {
    let url = require_text("mapsUrl", Some(url))?;
    let lowered = url.to_lowercase();
    if is_map_service_link(url) || MAP_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "mapsUrl must be a map link: {url}"
        )))
    }
}
