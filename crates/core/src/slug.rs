//! Exercise slug and name rules.
//!
//! Slugs appear in deep links (`/ar/{slug}`) and in QR artifact file names
//! (`{slug}.png`), so they are restricted to characters that are safe in
//! both places.

use crate::error::CoreError;

/// Maximum length of an exercise slug.
pub const MAX_SLUG_LEN: usize = 100;

/// Maximum length of an exercise display name.
pub const MAX_NAME_LEN: usize = 200;

/// Generate a URL-safe slug from a display name.
///
/// Lowercases, maps every non-alphanumeric ASCII character to a hyphen,
/// collapses runs of hyphens, and trims them from both ends. Non-ASCII
/// letters are dropped to hyphens as well, so "Tríceps no Banco" becomes
/// `"tr-ceps-no-banco"`.
pub fn generate_slug(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_hyphen = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_matches('-').to_string()
}

/// Validate an exercise slug (non-empty, bounded, lowercase alphanumeric + hyphens).
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(CoreError::Validation(
            "Slug must not start or end with a hyphen".into(),
        ));
    }
    Ok(())
}

/// Validate an exercise display name (non-blank, <= 200 chars).
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}
