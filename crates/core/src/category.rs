//! Exercise category constants.
//!
//! Categories are stored in the `categories` table; these are the slugs
//! seeded by the initial migration.

pub const CATEGORY_UPPER_BODY: &str = "upper-body";
pub const CATEGORY_LOWER_BODY: &str = "lower-body";

/// Category slugs present after a fresh migration.
pub const SEEDED_CATEGORIES: &[&str] = &[CATEGORY_UPPER_BODY, CATEGORY_LOWER_BODY];
