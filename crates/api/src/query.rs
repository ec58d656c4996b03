//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Filters for `GET /exercises` (`?search=&category=`).
///
/// `search` is a case-insensitive substring of the name; `category` is a
/// category slug. Both may be combined.
#[derive(Debug, Default, Deserialize)]
pub struct ExerciseListParams {
    pub search: Option<String>,
    pub category: Option<String>,
}
