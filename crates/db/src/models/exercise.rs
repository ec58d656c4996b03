//! Exercise entity model and DTOs.
//!
//! An exercise is identified publicly by its slug, which drives both the
//! AR deep link and the QR artifact file name.

use gymar_core::error::CoreError;
use gymar_core::slug::{validate_name, validate_slug, MAX_NAME_LEN, MAX_SLUG_LEN};
use gymar_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `exercises` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exercise {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    /// Reference to the 3D asset (e.g. `/models/squat.glb`).
    pub model_url: Option<String>,
    /// Reference to the demonstration video.
    pub video_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new exercise.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExercise {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    #[validate(length(max = 2048))]
    pub model_url: Option<String>,
    #[validate(length(max = 2048))]
    pub video_url: Option<String>,
}

/// DTO for updating an exercise. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExercise {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    #[validate(length(max = 2048))]
    pub model_url: Option<String>,
    #[validate(length(max = 2048))]
    pub video_url: Option<String>,
}

impl CreateExercise {
    /// Check field lengths and the slug/name rules from `gymar_core::slug`.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(validation_error)?;
        validate_name(&self.name)?;
        validate_slug(&self.slug)
    }
}

impl UpdateExercise {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(validation_error)?;
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        Ok(())
    }

    /// Whether the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.model_url.is_none()
            && self.video_url.is_none()
    }

    /// Whether applying this update to `current` changes its name or slug,
    /// i.e. whether the QR artifact needs regenerating.
    pub fn changes_identity_of(&self, current: &Exercise) -> bool {
        self.name.as_ref().is_some_and(|n| *n != current.name)
            || self.slug.as_ref().is_some_and(|s| *s != current.slug)
    }
}

fn validation_error(errors: validator::ValidationErrors) -> CoreError {
    let fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    CoreError::Validation(format!(
        "Invalid field(s): {} (name <= {MAX_NAME_LEN} chars, slug <= {MAX_SLUG_LEN} chars)",
        fields.join(", ")
    ))
}
