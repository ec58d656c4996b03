//! Repository for the `exercises` table.

use gymar_core::types::DbId;
use sqlx::PgPool;

use crate::models::exercise::{CreateExercise, Exercise, UpdateExercise};

/// Column list for the `exercises` table.
const COLUMNS: &str = "id, name, slug, description, category_id, model_url, video_url, \
    created_at, updated_at";

/// Provides CRUD operations for exercises.
pub struct ExerciseRepo;

impl ExerciseRepo {
    /// Insert a new exercise, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateExercise) -> Result<Exercise, sqlx::Error> {
        let query = format!(
            "INSERT INTO exercises (name, slug, description, category_id, model_url, video_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.model_url)
            .bind(&input.video_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises WHERE id = $1");
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises WHERE slug = $1");
        sqlx::query_as::<_, Exercise>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all exercises, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Exercise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exercises ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Exercise>(&query).fetch_all(pool).await
    }

    /// Case-insensitive substring search on the name, ordered by name.
    pub async fn search_by_name(pool: &PgPool, term: &str) -> Result<Vec<Exercise>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exercises \
             WHERE name ILIKE $1 ESCAPE '\\' \
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(format!("%{}%", escape_like(term)))
            .fetch_all(pool)
            .await
    }

    /// List exercises in a category, ordered by name.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<Exercise>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exercises WHERE category_id = $1 ORDER BY name, id"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Every slug currently in use. Drives QR orphan cleanup.
    pub async fn list_slugs(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM exercises ORDER BY slug")
            .fetch_all(pool)
            .await
    }

    /// Update an exercise. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExercise,
    ) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!(
            "UPDATE exercises SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description), \
                category_id = COALESCE($5, category_id), \
                model_url = COALESCE($6, model_url), \
                video_url = COALESCE($7, video_url), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.model_url)
            .bind(&input.video_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete an exercise, returning the deleted row (its slug names the
    /// QR artifact to remove). Returns `None` if it did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Exercise>, sqlx::Error> {
        let query = format!("DELETE FROM exercises WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
