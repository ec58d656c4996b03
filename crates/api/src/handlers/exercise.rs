//! Handlers for the `/exercises` resource.
//!
//! Every mutating handler keeps the QR artifact directory in step with the
//! row it wrote. Artifact failures are logged and never change the response.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gymar_core::error::CoreError;
use gymar_core::types::DbId;
use gymar_db::models::exercise::{CreateExercise, Exercise, UpdateExercise};
use gymar_db::repositories::{CategoryRepo, ExerciseRepo};

use crate::error::{AppError, AppResult};
use crate::query::ExerciseListParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Exercise",
        id,
    })
}

/// GET /api/exercises?search=&category=
///
/// List exercises, newest first. `search` matches names case-insensitively;
/// `category` restricts to a category slug.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ExerciseListParams>,
) -> AppResult<impl IntoResponse> {
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let category = match params.category.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => Some(
            CategoryRepo::find_by_slug(&state.pool, slug)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::NotFoundBySlug {
                        entity: "Category",
                        slug: slug.to_string(),
                    })
                })?,
        ),
        None => None,
    };

    let exercises: Vec<Exercise> = match (search, &category) {
        (Some(term), Some(category)) => ExerciseRepo::search_by_name(&state.pool, term)
            .await?
            .into_iter()
            .filter(|e| e.category_id == Some(category.id))
            .collect(),
        (Some(term), None) => ExerciseRepo::search_by_name(&state.pool, term).await?,
        (None, Some(category)) => ExerciseRepo::list_by_category(&state.pool, category.id).await?,
        (None, None) => ExerciseRepo::list(&state.pool).await?,
    };

    Ok(Json(DataResponse { data: exercises }))
}

/// POST /api/exercises
///
/// Create an exercise and write its QR artifact.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateExercise>,
) -> AppResult<impl IntoResponse> {
    input.check()?;

    let exercise = ExerciseRepo::create(&state.pool, &input).await?;
    tracing::info!(id = exercise.id, slug = %exercise.slug, "Exercise created");

    state.qr_store.sync_created(&exercise.slug).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: exercise })))
}

/// GET /api/exercises/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let exercise = ExerciseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: exercise }))
}

/// GET /api/exercises/slug/{slug}
///
/// Stable lookup used by the AR viewer when a QR code is scanned.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let exercise = ExerciseRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBySlug {
                entity: "Exercise",
                slug: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: exercise }))
}

/// PUT /api/exercises/{id}
///
/// Update an exercise. A changed name or slug regenerates the QR artifact;
/// a changed slug also removes the artifact stored under the old slug.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExercise>,
) -> AppResult<impl IntoResponse> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    input.check()?;

    let current = ExerciseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let updated = ExerciseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    if input.changes_identity_of(&current) {
        tracing::info!(
            id,
            old_slug = %current.slug,
            new_slug = %updated.slug,
            "Exercise identity changed, refreshing QR artifact"
        );
        state
            .qr_store
            .sync_updated(&current.slug, &updated.slug)
            .await;
    }

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/exercises/{id}
///
/// Delete an exercise and its QR artifact.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ExerciseRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, slug = %deleted.slug, "Exercise deleted");

    state.qr_store.sync_deleted(&deleted.slug).await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/exercises/qrcodes/cleanup
///
/// Remove QR artifacts whose slug no longer belongs to any exercise.
pub async fn cleanup_qrcodes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let valid: HashSet<String> = ExerciseRepo::list_slugs(&state.pool)
        .await?
        .into_iter()
        .collect();

    let report = state
        .qr_store
        .cleanup_orphans(&valid)
        .await
        .map_err(|e| AppError::InternalError(format!("QR cleanup failed: {e}")))?;
    tracing::info!(cleaned = report.cleaned, errors = report.errors, "QR cleanup finished");

    Ok(Json(DataResponse { data: report }))
}

/// POST /api/exercises/qrcodes/regenerate
///
/// Rewrite the QR artifact of every exercise.
pub async fn regenerate_qrcodes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let slugs = ExerciseRepo::list_slugs(&state.pool).await?;
    let report = state.qr_store.regenerate_all(&slugs).await;
    tracing::info!(
        generated = report.generated,
        failed = report.failed,
        "QR regeneration finished"
    );
    Ok(Json(DataResponse { data: report }))
}
