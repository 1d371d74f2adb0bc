// ABOUTME: Recipe write-path validation for ingredient and tag lists
// ABOUTME: Rejects empty lists, duplicate identities, out-of-range quantities, and unknown references

//! # Recipe Write-Path Validation
//!
//! Every recipe create or full update passes through here before anything
//! touches the database. A failure aborts the entire write; the atomic
//! line item replace in `crate::database::recipes` then guarantees the
//! prior state is untouched.
//!
//! Duplicate detection is a set-uniqueness check over ingredient identity
//! (the referenced ingredient id, hence the (name, unit) pair), not over
//! line item identity.

use crate::config::environment::ValidationConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{LineItemInput, RecipeDraft};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::HashSet;

/// Validate the shape of a recipe draft without touching the database
///
/// Checks list emptiness, duplicates, and numeric bounds. Reference
/// existence is checked separately by [`validate_references`].
pub fn validate_draft(draft: &RecipeDraft, bounds: &ValidationConfig) -> AppResult<()> {
    validate_tag_list(&draft.tags)?;
    validate_ingredient_list(&draft.ingredients, bounds)?;

    if draft.cooking_time < bounds.min_cooking_time || draft.cooking_time > bounds.max_cooking_time
    {
        return Err(AppError::validation(
            ErrorCode::ValueOutOfRange,
            format!(
                "cooking_time {} outside [{}, {}]",
                draft.cooking_time, bounds.min_cooking_time, bounds.max_cooking_time
            ),
            "cooking_time",
            "range",
        ));
    }

    if draft.name.trim().is_empty() {
        return Err(AppError::validation(
            ErrorCode::MissingRequiredField,
            "recipe name must not be empty",
            "name",
            "non_empty",
        ));
    }

    if let Some(image) = draft.image.as_deref() {
        validate_image_payload(image)?;
    }

    Ok(())
}

/// Validate an image payload: a bare base64 string or a
/// `data:image/...;base64,` URI whose payload decodes
pub fn validate_image_payload(image: &str) -> AppResult<()> {
    let encoded = image.split_once(";base64,").map_or(image, |(_, rest)| rest);

    if encoded.trim().is_empty() {
        return Err(AppError::validation(
            ErrorCode::MissingRequiredField,
            "image payload must not be empty",
            "image",
            "non_empty",
        ));
    }

    if let Err(e) = STANDARD.decode(encoded.trim()) {
        return Err(AppError::validation(
            ErrorCode::InvalidInput,
            format!("image is not valid base64: {e}"),
            "image",
            "base64",
        ));
    }

    Ok(())
}

/// Validate the tag id list: non-empty, no duplicates
pub fn validate_tag_list(tags: &[i64]) -> AppResult<()> {
    if tags.is_empty() {
        return Err(AppError::validation(
            ErrorCode::MissingTags,
            "at least one tag is required",
            "tags",
            "non_empty",
        ));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    for &tag_id in tags {
        if !seen.insert(tag_id) {
            return Err(AppError::validation(
                ErrorCode::DuplicateTag,
                format!("tag {tag_id} appears more than once"),
                "tags",
                "unique",
            ));
        }
    }

    Ok(())
}

/// Validate the ingredient entry list: non-empty, unique identities,
/// quantities within the configured bounds
pub fn validate_ingredient_list(
    items: &[LineItemInput],
    bounds: &ValidationConfig,
) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::validation(
            ErrorCode::MissingIngredients,
            "at least one ingredient is required",
            "ingredients",
            "non_empty",
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err(AppError::validation(
                ErrorCode::DuplicateIngredient,
                format!("ingredient {} appears more than once", item.id),
                "ingredients",
                "unique",
            ));
        }

        if item.amount < bounds.min_quantity || item.amount > bounds.max_quantity {
            return Err(AppError::validation(
                ErrorCode::InvalidQuantity,
                format!(
                    "quantity {} for ingredient {} outside [{}, {}]",
                    item.amount, item.id, bounds.min_quantity, bounds.max_quantity
                ),
                "ingredients",
                "quantity_range",
            ));
        }
    }

    Ok(())
}

/// Verify that every referenced tag and ingredient exists
///
/// # Errors
///
/// Returns `UnknownIngredient` naming the first missing ingredient id, or
/// an `InvalidInput` naming the first missing tag id.
pub async fn validate_references(db: &Database, draft: &RecipeDraft) -> AppResult<()> {
    let missing_tags = db.missing_tag_ids(&draft.tags).await?;
    if let Some(tag_id) = missing_tags.first() {
        return Err(AppError::validation(
            ErrorCode::InvalidInput,
            format!("tag {tag_id} does not exist"),
            "tags",
            "exists",
        ));
    }

    let ingredient_ids: Vec<i64> = draft.ingredients.iter().map(|i| i.id).collect();
    let missing = db.missing_ingredient_ids(&ingredient_ids).await?;
    if let Some(ingredient_id) = missing.first() {
        return Err(AppError::validation(
            ErrorCode::UnknownIngredient,
            format!("ingredient {ingredient_id} does not exist"),
            "ingredients",
            "exists",
        ));
    }

    Ok(())
}
