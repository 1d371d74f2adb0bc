// ABOUTME: Core data models for the Larder recipe sharing backend
// ABOUTME: Defines User, Recipe, Tag, Ingredient, LineItem and derived aggregation types
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Data Models
//!
//! This module contains the core data structures used throughout the Larder
//! backend. The relational schema they map to lives in `crate::database`.
//!
//! ## Core Models
//!
//! - `User`: registered account, owner of recipes, carts and subscriptions
//! - `Tag` / `Ingredient`: immutable reference data shared across recipes
//! - `Recipe`: an authored recipe with tags and ingredient line items
//! - `LineItem`: a (recipe, ingredient, quantity) association
//! - `AggregatedLine`: derived per-ingredient total produced by the
//!   shopping list aggregator; never persisted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, unique across users, used for login
    pub email: String,
    /// Public handle shown next to authored recipes
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Bcrypt hash of the user's password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly generated id
    #[must_use]
    pub fn new(
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            first_name,
            last_name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Public view of a user, as embedded in recipe and subscription payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the viewing user follows this user
    pub is_subscribed: bool,
}

impl UserProfile {
    /// Build a profile view from a user row and a subscription flag
    #[must_use]
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// A recipe category tag, read-only reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Tag identifier
    pub id: i64,
    /// Unique display name
    pub name: String,
    /// Unique URL slug
    pub slug: String,
}

/// An ingredient reference entry
///
/// Ingredient identity is the `(name, measurement_unit)` pair: "flour" in
/// grams and "flour" in kilograms are distinct ingredients and never merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    /// Ingredient identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Measurement unit, e.g. "g", "ml", "pcs"
    pub measurement_unit: String,
}

/// A recipe with resolved tags, line items and per-viewer flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe identifier
    pub id: Uuid,
    /// Tags attached to this recipe
    pub tags: Vec<Tag>,
    /// Author profile as seen by the viewer
    pub author: UserProfile,
    /// Ingredient line items
    pub ingredients: Vec<LineItem>,
    /// Whether the viewing user has favorited this recipe
    pub is_favorited: bool,
    /// Whether the viewing user has this recipe in their shopping cart
    pub is_in_shopping_cart: bool,
    /// Recipe title
    pub name: String,
    /// Base64-encoded image payload, stored opaquely
    pub image: Option<String>,
    /// Preparation instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Creation timestamp, newest recipes list first
    pub created_at: DateTime<Utc>,
}

/// Compact recipe view used in favorite/cart responses and subscription lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    /// Recipe identifier
    pub id: Uuid,
    /// Recipe title
    pub name: String,
    /// Base64-encoded image payload
    pub image: Option<String>,
    /// Cooking time in minutes
    pub cooking_time: i64,
}

/// A single ingredient line inside a recipe, with the reference data resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    /// Referenced ingredient id
    pub id: i64,
    /// Ingredient display name
    pub name: String,
    /// Ingredient measurement unit
    pub measurement_unit: String,
    /// Quantity, a positive integer
    pub amount: i64,
}

/// Write-side ingredient entry as submitted by clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItemInput {
    /// Referenced ingredient id
    pub id: i64,
    /// Quantity, validated against the configured bounds
    pub amount: i64,
}

/// Unvalidated recipe payload for create and full-update operations
///
/// `crate::validation` checks the tag and ingredient lists before any of
/// this reaches the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// Tag ids to attach
    pub tags: Vec<i64>,
    /// Ingredient entries; the full line item set is replaced atomically
    pub ingredients: Vec<LineItemInput>,
    /// Recipe title
    pub name: String,
    /// Base64-encoded image payload
    #[serde(default)]
    pub image: Option<String>,
    /// Preparation instructions
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
}

/// Derived per-ingredient total produced by the shopping list aggregator
///
/// Computed fresh on each export request and never persisted. Two line
/// items contribute to the same `AggregatedLine` iff their ingredient
/// name and unit match exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedLine {
    /// Ingredient display name
    pub name: String,
    /// Exact integer sum of matching line item quantities
    pub amount: i64,
    /// Ingredient measurement unit
    pub measurement_unit: String,
}

/// A (follower, author) subscription record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// The user who follows
    pub follower_id: Uuid,
    /// The author being followed
    pub author_id: Uuid,
    /// When the subscription was created
    pub created_at: DateTime<Utc>,
}

/// A short link attached to a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLink {
    /// The linked recipe
    pub recipe_id: Uuid,
    /// Unique lowercase-alphanumeric code
    pub code: String,
}
