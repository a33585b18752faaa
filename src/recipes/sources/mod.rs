// ABOUTME: Recipe source abstraction, query predicate, and result page shape
// ABOUTME: Remote catalog and bundled dataset implement the same trait for the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Recipe data sources
//!
//! Both the remote catalog ([`remote::RemoteRecipeSource`]) and the bundled
//! dataset ([`bundled::BundledRecipeSource`]) serve the same [`RecipeSource`]
//! contract; the [`router::RecipeSourceRouter`] picks between them.

use crate::errors::AppResult;
use crate::recipes::models::{AdaptedRecipe, RecipeCategory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod bundled;
pub mod remote;
pub mod router;

pub use bundled::BundledRecipeSource;
pub use remote::RemoteRecipeSource;
pub use router::RecipeSourceRouter;

/// Filter applied to a recipe fetch
///
/// The same predicate drives server-side filtering on the remote catalog and
/// in-memory filtering over the bundled dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeQuery {
    /// Substring match over title, description, and tags, case-insensitive
    pub search: Option<String>,
    /// Exact category match
    pub category: Option<RecipeCategory>,
    /// 1-based result page
    pub page: u32,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            page: 1,
        }
    }
}

impl RecipeQuery {
    /// Unfiltered first page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to recipes whose text contains the term
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict to one category
    #[must_use]
    pub const fn with_category(mut self, category: RecipeCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Request a specific page
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Whether a recipe satisfies this query
    #[must_use]
    pub fn matches(&self, recipe: &AdaptedRecipe) -> bool {
        if let Some(category) = self.category {
            if recipe.category != category {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            if needle.is_empty() {
                return true;
            }
            let in_title = recipe.title.to_lowercase().contains(&needle);
            let in_description = recipe.description.to_lowercase().contains(&needle);
            let in_tags = recipe
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle));
            return in_title || in_description || in_tags;
        }

        true
    }
}

/// One page of adapted recipes plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePage {
    /// Recipes on this page
    pub recipes: Vec<AdaptedRecipe>,
    /// 1-based page number
    pub page: u32,
    /// Total pages available
    pub total_pages: u32,
    /// Total matching recipes across all pages
    pub total_count: u64,
}

impl RecipePage {
    /// Wrap a full result set as a single page
    #[must_use]
    pub fn single(recipes: Vec<AdaptedRecipe>) -> Self {
        let total_count = recipes.len() as u64;
        Self {
            recipes,
            page: 1,
            total_pages: 1,
            total_count,
        }
    }
}

/// A place recipes come from
///
/// Implementations either succeed with a full page or fail; partial results
/// are never returned, which lets the router treat any error as "try the
/// fallback instead".
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Provenance label stamped into logs ("catalog", "internal")
    fn name(&self) -> &str;

    /// Fetch one page of recipes matching the query
    async fn fetch_recipes(&self, query: &RecipeQuery) -> AppResult<RecipePage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::models::{Difficulty, Macros};

    fn recipe(title: &str, category: RecipeCategory, tags: &[&str]) -> AdaptedRecipe {
        AdaptedRecipe {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            image_url: None,
            category,
            prep_time_minutes: 10,
            cook_time_minutes: 20,
            servings: 2,
            macros: Macros::rounded(300.0, 20.0, 30.0, 8.0),
            difficulty: Difficulty::Easy,
            description: String::new(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            rating: None,
            review_count: 0,
            source: "internal".to_string(),
        }
    }

    #[test]
    fn test_category_match_is_exact() {
        let query = RecipeQuery::new().with_category(RecipeCategory::Lunch);
        assert!(query.matches(&recipe("Rice Bowl", RecipeCategory::Lunch, &[])));
        assert!(!query.matches(&recipe("Oats", RecipeCategory::Breakfast, &[])));
    }

    #[test]
    fn test_search_spans_title_description_and_tags() {
        let query = RecipeQuery::new().with_search("Protein");
        assert!(query.matches(&recipe("Protein Shake", RecipeCategory::Snack, &[])));
        assert!(query.matches(&recipe("Shake", RecipeCategory::Snack, &["high-protein"])));
        assert!(!query.matches(&recipe("Rice Bowl", RecipeCategory::Lunch, &[])));
    }

    #[test]
    fn test_both_filters_must_hold() {
        let query = RecipeQuery::new()
            .with_search("bowl")
            .with_category(RecipeCategory::Lunch);
        assert!(query.matches(&recipe("Rice Bowl", RecipeCategory::Lunch, &[])));
        assert!(!query.matches(&recipe("Breakfast Bowl", RecipeCategory::Breakfast, &[])));
        assert!(!query.matches(&recipe("Rice Plate", RecipeCategory::Lunch, &[])));
    }
}
