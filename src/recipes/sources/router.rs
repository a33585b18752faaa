// ABOUTME: Routes recipe fetches to the primary source with optional fallback
// ABOUTME: A request is served entirely by one source, results never merge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::errors::AppResult;
use crate::logging::AppLogger;
use crate::recipes::sources::{RecipePage, RecipeQuery, RecipeSource};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Picks which recipe source serves a request
///
/// The primary source is always tried first. When it fails and a fallback is
/// configured, the fallback serves the whole request; a page is never
/// assembled from both sources. Without a fallback the primary error reaches
/// the caller unchanged.
#[derive(Clone)]
pub struct RecipeSourceRouter {
    primary: Arc<dyn RecipeSource>,
    fallback: Option<Arc<dyn RecipeSource>>,
}

impl RecipeSourceRouter {
    /// Router that only knows the primary source
    #[must_use]
    pub fn new(primary: Arc<dyn RecipeSource>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Attach a fallback source for primary failures
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn RecipeSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Whether a fallback source is configured
    #[must_use]
    pub const fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fetch one page of recipes, failing over if the primary source errors
    pub async fn fetch_recipes(&self, query: &RecipeQuery) -> AppResult<RecipePage> {
        let started = Instant::now();

        match self.primary.fetch_recipes(query).await {
            Ok(page) => {
                AppLogger::log_recipe_fetch(
                    self.primary.name(),
                    page.recipes.len(),
                    true,
                    started.elapsed().as_millis() as u64,
                );
                Ok(page)
            }
            Err(primary_err) => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        error = %primary_err,
                        "Primary recipe source failed, serving bundled fallback"
                    );
                    let page = fallback.fetch_recipes(query).await?;
                    AppLogger::log_recipe_fetch(
                        fallback.name(),
                        page.recipes.len(),
                        true,
                        started.elapsed().as_millis() as u64,
                    );
                    Ok(page)
                }
                None => {
                    AppLogger::log_recipe_fetch(
                        self.primary.name(),
                        0,
                        false,
                        started.elapsed().as_millis() as u64,
                    );
                    Err(primary_err)
                }
            },
        }
    }
}
