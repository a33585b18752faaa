// ABOUTME: HTTP client for the remote recipe catalog API
// ABOUTME: Fetches raw catalog records and adapts them through the normalizer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::config::environment::CatalogApiConfig;
use crate::constants::timeouts::HTTP_CLIENT_TIMEOUT_SECS;
use crate::constants::recipes::REMOTE_SOURCE;
use crate::errors::{AppError, AppResult};
use crate::recipes::normalizer::RecipeNormalizer;
use crate::recipes::raw::RawRecipeRecord;
use crate::recipes::sources::{RecipePage, RecipeQuery, RecipeSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Wire shape of a catalog listing response
///
/// Every field is defaulted; older catalog deployments omit the pagination
/// block entirely.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CatalogResponse {
    recipes: Vec<RawRecipeRecord>,
    current_page: Option<u32>,
    total_pages: Option<u32>,
    total_count: Option<u64>,
}

/// Recipe source backed by the remote catalog HTTP API
#[derive(Debug, Clone)]
pub struct RemoteRecipeSource {
    config: CatalogApiConfig,
    http_client: reqwest::Client,
    normalizer: RecipeNormalizer,
}

impl RemoteRecipeSource {
    /// Create a catalog client with the standard request timeout
    pub fn new(config: CatalogApiConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            normalizer: RecipeNormalizer::default(),
        })
    }

    /// Override the normalizer, for custom classifier rules
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: RecipeNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    async fn fetch_catalog_page(&self, query: &RecipeQuery) -> AppResult<CatalogResponse> {
        let url = format!("{}/recipes", self.config.base_url);

        let mut params: Vec<(&str, String)> = vec![("page", query.page.to_string())];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = query.category {
            params.push(("category", category.as_str().to_string()));
        }
        if let Some(api_key) = &self.config.api_key {
            params.push(("api_key", api_key.clone()));
        }

        debug!("Fetching recipe catalog page {} from {}", query.page, url);

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::external_service("recipe catalog", e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "recipe catalog",
                format!("HTTP {}: {}", response.status(), url),
            ));
        }

        response
            .json::<CatalogResponse>()
            .await
            .map_err(|e| AppError::external_service("recipe catalog", format!("JSON parse error: {e}")))
    }
}

#[async_trait]
impl RecipeSource for RemoteRecipeSource {
    fn name(&self) -> &str {
        REMOTE_SOURCE
    }

    async fn fetch_recipes(&self, query: &RecipeQuery) -> AppResult<RecipePage> {
        let catalog = self.fetch_catalog_page(query).await?;

        let recipes: Vec<_> = catalog
            .recipes
            .iter()
            .map(|raw| self.normalizer.adapt(raw))
            .collect();

        // The catalog filters server-side; pagination metadata falls back to
        // a single page when the response omits it.
        let total_count = catalog.total_count.unwrap_or(recipes.len() as u64);
        Ok(RecipePage {
            recipes,
            page: catalog.current_page.unwrap_or(query.page),
            total_pages: catalog.total_pages.unwrap_or(1),
            total_count,
        })
    }
}
