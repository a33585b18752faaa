// ABOUTME: Application context assembling every service from configuration at startup
// ABOUTME: Passed by reference into entry points, replacing global singletons
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 NutriFit.app

//! Application context
//!
//! All services are constructed once here from [`ServerConfig`] and injected
//! into their consumers. Nothing in the crate reaches for hidden globals.

use crate::config::environment::ServerConfig;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::external::{OriginClientConfig, OriginLookupClient};
use crate::recipes::sources::{BundledRecipeSource, RecipeSourceRouter, RemoteRecipeSource};
use crate::services::signup::SignupService;
use crate::terms::{
    AcceptanceEvaluator, AcceptanceRecorder, StateReconciler, TermsGate, TermsRegistry,
};
use std::sync::Arc;
use tracing::info;

/// Fully wired application services
#[derive(Clone)]
pub struct AppContext {
    config: Arc<ServerConfig>,
    database: Arc<Database>,
    evaluator: AcceptanceEvaluator,
    recorder: AcceptanceRecorder,
    reconciler: StateReconciler,
    recipe_router: Arc<RecipeSourceRouter>,
    signup: SignupService,
}

impl AppContext {
    /// Assemble the service graph from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a service
    /// dependency fails to construct
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Arc::new(
            Database::new(&config.database.url.to_connection_string())
                .await
                .map_err(|e| AppError::database(format!("Failed to initialize database: {e}")))?,
        );
        if config.database.auto_migrate {
            database
                .migrate()
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        info!("Database ready: {}", database.backend_info());

        let registry = TermsRegistry::new(&config.terms);
        let evaluator = AcceptanceEvaluator::new(
            database.clone(),
            registry.clone(),
            config.terms.failure_posture,
        );

        let mut recorder = AcceptanceRecorder::new(database.clone(), registry);
        if config.external_services.origin_lookup.enabled {
            let origin_client = OriginLookupClient::new(OriginClientConfig {
                base_url: config.external_services.origin_lookup.base_url.clone(),
                ..OriginClientConfig::default()
            })?;
            recorder = recorder.with_origin_resolver(Arc::new(origin_client));
        }

        let reconciler = StateReconciler::new(database.clone());
        let recipe_router = Arc::new(Self::build_recipe_router(&config)?);
        let signup = SignupService::new(database.clone(), recorder.clone(), &config.signup);

        Ok(Self {
            config: Arc::new(config),
            database,
            evaluator,
            recorder,
            reconciler,
            recipe_router,
            signup,
        })
    }

    fn build_recipe_router(config: &ServerConfig) -> AppResult<RecipeSourceRouter> {
        // With the catalog disabled the bundled dataset serves as primary
        // outright; the fallback slot stays empty either way unless enabled.
        let mut router = if config.recipes.catalog.enabled {
            let remote = RemoteRecipeSource::new(config.recipes.catalog.clone())?;
            RecipeSourceRouter::new(Arc::new(remote))
        } else {
            return Ok(RecipeSourceRouter::new(Arc::new(BundledRecipeSource::new())));
        };

        if config.recipes.enable_bundled_fallback {
            router = router.with_fallback(Arc::new(BundledRecipeSource::new()));
        }
        Ok(router)
    }

    #[must_use]
    pub const fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    #[must_use]
    pub const fn database(&self) -> &Arc<Database> {
        &self.database
    }

    #[must_use]
    pub const fn evaluator(&self) -> &AcceptanceEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub const fn recorder(&self) -> &AcceptanceRecorder {
        &self.recorder
    }

    #[must_use]
    pub const fn reconciler(&self) -> &StateReconciler {
        &self.reconciler
    }

    #[must_use]
    pub const fn recipe_router(&self) -> &Arc<RecipeSourceRouter> {
        &self.recipe_router
    }

    #[must_use]
    pub const fn signup(&self) -> &SignupService {
        &self.signup
    }

    /// Fresh terms gate for one authenticated session
    #[must_use]
    pub fn terms_gate(&self) -> TermsGate {
        TermsGate::new(self.evaluator.clone(), self.recorder.clone())
    }
}
