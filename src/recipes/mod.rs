// ABOUTME: Recipe ingestion pipeline: raw catalog records to adapted recipes
// ABOUTME: Covers parsing, classification, normalization, and source routing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Recipe pipeline
//!
//! Catalog payloads arrive as loosely-shaped [`raw::RawRecipeRecord`] values.
//! The [`normalizer::RecipeNormalizer`] turns each one into a complete
//! [`models::AdaptedRecipe`], consulting the [`classifier::RecipeClassifier`]
//! for category, tags, and macro estimates. [`sources`] wires the pipeline to
//! the remote catalog and the bundled dataset.

pub mod classifier;
pub mod models;
pub mod normalizer;
pub mod raw;
pub mod sources;

pub use classifier::{ClassifierConfig, RecipeClassifier};
pub use models::{AdaptedRecipe, Difficulty, Ingredient, Macros, RecipeCategory};
pub use normalizer::RecipeNormalizer;
pub use raw::RawRecipeRecord;
pub use sources::{
    BundledRecipeSource, RecipePage, RecipeQuery, RecipeSource, RecipeSourceRouter,
    RemoteRecipeSource,
};
