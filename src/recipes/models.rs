// ABOUTME: Canonical recipe shapes produced by the normalization pipeline
// ABOUTME: Closed category set, bounded difficulty, and non-negative macro values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Closed set of recipe categories
///
/// Every adapted recipe carries exactly one of these. Classification falls
/// back to [`RecipeCategory::Lunch`] when nothing matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecipeCategory {
    /// Eaten shortly before training
    PreWorkout,
    /// Eaten shortly after training
    PostWorkout,
    /// Reduced carbohydrate profile
    LowCarb,
    /// Elevated protein profile
    HighProtein,
    /// Morning meal
    Breakfast,
    /// Between-meal portion
    Snack,
    /// Midday meal, also the classification fallback
    #[default]
    Lunch,
    /// Evening meal
    Dinner,
}

impl RecipeCategory {
    /// All categories, in no significant order
    pub const ALL: [Self; 8] = [
        Self::PreWorkout,
        Self::PostWorkout,
        Self::LowCarb,
        Self::HighProtein,
        Self::Breakfast,
        Self::Snack,
        Self::Lunch,
        Self::Dinner,
    ];

    /// Stable string form used in queries, storage, and the API surface
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreWorkout => "pre-workout",
            Self::PostWorkout => "post-workout",
            Self::LowCarb => "low-carb",
            Self::HighProtein => "high-protein",
            Self::Breakfast => "breakfast",
            Self::Snack => "snack",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    /// Parse the stable string form
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl Display for RecipeCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Preparation difficulty, inferred from step count and total time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Few steps, quick to make
    Easy,
    /// Moderate steps or time
    Medium,
    /// Long or involved preparation
    Hard,
}

impl Difficulty {
    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Per-serving macro-nutrient values
///
/// Always non-negative: calories as whole units, the gram values rounded to
/// one decimal. Construction goes through [`Macros::rounded`], which clamps
/// and rounds rather than trusting the inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Macros {
    /// Energy in kcal
    pub calories: u32,
    /// Protein in grams
    pub protein_g: f64,
    /// Carbohydrates in grams
    pub carbs_g: f64,
    /// Fat in grams
    pub fat_g: f64,
}

impl Macros {
    /// Clamp negatives to zero and round to the canonical precision
    #[must_use]
    pub fn rounded(calories: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories: calories.max(0.0).round() as u32,
            protein_g: round_one_decimal(protein_g.max(0.0)),
            carbs_g: round_one_decimal(carbs_g.max(0.0)),
            fat_g: round_one_decimal(fat_g.max(0.0)),
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One ingredient line, split into amount and name where possible
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    /// Descriptive name ("frango grelhado", "rolled oats")
    pub name: String,
    /// Leading quantity/unit token when the split succeeded ("200g", "2 cups")
    pub amount: Option<String>,
}

/// Canonical recipe shape produced by the normalizer
///
/// Derived on read from raw source records; the normalizer never persists
/// these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdaptedRecipe {
    /// Stable identity, from the source record or derived from the title
    pub id: String,
    /// Display title
    pub title: String,
    /// Image reference, when the source provides one
    pub image_url: Option<String>,
    /// Exactly one category from the closed set
    pub category: RecipeCategory,
    /// Preparation time in minutes
    pub prep_time_minutes: u32,
    /// Cooking time in minutes
    pub cook_time_minutes: u32,
    /// Number of servings the macro values are divided across
    pub servings: u32,
    /// Per-serving macro values, always non-negative
    pub macros: Macros,
    /// Inferred preparation difficulty
    pub difficulty: Difficulty,
    /// Free-text description
    pub description: String,
    /// Generated tags, at most five
    pub tags: Vec<String>,
    /// Ordered ingredient list
    pub ingredients: Vec<Ingredient>,
    /// Ordered instruction steps
    pub instructions: Vec<String>,
    /// Aggregate rating, when the source provides one
    pub rating: Option<f64>,
    /// Number of reviews behind the rating
    pub review_count: u32,
    /// Where the recipe came from ("internal" for bundled data, otherwise
    /// the external source name)
    pub source: String,
}

impl AdaptedRecipe {
    /// Total preparation plus cooking time
    #[must_use]
    pub const fn total_time_minutes(&self) -> u32 {
        self.prep_time_minutes + self.cook_time_minutes
    }
}
