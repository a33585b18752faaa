// ABOUTME: Keyword-driven category, tag, and ingredient-macro classification tables
// ABOUTME: Editorial data shipped as a replaceable config value, not hard-coded logic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Recipe classification tables and matching
//!
//! The keyword tables here encode editorial judgment (what counts as a
//! breakfast, which ingredients imply "high-protein") rather than algorithmic
//! invariants, so they live in a [`ClassifierConfig`] value that deployments
//! can replace wholesale. What IS fixed is the matching discipline: category
//! rules are checked in priority order and the first hit wins, which keeps
//! classification deterministic for mixed-signal inputs.

use crate::constants::recipes;
use crate::recipes::models::{Macros, RecipeCategory};

/// One priority-ordered category rule
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Category assigned when a keyword matches
    pub category: RecipeCategory,
    /// Lowercased keywords matched as substrings
    pub keywords: Vec<String>,
}

/// One tag generation rule
#[derive(Debug, Clone)]
pub struct TagRule {
    /// Tag emitted when a keyword matches
    pub tag: String,
    /// Lowercased keywords matched as substrings
    pub keywords: Vec<String>,
}

/// Per-100g macro values for one recognizable ingredient
#[derive(Debug, Clone)]
pub struct IngredientMacroEntry {
    /// Lowercased name substrings that identify the ingredient
    pub patterns: Vec<String>,
    /// Energy in kcal per 100g
    pub calories: f64,
    /// Protein in grams per 100g
    pub protein_g: f64,
    /// Carbohydrates in grams per 100g
    pub carbs_g: f64,
    /// Fat in grams per 100g
    pub fat_g: f64,
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Replaceable classification tables
///
/// The default value carries the stock editorial tables in English and
/// Portuguese. Deployments with different editorial judgment construct their
/// own value; the matching rules do not change.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Category rules, highest priority first
    pub category_rules: Vec<CategoryRule>,
    /// Tag rules, checked in order
    pub tag_rules: Vec<TagRule>,
    /// Ingredient macro table for estimation
    pub ingredient_macros: Vec<IngredientMacroEntry>,
    /// Cap on generated tags
    pub max_tags: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            // Priority order is part of the contract: earlier rules win, so
            // a "protein breakfast bowl" classifies as breakfast.
            category_rules: vec![
                CategoryRule {
                    category: RecipeCategory::Breakfast,
                    keywords: keywords(&[
                        "breakfast",
                        "café da manhã",
                        "cafe da manha",
                        "pancake",
                        "panqueca",
                        "oatmeal",
                        "aveia",
                        "omelet",
                        "omelete",
                        "granola",
                        "tapioca",
                    ]),
                },
                CategoryRule {
                    category: RecipeCategory::Snack,
                    keywords: keywords(&["snack", "lanche", "cookie", "biscoito", "bar", "muffin"]),
                },
                CategoryRule {
                    category: RecipeCategory::Dinner,
                    keywords: keywords(&["dinner", "jantar", "soup", "sopa", "stew", "ensopado"]),
                },
                CategoryRule {
                    category: RecipeCategory::HighProtein,
                    keywords: keywords(&[
                        "protein",
                        "proteína",
                        "proteina",
                        "whey",
                        "chicken",
                        "frango",
                        "beef",
                        "carne",
                        "fish",
                        "peixe",
                    ]),
                },
                CategoryRule {
                    category: RecipeCategory::LowCarb,
                    keywords: keywords(&[
                        "low carb",
                        "low-carb",
                        "keto",
                        "cetogênica",
                        "cauliflower",
                        "couve-flor",
                        "zucchini",
                        "abobrinha",
                    ]),
                },
                CategoryRule {
                    category: RecipeCategory::PreWorkout,
                    keywords: keywords(&[
                        "pre-workout",
                        "pre workout",
                        "pré-treino",
                        "pre-treino",
                        "energy",
                        "energia",
                    ]),
                },
                CategoryRule {
                    category: RecipeCategory::PostWorkout,
                    keywords: keywords(&[
                        "post-workout",
                        "post workout",
                        "pós-treino",
                        "pos-treino",
                        "recovery",
                        "recuperação",
                        "shake",
                    ]),
                },
            ],
            tag_rules: vec![
                TagRule {
                    tag: "high-protein".to_string(),
                    keywords: keywords(&[
                        "protein", "proteína", "proteina", "chicken", "frango", "fish", "peixe",
                        "whey",
                    ]),
                },
                TagRule {
                    tag: "quick".to_string(),
                    keywords: keywords(&["quick", "rápido", "rapido", "15 min", "fácil", "facil"]),
                },
                TagRule {
                    tag: "vegetarian".to_string(),
                    keywords: keywords(&["vegetarian", "vegetariano", "vegetariana", "veggie"]),
                },
                TagRule {
                    tag: "vegan".to_string(),
                    keywords: keywords(&["vegan", "vegano", "vegana"]),
                },
                TagRule {
                    tag: "low-carb".to_string(),
                    keywords: keywords(&["low carb", "low-carb", "keto"]),
                },
                TagRule {
                    tag: "gluten-free".to_string(),
                    keywords: keywords(&["gluten-free", "gluten free", "sem glúten", "sem gluten"]),
                },
                TagRule {
                    tag: "healthy".to_string(),
                    keywords: keywords(&["healthy", "saudável", "saudavel", "fit", "light"]),
                },
                TagRule {
                    tag: "sweet".to_string(),
                    keywords: keywords(&["sweet", "doce", "dessert", "sobremesa"]),
                },
            ],
            ingredient_macros: vec![
                IngredientMacroEntry {
                    patterns: keywords(&["chicken", "frango"]),
                    calories: 165.0,
                    protein_g: 31.0,
                    carbs_g: 0.0,
                    fat_g: 3.6,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["beef", "carne"]),
                    calories: 250.0,
                    protein_g: 26.0,
                    carbs_g: 0.0,
                    fat_g: 15.0,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["salmon", "salmão", "fish", "peixe", "tilapia", "tilápia"]),
                    calories: 206.0,
                    protein_g: 22.0,
                    carbs_g: 0.0,
                    fat_g: 12.0,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["egg", "ovo"]),
                    calories: 155.0,
                    protein_g: 13.0,
                    carbs_g: 1.1,
                    fat_g: 11.0,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["rice", "arroz"]),
                    calories: 130.0,
                    protein_g: 2.7,
                    carbs_g: 28.0,
                    fat_g: 0.3,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["oat", "aveia"]),
                    calories: 389.0,
                    protein_g: 16.9,
                    carbs_g: 66.3,
                    fat_g: 6.9,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["quinoa"]),
                    calories: 120.0,
                    protein_g: 4.4,
                    carbs_g: 21.3,
                    fat_g: 1.9,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["sweet potato", "batata-doce", "batata doce"]),
                    calories: 86.0,
                    protein_g: 1.6,
                    carbs_g: 20.1,
                    fat_g: 0.1,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["bean", "feijão", "feijao", "lentil", "lentilha"]),
                    calories: 127.0,
                    protein_g: 8.7,
                    carbs_g: 22.8,
                    fat_g: 0.5,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["banana"]),
                    calories: 89.0,
                    protein_g: 1.1,
                    carbs_g: 22.8,
                    fat_g: 0.3,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["avocado", "abacate"]),
                    calories: 160.0,
                    protein_g: 2.0,
                    carbs_g: 8.5,
                    fat_g: 14.7,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["broccoli", "brócolis", "brocolis"]),
                    calories: 34.0,
                    protein_g: 2.8,
                    carbs_g: 6.6,
                    fat_g: 0.4,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["cheese", "queijo"]),
                    calories: 402.0,
                    protein_g: 25.0,
                    carbs_g: 1.3,
                    fat_g: 33.0,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["yogurt", "iogurte"]),
                    calories: 59.0,
                    protein_g: 10.0,
                    carbs_g: 3.6,
                    fat_g: 0.4,
                },
                IngredientMacroEntry {
                    patterns: keywords(&["milk", "leite"]),
                    calories: 61.0,
                    protein_g: 3.2,
                    carbs_g: 4.8,
                    fat_g: 3.3,
                },
            ],
            max_tags: recipes::MAX_TAGS,
        }
    }
}

/// Applies the classification tables to recipe text and ingredients
#[derive(Debug, Clone, Default)]
pub struct RecipeClassifier {
    config: ClassifierConfig,
}

impl RecipeClassifier {
    /// Create a classifier over the given tables
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// The tables in use
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// First category rule with a keyword hit wins; no hit means lunch
    ///
    /// `signal_text` is expected lowercased (see
    /// [`crate::recipes::raw::RawRecipeRecord::signal_text`]).
    #[must_use]
    pub fn infer_category(&self, signal_text: &str) -> RecipeCategory {
        for rule in &self.config.category_rules {
            if rule.keywords.iter().any(|k| signal_text.contains(k.as_str())) {
                return rule.category;
            }
        }
        RecipeCategory::default()
    }

    /// Collect tags for every rule with a keyword hit, capped at the
    /// configured maximum
    #[must_use]
    pub fn generate_tags(&self, signal_text: &str) -> Vec<String> {
        self.config
            .tag_rules
            .iter()
            .filter(|rule| rule.keywords.iter().any(|k| signal_text.contains(k.as_str())))
            .map(|rule| rule.tag.clone())
            .take(self.config.max_tags)
            .collect()
    }

    /// Estimate per-serving macros from the ingredient table
    ///
    /// Each ingredient contributes at most one table entry (first match in
    /// table order), scaled by the fixed portion factor. An input that
    /// matches nothing falls back to the default profile before the
    /// per-serving division. `servings` of zero divides by one instead.
    #[must_use]
    pub fn estimate_macros(&self, ingredient_texts: &[String], servings: u32) -> Macros {
        let mut calories = 0.0;
        let mut protein = 0.0;
        let mut carbs = 0.0;
        let mut fat = 0.0;
        let mut matched_any = false;

        for ingredient in ingredient_texts {
            let lowered = ingredient.to_lowercase();
            let hit = self
                .config
                .ingredient_macros
                .iter()
                .find(|entry| entry.patterns.iter().any(|p| lowered.contains(p.as_str())));

            if let Some(entry) = hit {
                matched_any = true;
                calories += entry.calories * recipes::PORTION_ESTIMATE_FACTOR;
                protein += entry.protein_g * recipes::PORTION_ESTIMATE_FACTOR;
                carbs += entry.carbs_g * recipes::PORTION_ESTIMATE_FACTOR;
                fat += entry.fat_g * recipes::PORTION_ESTIMATE_FACTOR;
            }
        }

        if !matched_any {
            calories = f64::from(recipes::DEFAULT_CALORIES);
            protein = recipes::DEFAULT_PROTEIN_G;
            carbs = recipes::DEFAULT_CARBS_G;
            fat = recipes::DEFAULT_FAT_G;
        }

        let divisor = f64::from(servings.max(1));
        Macros::rounded(
            calories / divisor,
            protein / divisor,
            carbs / divisor,
            fat / divisor,
        )
    }
}
