// ABOUTME: Recipe normalizer mapping raw catalog records into the canonical shape
// ABOUTME: Total and deterministic; malformed input degrades to defaults, never errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Recipe normalization pipeline
//!
//! [`RecipeNormalizer::adapt`] is a pure total function: any
//! [`RawRecipeRecord`], however sparse or malformed, produces an
//! [`AdaptedRecipe`]. The same input always produces the same output; nothing
//! here reads clocks, generates IDs, or touches I/O.

use crate::constants::recipes;
use crate::recipes::classifier::{ClassifierConfig, RecipeClassifier};
use crate::recipes::models::{AdaptedRecipe, Difficulty, Ingredient, Macros};
use crate::recipes::raw::{RawRecipeRecord, StringOrNumber};
use regex::Regex;
use std::sync::LazyLock;

static ISO_DURATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*PT(?:(\d+)H)?(?:(\d+)M)?\s*$").ok());
static HOURS_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*h").ok());
static MINUTES_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*min").ok());
static FIRST_INTEGER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+").ok());
static LEADING_NUMBER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").ok());
static INGREDIENT_SPLIT_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(\d[\d\s/.,]*\s*(?:g|gr|kg|mg|ml|l|x[íi]caras?|cups?|copos?|colheres?|tbsp|tsp|unidades?|un\.?|fatias?|slices?|scoops?|dentes?|latas?|pacotes?)?\.?)\s+(?:de\s+|of\s+)?(.+)$",
    )
    .ok()
});

/// Maps heterogeneous raw records into the canonical recipe shape
#[derive(Debug, Clone, Default)]
pub struct RecipeNormalizer {
    classifier: RecipeClassifier,
}

impl RecipeNormalizer {
    /// Create a normalizer with the given classification tables
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self {
            classifier: RecipeClassifier::new(config),
        }
    }

    /// The classifier applying the editorial tables
    #[must_use]
    pub const fn classifier(&self) -> &RecipeClassifier {
        &self.classifier
    }

    /// Normalize one raw record
    ///
    /// Missing or unparsable fields degrade to documented defaults: 30
    /// minutes total time, 4 servings, the lunch category, and the stock
    /// macro profile.
    #[must_use]
    pub fn adapt(&self, raw: &RawRecipeRecord) -> AdaptedRecipe {
        let title = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled recipe")
            .to_string();

        let signal = raw.signal_text();
        let category = self.classifier.infer_category(&signal);
        let tags = self.classifier.generate_tags(&signal);

        let prep_time_minutes = raw
            .prep_time
            .as_deref()
            .and_then(parse_duration_minutes)
            .unwrap_or(0);
        let cook_given = raw.cook_time.as_deref().and_then(parse_duration_minutes);
        let total_minutes = raw
            .total_time
            .as_deref()
            .and_then(parse_duration_minutes)
            .unwrap_or_else(|| {
                cook_given.map_or(recipes::DEFAULT_TOTAL_TIME_MINUTES, |cook| {
                    prep_time_minutes + cook
                })
            });
        let cook_time_minutes =
            cook_given.unwrap_or_else(|| total_minutes.saturating_sub(prep_time_minutes));

        let yield_text = raw.recipe_yield.as_ref().map(StringOrNumber::as_text);
        let servings = yield_text
            .as_deref()
            .and_then(parse_first_integer)
            .unwrap_or(recipes::DEFAULT_SERVINGS);

        let ingredient_texts = raw.ingredient_texts();
        let macros = supplied_macros(raw)
            .unwrap_or_else(|| self.classifier.estimate_macros(&ingredient_texts, servings));

        let instructions = raw.instruction_texts();
        let difficulty = infer_difficulty(instructions.len(), total_minutes);

        let id = raw
            .id
            .as_ref()
            .map(StringOrNumber::as_text)
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| slugify(&title));

        let rating = raw
            .aggregate_rating
            .as_ref()
            .and_then(|r| r.rating_value.as_ref())
            .map(StringOrNumber::as_text)
            .as_deref()
            .and_then(parse_leading_number);
        let review_count = raw
            .aggregate_rating
            .as_ref()
            .and_then(|r| r.rating_count.as_ref().or(r.review_count.as_ref()))
            .map(StringOrNumber::as_text)
            .as_deref()
            .and_then(parse_first_integer)
            .unwrap_or(0);

        let source = raw
            .source
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| recipes::REMOTE_SOURCE.to_string());

        AdaptedRecipe {
            id,
            title,
            image_url: raw.image_url(),
            category,
            prep_time_minutes,
            cook_time_minutes,
            servings,
            macros,
            difficulty,
            description: raw.description.clone().unwrap_or_default(),
            tags,
            ingredients: ingredient_texts
                .iter()
                .map(|line| split_ingredient(line))
                .collect(),
            instructions,
            rating,
            review_count,
            source,
        }
    }
}

/// Parse a duration into minutes
///
/// Accepts the ISO-8601-like `PT#H#M` form and free text with `#h` / `#min`
/// tokens. Returns `None` when neither shape matches; the caller supplies
/// the default.
fn parse_duration_minutes(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(re) = ISO_DURATION_RE.as_ref() {
        if let Some(caps) = re.captures(trimmed) {
            let hours = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let minutes = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            // A bare "PT" is not a duration.
            if hours.is_some() || minutes.is_some() {
                return Some(hours.unwrap_or(0) * 60 + minutes.unwrap_or(0));
            }
        }
    }

    let hours = HOURS_RE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    let minutes = MINUTES_RE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some(h.unwrap_or(0) * 60 + m.unwrap_or(0)),
    }
}

/// First integer substring, used for yields and review counts
fn parse_first_integer(input: &str) -> Option<u32> {
    FIRST_INTEGER_RE
        .as_ref()
        .and_then(|re| re.find(input))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// First number in a nutrition value like "240 calories" or "19,5 g"
fn parse_leading_number(input: &str) -> Option<f64> {
    LEADING_NUMBER_RE
        .as_ref()
        .and_then(|re| re.captures(input))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
}

/// Use source-supplied nutrition only when all four values are present
///
/// A partial block (say, calories only) would yield nonsense zero macros, so
/// anything incomplete falls through to table-based estimation.
fn supplied_macros(raw: &RawRecipeRecord) -> Option<Macros> {
    let nutrition = raw.nutrition.as_ref()?;
    let calories = parse_leading_number(&nutrition.calories.as_ref()?.as_text())?;
    let protein = parse_leading_number(&nutrition.protein_content.as_ref()?.as_text())?;
    let carbs = parse_leading_number(&nutrition.carbohydrate_content.as_ref()?.as_text())?;
    let fat = parse_leading_number(&nutrition.fat_content.as_ref()?.as_text())?;
    Some(Macros::rounded(calories, protein, carbs, fat))
}

/// Canonical difficulty rule over step count and total minutes
const fn infer_difficulty(step_count: usize, total_minutes: u32) -> Difficulty {
    if step_count <= recipes::EASY_MAX_STEPS && total_minutes <= recipes::EASY_MAX_MINUTES {
        Difficulty::Easy
    } else if step_count <= recipes::MEDIUM_MAX_STEPS && total_minutes <= recipes::MEDIUM_MAX_MINUTES
    {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

/// Best-effort split of a leading quantity/unit token from an ingredient line
///
/// "200g de frango" becomes amount "200g", name "frango". Lines without a
/// leading quantity pass through whole. Not exact for every locale or
/// phrasing; unsplit lines are still valid ingredients.
fn split_ingredient(line: &str) -> Ingredient {
    if let Some(re) = INGREDIENT_SPLIT_RE.as_ref() {
        if let Some(caps) = re.captures(line) {
            let amount = caps.get(1).map(|m| m.as_str().trim().to_string());
            let name = caps.get(2).map(|m| m.as_str().trim().to_string());
            if let (Some(amount), Some(name)) = (amount, name) {
                if !name.is_empty() {
                    return Ingredient {
                        name,
                        amount: Some(amount),
                    };
                }
            }
        }
    }

    Ingredient {
        name: line.trim().to_string(),
        amount: None,
    }
}

/// Deterministic fallback identity derived from the title
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "untitled-recipe".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::models::RecipeCategory;
    use crate::recipes::raw::StringOrList;

    #[test]
    fn test_iso_duration_parses() {
        assert_eq!(parse_duration_minutes("PT1H30M"), Some(90));
        assert_eq!(parse_duration_minutes("PT45M"), Some(45));
        assert_eq!(parse_duration_minutes("PT2H"), Some(120));
        assert_eq!(parse_duration_minutes("pt1h5m"), Some(65));
    }

    #[test]
    fn test_free_text_duration_parses() {
        assert_eq!(parse_duration_minutes("1h 30min"), Some(90));
        assert_eq!(parse_duration_minutes("45 min"), Some(45));
        assert_eq!(parse_duration_minutes("2 hours"), Some(120));
        assert_eq!(parse_duration_minutes("1 hora e 15 minutos"), Some(75));
    }

    #[test]
    fn test_unparsable_duration_is_none() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("a while"), None);
        assert_eq!(parse_duration_minutes("PT"), None);
    }

    #[test]
    fn test_empty_time_defaults_to_thirty_in_adapt() {
        let normalizer = RecipeNormalizer::default();
        let raw = RawRecipeRecord {
            total_time: Some(String::new()),
            ..RawRecipeRecord::default()
        };
        let recipe = normalizer.adapt(&raw);
        assert_eq!(recipe.total_time_minutes(), 30);
    }

    #[test]
    fn test_cook_time_derived_from_total_minus_prep() {
        let normalizer = RecipeNormalizer::default();
        let raw = RawRecipeRecord {
            total_time: Some("PT50M".to_string()),
            prep_time: Some("PT15M".to_string()),
            ..RawRecipeRecord::default()
        };
        let recipe = normalizer.adapt(&raw);
        assert_eq!(recipe.prep_time_minutes, 15);
        assert_eq!(recipe.cook_time_minutes, 35);
    }

    #[test]
    fn test_prep_longer_than_total_clamps_cook_to_zero() {
        let normalizer = RecipeNormalizer::default();
        let raw = RawRecipeRecord {
            total_time: Some("PT10M".to_string()),
            prep_time: Some("PT25M".to_string()),
            ..RawRecipeRecord::default()
        };
        let recipe = normalizer.adapt(&raw);
        assert_eq!(recipe.cook_time_minutes, 0);
    }

    #[test]
    fn test_servings_take_first_integer() {
        let normalizer = RecipeNormalizer::default();
        let raw = RawRecipeRecord {
            recipe_yield: Some(StringOrNumber::Text("4-6 porções".to_string())),
            ..RawRecipeRecord::default()
        };
        assert_eq!(normalizer.adapt(&raw).servings, 4);

        let missing = RawRecipeRecord::default();
        assert_eq!(normalizer.adapt(&missing).servings, 4);
    }

    #[test]
    fn test_difficulty_boundaries() {
        assert_eq!(infer_difficulty(3, 20), Difficulty::Easy);
        assert_eq!(infer_difficulty(4, 20), Difficulty::Medium);
        assert_eq!(infer_difficulty(3, 21), Difficulty::Medium);
        assert_eq!(infer_difficulty(5, 40), Difficulty::Medium);
        assert_eq!(infer_difficulty(6, 40), Difficulty::Hard);
        assert_eq!(infer_difficulty(5, 41), Difficulty::Hard);
    }

    #[test]
    fn test_adapt_is_total_on_empty_record() {
        let normalizer = RecipeNormalizer::default();
        let recipe = normalizer.adapt(&RawRecipeRecord::default());

        assert_eq!(recipe.title, "Untitled recipe");
        assert_eq!(recipe.id, "untitled-recipe");
        assert_eq!(recipe.category, RecipeCategory::Lunch);
        assert_eq!(recipe.total_time_minutes(), 30);
        assert_eq!(recipe.servings, 4);
        assert!(recipe.macros.protein_g >= 0.0);
        assert!(recipe.tags.len() <= 5);
    }

    #[test]
    fn test_adapt_is_deterministic() {
        let normalizer = RecipeNormalizer::default();
        let raw = RawRecipeRecord {
            name: Some("Protein Breakfast Bowl".to_string()),
            keywords: Some(StringOrList::Single("café da manhã, proteína".to_string())),
            recipe_ingredient: Some(vec![
                "200g de frango".to_string(),
                "1 xícara de arroz".to_string(),
            ]),
            ..RawRecipeRecord::default()
        };

        let first = normalizer.adapt(&raw);
        let second = normalizer.adapt(&raw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_breakfast_keyword_beats_protein_keyword() {
        let normalizer = RecipeNormalizer::default();
        let raw = RawRecipeRecord {
            name: Some("Protein Breakfast Bowl".to_string()),
            keywords: Some(StringOrList::Single("café da manhã, proteína".to_string())),
            ..RawRecipeRecord::default()
        };
        assert_eq!(normalizer.adapt(&raw).category, RecipeCategory::Breakfast);
    }

    #[test]
    fn test_supplied_nutrition_requires_all_four_values() {
        let normalizer = RecipeNormalizer::default();
        let raw: RawRecipeRecord = serde_json::from_str(
            r#"{
                "name": "Labeled Bar",
                "nutrition": {
                    "calories": "240 calories",
                    "proteinContent": "19 g",
                    "carbohydrateContent": "24 g",
                    "fatContent": "7,5 g"
                }
            }"#,
        )
        .unwrap_or_default();
        let recipe = normalizer.adapt(&raw);
        assert_eq!(recipe.macros.calories, 240);
        assert!((recipe.macros.fat_g - 7.5).abs() < f64::EPSILON);

        let partial: RawRecipeRecord = serde_json::from_str(
            r#"{"name": "Partial", "nutrition": {"calories": "240 calories"}}"#,
        )
        .unwrap_or_default();
        // Partial block falls back to estimation, which divides the default
        // profile across the default 4 servings.
        assert_eq!(normalizer.adapt(&partial).macros.calories, 75);
    }

    #[test]
    fn test_ingredient_split() {
        let split = split_ingredient("200g de frango grelhado");
        assert_eq!(split.amount.as_deref(), Some("200g"));
        assert_eq!(split.name, "frango grelhado");

        let cups = split_ingredient("2 cups rolled oats");
        assert_eq!(cups.amount.as_deref(), Some("2 cups"));
        assert_eq!(cups.name, "rolled oats");

        let unsplit = split_ingredient("Sal a gosto");
        assert!(unsplit.amount.is_none());
        assert_eq!(unsplit.name, "Sal a gosto");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Protein Breakfast Bowl"), "protein-breakfast-bowl");
        assert_eq!(slugify("  !!  "), "untitled-recipe");
    }
}
