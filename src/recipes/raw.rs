// ABOUTME: Loosely-typed third-party recipe records, parsed once at the boundary
// ABOUTME: Tolerates schema.org shape drift (string-or-list fields, step objects, numeric yields)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

//! Raw recipe records as external catalogs deliver them
//!
//! External sources send schema.org-flavored JSON where half the fields
//! change shape between records: `image` is a string or an array, `keywords`
//! likewise, instructions arrive as plain strings or `HowToStep` objects,
//! and yields come as numbers or text. Everything is parsed into this
//! tolerant representation exactly once; past this boundary the normalizer
//! works with typed accessors instead of repeated shape guards.

use serde::{Deserialize, Serialize};

/// A field that is either one string or a list of strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// Single value
    Single(String),
    /// Multiple values
    List(Vec<String>),
}

impl StringOrList {
    /// All values joined with the given separator
    #[must_use]
    pub fn join(&self, sep: &str) -> String {
        match self {
            Self::Single(s) => s.clone(),
            Self::List(items) => items.join(sep),
        }
    }

    /// First value, if any
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(s) => Some(s),
            Self::List(items) => items.first().map(String::as_str),
        }
    }
}

/// A field that is either a string or a bare number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StringOrNumber {
    /// Numeric form
    Number(f64),
    /// Textual form
    Text(String),
}

impl StringOrNumber {
    /// Textual rendering regardless of the underlying shape
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => {
                if n.fract().abs() < f64::EPSILON {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Text(s) => s.clone(),
        }
    }
}

/// One instruction entry: a plain string or a schema.org `HowToStep`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InstructionEntry {
    /// Plain text step
    Text(String),
    /// Structured step object
    Step(RawInstructionStep),
}

/// schema.org `HowToStep` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RawInstructionStep {
    /// Step body text
    pub text: Option<String>,
    /// Step heading, used when the body is absent
    pub name: Option<String>,
}

/// schema.org `NutritionInformation` payload
///
/// Values arrive with units baked in ("240 calories", "19 g").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawNutrition {
    /// Energy per serving
    pub calories: Option<StringOrNumber>,
    /// Protein per serving
    pub protein_content: Option<StringOrNumber>,
    /// Carbohydrates per serving
    pub carbohydrate_content: Option<StringOrNumber>,
    /// Fat per serving
    pub fat_content: Option<StringOrNumber>,
}

/// schema.org `AggregateRating` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRating {
    /// Average rating value
    pub rating_value: Option<StringOrNumber>,
    /// Number of ratings
    pub rating_count: Option<StringOrNumber>,
    /// Number of written reviews, some sources use this instead
    pub review_count: Option<StringOrNumber>,
}

/// One raw recipe record as delivered by an external catalog
///
/// Every field is optional; the normalizer is total and fills defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecipeRecord {
    /// Source-assigned identity
    pub id: Option<StringOrNumber>,
    /// Recipe title
    pub name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Image reference(s)
    pub image: Option<StringOrList>,
    /// Comma-separated keywords or a keyword list
    pub keywords: Option<StringOrList>,
    /// Source-side category label(s), treated as classification signal only
    pub recipe_category: Option<StringOrList>,
    /// Total duration ("PT1H30M" or free text)
    pub total_time: Option<String>,
    /// Preparation duration
    pub prep_time: Option<String>,
    /// Cooking duration
    pub cook_time: Option<String>,
    /// Yield ("4 servings", "serves 6", or a bare number)
    pub recipe_yield: Option<StringOrNumber>,
    /// Ingredient lines
    pub recipe_ingredient: Option<Vec<String>>,
    /// Instruction steps in either shape
    pub recipe_instructions: Option<Vec<InstructionEntry>>,
    /// Nutrition block, when the source supplies one
    pub nutrition: Option<RawNutrition>,
    /// Rating block, when the source supplies one
    pub aggregate_rating: Option<RawRating>,
    /// Source name override
    pub source: Option<String>,
}

impl RawRecipeRecord {
    /// All classification signal text: name, description, keywords, and the
    /// source's own category labels, lowercased and space-joined
    #[must_use]
    pub fn signal_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        if let Some(description) = &self.description {
            parts.push(description.clone());
        }
        if let Some(keywords) = &self.keywords {
            parts.push(keywords.join(" "));
        }
        if let Some(category) = &self.recipe_category {
            parts.push(category.join(" "));
        }
        parts.join(" ").to_lowercase()
    }

    /// Instruction steps flattened to plain text, empty entries dropped
    #[must_use]
    pub fn instruction_texts(&self) -> Vec<String> {
        self.recipe_instructions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| match entry {
                InstructionEntry::Text(text) => Some(text.clone()),
                InstructionEntry::Step(step) => step.text.clone().or_else(|| step.name.clone()),
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Ingredient lines with blanks dropped
    #[must_use]
    pub fn ingredient_texts(&self) -> Vec<String> {
        self.recipe_ingredient
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// First image reference, if any
    #[must_use]
    pub fn image_url(&self) -> Option<String> {
        self.image
            .as_ref()
            .and_then(StringOrList::first)
            .map(ToString::to_string)
    }
}
