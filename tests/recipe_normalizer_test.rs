// ABOUTME: Integration tests for recipe normalization over raw catalog payloads
// ABOUTME: Drives full JSON records through adapt and checks the canonical output shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutrifit_core::recipes::{
    Difficulty, RawRecipeRecord, RecipeCategory, RecipeNormalizer,
};
use serde_json::json;

fn record(value: serde_json::Value) -> RawRecipeRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_schema_org_record_adapts_fully() {
    let raw = record(json!({
        "id": 4182,
        "name": "Panqueca de Banana com Aveia",
        "description": "Panqueca fit para o café da manhã.",
        "image": ["https://img.example.com/panqueca.jpg"],
        "keywords": "banana, aveia, fit",
        "recipeCategory": "Café da manhã",
        "prepTime": "PT10M",
        "totalTime": "PT25M",
        "recipeYield": "2 porções",
        "recipeIngredient": ["1 banana madura", "2 ovos", "4 colheres de aveia"],
        "recipeInstructions": [
            {"text": "Amasse a banana."},
            {"text": "Misture os ovos e a aveia."},
            {"text": "Frite em fogo baixo."}
        ],
        "aggregateRating": {"ratingValue": "4.8", "reviewCount": "211"},
        "source": "catalog"
    }));

    let recipe = RecipeNormalizer::default().adapt(&raw);

    assert_eq!(recipe.id, "4182");
    assert_eq!(recipe.title, "Panqueca de Banana com Aveia");
    assert_eq!(recipe.category, RecipeCategory::Breakfast);
    assert_eq!(recipe.prep_time_minutes, 10);
    assert_eq!(recipe.cook_time_minutes, 15);
    assert_eq!(recipe.total_time_minutes(), 25);
    assert_eq!(recipe.servings, 2);
    assert_eq!(recipe.instructions.len(), 3);
    assert_eq!(recipe.ingredients.len(), 3);
    let rating = recipe.rating.unwrap();
    assert!((rating - 4.8).abs() < f64::EPSILON);
    assert_eq!(recipe.review_count, 211);
    assert_eq!(recipe.image_url.as_deref(), Some("https://img.example.com/panqueca.jpg"));
    assert_eq!(recipe.source, "catalog");
}

#[test]
fn test_empty_record_degrades_to_defaults() {
    let recipe = RecipeNormalizer::default().adapt(&record(json!({})));

    assert_eq!(recipe.title, "Untitled recipe");
    assert_eq!(recipe.category, RecipeCategory::Lunch);
    assert_eq!(recipe.total_time_minutes(), 30);
    assert_eq!(recipe.servings, 4);
    assert_eq!(recipe.difficulty, Difficulty::Medium, "30-minute default exceeds the easy threshold");
    assert_eq!(recipe.macros.calories, 75, "default profile divided by servings");
    assert!(recipe.tags.len() <= 5);
    assert!(!recipe.id.is_empty());
}

#[test]
fn test_adversarial_shapes_never_fail() {
    let payloads = [
        json!({"name": 42}),
        json!({"recipeYield": "muitas"}),
        json!({"totalTime": "soon", "prepTime": "later"}),
        json!({"recipeInstructions": ["", "   ", "Misture."]}),
        json!({"nutrition": {"calories": "many"}}),
        json!({"aggregateRating": {"ratingValue": "great"}}),
        json!({"keywords": ["", ""], "recipeCategory": []}),
    ];

    let normalizer = RecipeNormalizer::default();
    for payload in payloads {
        // Unexpected value types fall back to an empty field, never a panic.
        let raw: RawRecipeRecord = serde_json::from_value(payload).unwrap_or_default();
        let recipe = normalizer.adapt(&raw);
        assert!(!recipe.id.is_empty());
        assert!(recipe.macros.protein_g >= 0.0);
        assert!(recipe.macros.carbs_g >= 0.0);
        assert!(recipe.macros.fat_g >= 0.0);
    }
}

#[test]
fn test_adapt_is_deterministic() {
    let raw = record(json!({
        "name": "Frango com Batata Doce",
        "recipeIngredient": ["300g de frango", "2 batatas doces"],
        "recipeInstructions": [{"text": "Grelhe."}, {"text": "Asse."}],
        "totalTime": "45 min"
    }));

    let normalizer = RecipeNormalizer::default();
    let first = normalizer.adapt(&raw);
    let second = normalizer.adapt(&raw);
    assert_eq!(first, second);
}

#[test]
fn test_missing_id_derives_stable_slug() {
    let raw = record(json!({"name": "Bowl Proteico 10!"}));
    let normalizer = RecipeNormalizer::default();

    let first = normalizer.adapt(&raw);
    let second = normalizer.adapt(&raw);
    assert_eq!(first.id, "bowl-proteico-10");
    assert_eq!(first.id, second.id);
}

#[test]
fn test_breakfast_keywords_outrank_protein_keywords() {
    let raw = record(json!({
        "name": "Protein pancake breakfast bowl",
        "description": "whey, chicken-free, high protein"
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);
    assert_eq!(recipe.category, RecipeCategory::Breakfast);
}

#[test]
fn test_unmatched_signal_defaults_to_lunch() {
    let raw = record(json!({"name": "Prato do dia", "description": "simples"}));
    let recipe = RecipeNormalizer::default().adapt(&raw);
    assert_eq!(recipe.category, RecipeCategory::Lunch);
}

#[test]
fn test_free_text_durations_parse_through_adapt() {
    let raw = record(json!({
        "name": "Sopa",
        "prepTime": "15 min",
        "totalTime": "1h 30min"
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);
    assert_eq!(recipe.prep_time_minutes, 15);
    assert_eq!(recipe.cook_time_minutes, 75);
    assert_eq!(recipe.total_time_minutes(), 90);
}

#[test]
fn test_difficulty_follows_steps_and_time() {
    let normalizer = RecipeNormalizer::default();

    let easy = record(json!({
        "name": "Vitamina",
        "totalTime": "PT20M",
        "recipeInstructions": [{"text": "Bata."}, {"text": "Sirva."}]
    }));
    assert_eq!(normalizer.adapt(&easy).difficulty, Difficulty::Easy);

    let medium = record(json!({
        "name": "Risoto",
        "totalTime": "PT40M",
        "recipeInstructions": [
            {"text": "1"}, {"text": "2"}, {"text": "3"}, {"text": "4"}, {"text": "5"}
        ]
    }));
    assert_eq!(normalizer.adapt(&medium).difficulty, Difficulty::Medium);

    let hard = record(json!({
        "name": "Feijoada",
        "totalTime": "PT3H",
        "recipeInstructions": [
            {"text": "1"}, {"text": "2"}, {"text": "3"}, {"text": "4"},
            {"text": "5"}, {"text": "6"}
        ]
    }));
    assert_eq!(normalizer.adapt(&hard).difficulty, Difficulty::Hard);
}

#[test]
fn test_supplied_nutrition_wins_over_estimation() {
    let raw = record(json!({
        "name": "Marmita de frango",
        "recipeYield": "1",
        "recipeIngredient": ["200g de frango"],
        "nutrition": {
            "calories": "540",
            "proteinContent": "45 g",
            "carbohydrateContent": "52 g",
            "fatContent": "12,5 g"
        }
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);
    assert_eq!(recipe.macros.calories, 540);
    assert!((recipe.macros.protein_g - 45.0).abs() < f64::EPSILON);
    assert!((recipe.macros.fat_g - 12.5).abs() < f64::EPSILON);
}

#[test]
fn test_partial_nutrition_falls_back_to_estimation() {
    let raw = record(json!({
        "name": "Marmita de frango",
        "recipeYield": "2",
        "recipeIngredient": ["200g de frango grelhado"],
        "nutrition": {"calories": "540"}
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);

    // Chicken at half a portion, split across two servings.
    assert_eq!(recipe.macros.calories, 41);
    assert!(recipe.macros.protein_g > 0.0);
    assert!((recipe.macros.carbs_g - 0.0).abs() < f64::EPSILON);
}

#[test]
fn test_zero_yield_divides_by_one() {
    let raw = record(json!({
        "name": "Misterioso",
        "recipeYield": "0 porções",
        "recipeIngredient": ["algo estranho"]
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);

    assert_eq!(recipe.servings, 0);
    // Unknown ingredient: full default profile, servings<=0 treated as 1.
    assert_eq!(recipe.macros.calories, 300);
    assert!((recipe.macros.protein_g - 15.0).abs() < f64::EPSILON);
}

#[test]
fn test_tags_cap_at_five() {
    let raw = record(json!({
        "name": "Frango vegetariano doce rápido saudável low carb sem glúten vegano",
        "keywords": "protein, quick, vegetarian, vegan, low-carb, gluten-free, healthy, sweet"
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);
    assert_eq!(recipe.tags.len(), 5);
}

#[test]
fn test_ingredient_amounts_split_from_names() {
    let raw = record(json!({
        "name": "Omelete",
        "recipeIngredient": ["2 ovos", "30 g de queijo", "Sal a gosto"]
    }));
    let recipe = RecipeNormalizer::default().adapt(&raw);

    assert_eq!(recipe.ingredients.len(), 3);
    assert_eq!(recipe.ingredients[1].name, "queijo");
    assert_eq!(recipe.ingredients[1].amount.as_deref(), Some("30 g"));
    // Unsplittable lines keep the whole text as the name.
    assert_eq!(recipe.ingredients[2].name, "Sal a gosto");
    assert!(recipe.ingredients[2].amount.is_none());
}
