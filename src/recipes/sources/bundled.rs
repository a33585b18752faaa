// ABOUTME: Bundled recipe dataset served from memory, no network required
// ABOUTME: Acts as the fallback source when the remote catalog is unreachable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app

use crate::constants::recipes::BUNDLED_SOURCE;
use crate::errors::AppResult;
use crate::recipes::models::{
    AdaptedRecipe, Difficulty, Ingredient, Macros, RecipeCategory,
};
use crate::recipes::sources::{RecipePage, RecipeQuery, RecipeSource};
use async_trait::async_trait;

/// Recipe source backed by a fixed in-memory dataset
///
/// Never fails. The stock set covers every mainline category so a catalog
/// outage still leaves something to serve for any filter.
#[derive(Debug, Clone)]
pub struct BundledRecipeSource {
    recipes: Vec<AdaptedRecipe>,
}

impl Default for BundledRecipeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BundledRecipeSource {
    /// Source with the stock recipe set
    #[must_use]
    pub fn new() -> Self {
        Self {
            recipes: stock_recipes(),
        }
    }

    /// Source with a caller-supplied dataset
    #[must_use]
    pub const fn with_recipes(recipes: Vec<AdaptedRecipe>) -> Self {
        Self { recipes }
    }

    /// Recipes in the dataset, unfiltered
    #[must_use]
    pub fn recipes(&self) -> &[AdaptedRecipe] {
        &self.recipes
    }
}

#[async_trait]
impl RecipeSource for BundledRecipeSource {
    fn name(&self) -> &str {
        BUNDLED_SOURCE
    }

    async fn fetch_recipes(&self, query: &RecipeQuery) -> AppResult<RecipePage> {
        let matching: Vec<_> = self
            .recipes
            .iter()
            .filter(|recipe| query.matches(recipe))
            .cloned()
            .collect();
        Ok(RecipePage::single(matching))
    }
}

fn ingredient(name: &str, amount: &str) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        amount: Some(amount.to_string()),
    }
}

#[allow(clippy::too_many_lines)]
fn stock_recipes() -> Vec<AdaptedRecipe> {
    vec![
        AdaptedRecipe {
            id: "omelete-de-aveia".to_string(),
            title: "Omelete de Aveia".to_string(),
            image_url: None,
            category: RecipeCategory::Breakfast,
            prep_time_minutes: 5,
            cook_time_minutes: 10,
            servings: 1,
            macros: Macros::rounded(320.0, 22.0, 28.0, 12.0),
            difficulty: Difficulty::Easy,
            description: "Omelete reforçado com aveia para um café da manhã rico em proteína."
                .to_string(),
            tags: vec!["high-protein".to_string(), "quick".to_string()],
            ingredients: vec![
                ingredient("ovos", "2 unidades"),
                ingredient("aveia em flocos", "2 colheres"),
                ingredient("queijo branco", "30 g"),
            ],
            instructions: vec![
                "Bata os ovos com a aveia.".to_string(),
                "Despeje na frigideira quente e adicione o queijo.".to_string(),
                "Dobre ao meio quando firmar.".to_string(),
            ],
            rating: Some(4.7),
            review_count: 182,
            source: BUNDLED_SOURCE.to_string(),
        },
        AdaptedRecipe {
            id: "frango-grelhado-com-arroz".to_string(),
            title: "Frango Grelhado com Arroz Integral".to_string(),
            image_url: None,
            category: RecipeCategory::Lunch,
            prep_time_minutes: 15,
            cook_time_minutes: 25,
            servings: 2,
            macros: Macros::rounded(480.0, 42.0, 45.0, 11.0),
            difficulty: Difficulty::Medium,
            description: "Almoço clássico de frango grelhado com arroz integral e legumes."
                .to_string(),
            tags: vec!["high-protein".to_string(), "healthy".to_string()],
            ingredients: vec![
                ingredient("peito de frango", "300 g"),
                ingredient("arroz integral", "1 xícara"),
                ingredient("brócolis", "200 g"),
            ],
            instructions: vec![
                "Tempere o frango e grelhe dos dois lados.".to_string(),
                "Cozinhe o arroz integral.".to_string(),
                "Cozinhe o brócolis no vapor.".to_string(),
                "Monte o prato e sirva.".to_string(),
            ],
            rating: Some(4.8),
            review_count: 325,
            source: BUNDLED_SOURCE.to_string(),
        },
        AdaptedRecipe {
            id: "bowl-de-quinoa-com-legumes".to_string(),
            title: "Bowl de Quinoa com Legumes".to_string(),
            image_url: None,
            category: RecipeCategory::Lunch,
            prep_time_minutes: 10,
            cook_time_minutes: 20,
            servings: 2,
            macros: Macros::rounded(390.0, 14.0, 58.0, 12.0),
            difficulty: Difficulty::Easy,
            description: "Bowl vegetariano de quinoa com legumes assados e abacate.".to_string(),
            tags: vec!["vegetarian".to_string(), "healthy".to_string()],
            ingredients: vec![
                ingredient("quinoa", "1 xícara"),
                ingredient("abacate", "1 unidade"),
                ingredient("grão-de-bico", "150 g"),
            ],
            instructions: vec![
                "Cozinhe a quinoa.".to_string(),
                "Asse os legumes com azeite.".to_string(),
                "Monte o bowl com o abacate fatiado.".to_string(),
            ],
            rating: Some(4.5),
            review_count: 97,
            source: BUNDLED_SOURCE.to_string(),
        },
        AdaptedRecipe {
            id: "salmao-assado-com-batata-doce".to_string(),
            title: "Salmão Assado com Batata Doce".to_string(),
            image_url: None,
            category: RecipeCategory::Dinner,
            prep_time_minutes: 15,
            cook_time_minutes: 30,
            servings: 2,
            macros: Macros::rounded(520.0, 38.0, 36.0, 24.0),
            difficulty: Difficulty::Medium,
            description: "Jantar de salmão assado com batata doce e aspargos.".to_string(),
            tags: vec!["high-protein".to_string(), "gluten-free".to_string()],
            ingredients: vec![
                ingredient("filé de salmão", "2 unidades"),
                ingredient("batata doce", "2 unidades"),
                ingredient("aspargos", "1 maço"),
            ],
            instructions: vec![
                "Tempere o salmão com limão e ervas.".to_string(),
                "Asse a batata doce em cubos.".to_string(),
                "Leve o salmão ao forno por 15 minutos.".to_string(),
                "Sirva com os aspargos grelhados.".to_string(),
            ],
            rating: Some(4.9),
            review_count: 241,
            source: BUNDLED_SOURCE.to_string(),
        },
        AdaptedRecipe {
            id: "iogurte-com-granola-e-banana".to_string(),
            title: "Iogurte com Granola e Banana".to_string(),
            image_url: None,
            category: RecipeCategory::Snack,
            prep_time_minutes: 5,
            cook_time_minutes: 0,
            servings: 1,
            macros: Macros::rounded(280.0, 12.0, 44.0, 7.0),
            difficulty: Difficulty::Easy,
            description: "Lanche rápido de iogurte natural com granola e banana.".to_string(),
            tags: vec!["quick".to_string(), "sweet".to_string()],
            ingredients: vec![
                ingredient("iogurte natural", "1 copo"),
                ingredient("granola", "3 colheres"),
                ingredient("banana", "1 unidade"),
            ],
            instructions: vec![
                "Coloque o iogurte em uma tigela.".to_string(),
                "Cubra com a granola e a banana fatiada.".to_string(),
            ],
            rating: Some(4.4),
            review_count: 58,
            source: BUNDLED_SOURCE.to_string(),
        },
        AdaptedRecipe {
            id: "shake-de-whey-com-banana".to_string(),
            title: "Shake de Whey com Banana".to_string(),
            image_url: None,
            category: RecipeCategory::PostWorkout,
            prep_time_minutes: 5,
            cook_time_minutes: 0,
            servings: 1,
            macros: Macros::rounded(310.0, 30.0, 38.0, 5.0),
            difficulty: Difficulty::Easy,
            description: "Shake pós-treino de whey com banana e leite.".to_string(),
            tags: vec!["high-protein".to_string(), "quick".to_string()],
            ingredients: vec![
                ingredient("whey protein", "1 scoop"),
                ingredient("banana", "1 unidade"),
                ingredient("leite desnatado", "250 ml"),
            ],
            instructions: vec![
                "Bata todos os ingredientes no liquidificador.".to_string(),
                "Sirva gelado.".to_string(),
            ],
            rating: Some(4.6),
            review_count: 134,
            source: BUNDLED_SOURCE.to_string(),
        },
    ]
}
