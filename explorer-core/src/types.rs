use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How hard a recipe is to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// A single ingredient line. Quantity stays a string ("1/2", "1.5").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub calories: u32,
    pub protein_grams: u32,
    pub carbs_grams: u32,
    pub fat_grams: u32,
}

/// A recipe from the sample dataset. Recipes are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub cuisine: String,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub meal_type: Vec<String>,
    /// Missing cook times count as 0 minutes when filtering and sorting.
    pub cook_time_minutes: Option<u32>,
    pub servings: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub nutrition: Nutrition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn cook_time_or_zero(&self) -> u32 {
        self.cook_time_minutes.unwrap_or(0)
    }
}

/// Reduced copy of a recipe kept in the favorites map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub diet: Vec<String>,
}

impl From<&Recipe> for FavoriteRecipe {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image_url: recipe.image_url.clone(),
            cuisine: recipe.cuisine.clone(),
            cook_time_minutes: recipe.cook_time_minutes,
            diet: recipe.diet.clone(),
        }
    }
}
