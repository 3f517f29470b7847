//! Recipe filtering and sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Recipe;

/// Sort order for recipe listings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Dataset order
    #[default]
    Relevance,
    /// Shortest cook time first
    CookTime,
    /// Alphabetical by title
    Title,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::CookTime => "cook-time",
            SortKey::Title => "title",
        }
    }

    /// Parse a sort key leniently. Separators and case are ignored, so
    /// "cookTime", "cook-time" and "cook_time" all mean [`SortKey::CookTime`].
    /// Anything unrecognized falls back to [`SortKey::Relevance`].
    pub fn parse(s: &str) -> Self {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "cooktime" => SortKey::CookTime,
            "title" => SortKey::Title,
            _ => SortKey::Relevance,
        }
    }
}

/// Criteria for narrowing and ordering a recipe listing.
///
/// Every supplied criterion must match for a recipe to be included. Blank
/// strings count as "not supplied".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Free text, matched against title, description and tags
    pub q: Option<String>,
    pub cuisine: Option<String>,
    pub diet: Option<String>,
    pub meal_type: Option<String>,
    pub max_cook_time_minutes: Option<u32>,
    pub sort: SortKey,
}

impl RecipeFilter {
    /// Query parameters for this filter, in the shape a REST backend would take.
    /// Unset and blank values are skipped.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let text = [
            ("q", &self.q),
            ("cuisine", &self.cuisine),
            ("diet", &self.diet),
            ("mealType", &self.meal_type),
        ];
        for (name, value) in text {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((name, value.to_string()));
            }
        }
        if let Some(max) = self.max_cook_time_minutes {
            pairs.push(("maxCookTimeMinutes", max.to_string()));
        }
        if self.sort != SortKey::Relevance {
            pairs.push(("sort", self.sort.as_str().to_string()));
        }
        pairs
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalized criterion, or None when blank.
fn criterion(value: &Option<String>) -> Option<String> {
    value.as_deref().map(normalize).filter(|v| !v.is_empty())
}

/// Filter criteria with text already normalized, so each recipe check is cheap.
struct Criteria {
    q: Option<String>,
    cuisine: Option<String>,
    diet: Option<String>,
    meal_type: Option<String>,
    max_cook_time_minutes: Option<u32>,
}

impl Criteria {
    fn new(filter: &RecipeFilter) -> Self {
        Self {
            q: criterion(&filter.q),
            cuisine: criterion(&filter.cuisine),
            diet: criterion(&filter.diet),
            meal_type: criterion(&filter.meal_type),
            max_cook_time_minutes: filter.max_cook_time_minutes,
        }
    }

    fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(q) = &self.q {
            let haystack = normalize(&format!(
                "{} {} {}",
                recipe.title,
                recipe.description,
                recipe.tags.join(" ")
            ));
            if !haystack.contains(q.as_str()) {
                return false;
            }
        }

        if let Some(cuisine) = &self.cuisine {
            if normalize(&recipe.cuisine) != *cuisine {
                return false;
            }
        }

        if let Some(diet) = &self.diet {
            if !recipe.diet.iter().any(|d| normalize(d) == *diet) {
                return false;
            }
        }

        if let Some(meal_type) = &self.meal_type {
            if !recipe.meal_type.iter().any(|m| normalize(m) == *meal_type) {
                return false;
            }
        }

        if let Some(max) = self.max_cook_time_minutes {
            if recipe.cook_time_or_zero() > max {
                return false;
            }
        }

        true
    }
}

/// Recipes matching every supplied criterion, in input order.
pub fn apply_filters<'a>(recipes: &'a [Recipe], filter: &RecipeFilter) -> Vec<&'a Recipe> {
    let criteria = Criteria::new(filter);
    recipes.iter().filter(|r| criteria.matches(r)).collect()
}

/// Sort recipes in place. All sorts are stable.
pub fn sort_recipes(recipes: &mut [&Recipe], sort: SortKey) {
    match sort {
        SortKey::Relevance => {}
        SortKey::CookTime => recipes.sort_by_key(|r| r.cook_time_or_zero()),
        SortKey::Title => recipes.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }
}

/// Case-insensitive comparison with a case-sensitive tie-break.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Filter then sort, returning owned recipes.
pub fn run_query(recipes: &[Recipe], filter: &RecipeFilter) -> Vec<Recipe> {
    let mut matched = apply_filters(recipes, filter);
    sort_recipes(&mut matched, filter.sort);
    matched.into_iter().cloned().collect()
}
