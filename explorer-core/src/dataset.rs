//! Sample recipe dataset.
//!
//! Recipes are loaded from `data/recipes.json` at compile time and parsed once on
//! first access. The dataset is read-only for the lifetime of the process.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::types::Recipe;

static RECIPES: LazyLock<Vec<Recipe>> = LazyLock::new(|| {
    let json = include_str!("../../data/recipes.json");
    serde_json::from_str(json).expect("Failed to parse recipes.json")
});

/// All sample recipes, in dataset order.
pub fn recipes() -> &'static [Recipe] {
    &RECIPES
}

/// Distinct cuisines, sorted.
pub fn cuisines() -> Vec<String> {
    distinct(recipes().iter().map(|r| r.cuisine.as_str()))
}

/// Distinct diet labels, sorted.
pub fn diets() -> Vec<String> {
    distinct(recipes().iter().flat_map(|r| r.diet.iter().map(String::as_str)))
}

/// Distinct meal types, sorted.
pub fn meal_types() -> Vec<String> {
    distinct(
        recipes()
            .iter()
            .flat_map(|r| r.meal_type.iter().map(String::as_str)),
    )
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_loads() {
        let recipes = recipes();
        assert_eq!(recipes.len(), 6);
        assert_eq!(recipes[0].id, "r-001");
        assert_eq!(recipes[5].title, "Classic Chicken Noodle Soup");
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: BTreeSet<_> = recipes().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), recipes().len());
    }

    #[test]
    fn test_cuisines_sorted_and_distinct() {
        assert_eq!(
            cuisines(),
            vec![
                "American",
                "Californian",
                "Indian",
                "Mediterranean",
                "Mexican"
            ]
        );
    }

    #[test]
    fn test_diets_and_meal_types() {
        assert_eq!(
            diets(),
            vec!["Dairy-Free", "Gluten-Free", "Vegan", "Vegetarian"]
        );
        assert_eq!(meal_types(), vec!["Breakfast", "Dinner", "Lunch", "Snack"]);
    }
}
