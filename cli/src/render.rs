//! Plain-text rendering for recipes, favorites and the meal plan.

use explorer_core::{Day, FavoriteRecipe, Ingredient, MealPlan, Recipe, Slot};

const MISSING: &str = "—";

pub fn format_minutes(value: Option<u32>) -> String {
    match value {
        Some(minutes) => format!("{} min", minutes),
        None => MISSING.to_string(),
    }
}

/// Join non-empty values with ", ", or return the fallback if there are none.
pub fn join_or_fallback(values: &[String], fallback: &str) -> String {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

/// "{quantity} {unit} {name}", skipping whatever is missing.
pub fn ingredient_line(ingredient: &Ingredient) -> String {
    [
        ingredient.quantity.trim(),
        ingredient.unit.trim(),
        ingredient.name.trim(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// One-line summary used by the feed, categories and favorites screens.
pub fn recipe_card(recipe: &Recipe, favorite: bool) -> String {
    card_line(
        &recipe.id,
        &recipe.title,
        &recipe.cuisine,
        recipe.cook_time_minutes,
        &recipe.diet,
        favorite,
    )
}

pub fn favorite_card(favorite: &FavoriteRecipe) -> String {
    card_line(
        &favorite.id,
        &favorite.title,
        &favorite.cuisine,
        favorite.cook_time_minutes,
        &favorite.diet,
        true,
    )
}

fn card_line(
    id: &str,
    title: &str,
    cuisine: &str,
    cook_time: Option<u32>,
    diet: &[String],
    favorite: bool,
) -> String {
    let marker = if favorite { "★" } else { " " };
    let cuisine = if cuisine.trim().is_empty() {
        MISSING
    } else {
        cuisine
    };
    // Cards show at most two diet labels
    let diet: Vec<String> = diet.iter().take(2).cloned().collect();
    format!(
        "{} {:<6} {}  [{} · {} · {}]",
        marker,
        id,
        title,
        cuisine,
        format_minutes(cook_time),
        join_or_fallback(&diet, "Any"),
    )
}

/// Full recipe detail.
pub fn recipe_detail(recipe: &Recipe, favorite: bool) -> String {
    let mut out = String::new();
    let star = if favorite { " ★" } else { "" };
    out.push_str(&format!("{}{}\n", recipe.title, star));
    out.push_str(&format!("{}\n\n", recipe.description));

    let rows = [
        ("Cuisine", non_empty_or(&recipe.cuisine, MISSING)),
        ("Meal", join_or_fallback(&recipe.meal_type, MISSING)),
        ("Diet", join_or_fallback(&recipe.diet, "Any")),
        ("Cook time", format_minutes(recipe.cook_time_minutes)),
        ("Servings", recipe.servings.to_string()),
        ("Difficulty", recipe.difficulty.as_str().to_string()),
        ("Tags", join_or_fallback(&recipe.tags, MISSING)),
    ];
    for (label, value) in rows {
        out.push_str(&format!("  {:<11}{}\n", label, value));
    }
    if let Some(image_url) = &recipe.image_url {
        out.push_str(&format!("  {:<11}{}\n", "Image", image_url));
    }

    out.push_str("\nIngredients\n");
    if recipe.ingredients.is_empty() {
        out.push_str("  No ingredients listed.\n");
    }
    for ingredient in &recipe.ingredients {
        out.push_str(&format!("  - {}\n", ingredient_line(ingredient)));
    }

    out.push_str("\nInstructions\n");
    if recipe.steps.is_empty() {
        out.push_str("  No steps listed.\n");
    }
    for (i, step) in recipe.steps.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }

    let n = &recipe.nutrition;
    out.push_str(&format!(
        "\nNutrition: {} kcal · {} g protein · {} g carbs · {} g fat\n",
        n.calories, n.protein_grams, n.carbs_grams, n.fat_grams
    ));
    out
}

/// The weekly grid. `title_for` resolves recipe ids to display names.
pub fn meal_plan(plan: &MealPlan, title_for: impl Fn(&str) -> String) -> String {
    let mut out = String::new();
    for day in Day::ALL {
        out.push_str(&format!("{}\n", capitalize(day.as_str())));
        for slot in Slot::ALL {
            let cell = match plan.get(day, slot) {
                Some(id) => format!("{} ({})", title_for(id), id),
                None => MISSING.to_string(),
            };
            out.push_str(&format!("  {:<10} {}\n", slot.as_str(), cell));
        }
    }
    out
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
