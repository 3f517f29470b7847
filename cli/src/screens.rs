//! Feed, categories, detail, favorites and planner screens.
//!
//! Each screen issues its request through a [`RequestTracker`] so a result that
//! arrives after the screen was torn down (Ctrl-C) is dropped, then renders the
//! loading/error/empty/ready state.

use anyhow::{anyhow, bail, Result};
use explorer_core::{
    dataset, ApiResponse, Day, Favorites, KeyValueStore, MealPlan, Persisted, Recipe, RecipeFilter,
    RecipeList, RecipeService, RequestTracker, Slot, ViewState, FAVORITES_KEY, MEAL_PLAN_KEY,
};
use std::future::Future;
use std::sync::Arc;

use crate::render;

/// Which category dimension to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Category {
    Cuisine,
    Diet,
    MealType,
}

pub struct App {
    service: Arc<dyn RecipeService>,
    store: Arc<dyn KeyValueStore>,
    tracker: RequestTracker,
}

impl App {
    pub fn new(service: Arc<dyn RecipeService>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            service,
            store,
            tracker: RequestTracker::new(),
        }
    }

    fn favorites(&self) -> Persisted<Favorites> {
        Persisted::bind(self.store.clone(), FAVORITES_KEY, Favorites::new)
    }

    /// Run a request as the screen's only live request.
    /// Returns None if the screen was torn down before it finished.
    async fn load<T>(&self, request: impl Future<Output = ApiResponse<T>>) -> Option<ApiResponse<T>> {
        let ticket = self.tracker.begin();
        eprintln!("Loading…");

        tokio::select! {
            response = request => self.tracker.accept(&ticket, response),
            _ = tokio::signal::ctrl_c() => {
                self.tracker.cancel();
                eprintln!("Cancelled.");
                None
            }
        }
    }

    async fn list(&self, filter: &RecipeFilter) -> Option<ViewState<RecipeList>> {
        let response = self.load(self.service.list_recipes(filter)).await?;
        Some(ViewState::from_response(response, |list| list.items.is_empty()))
    }

    async fn lookup(&self, recipe_id: &str) -> Option<ViewState<Recipe>> {
        let response = self.load(self.service.get_recipe_by_id(Some(recipe_id))).await?;
        Some(ViewState::from_response(response, |_| false))
    }

    /// Feed: search and filter the whole dataset.
    pub async fn feed(&self, filter: &RecipeFilter) -> Result<String> {
        let Some(state) = self.list(filter).await else {
            return Ok(String::new());
        };
        let favorites = self.favorites();
        render_list(state, favorites.get(), "No recipes match these filters.")
    }

    /// Categories: list the values of a dimension, or the recipes under one value.
    pub async fn categories(&self, category: Option<Category>, value: Option<&str>) -> Result<String> {
        let Some(category) = category else {
            let mut out = String::new();
            for (label, values) in [
                ("Cuisines", dataset::cuisines()),
                ("Diets", dataset::diets()),
                ("Meal types", dataset::meal_types()),
            ] {
                out.push_str(&format!("{}: {}\n", label, values.join(", ")));
            }
            return Ok(out);
        };

        let Some(value) = value else {
            let values = match category {
                Category::Cuisine => dataset::cuisines(),
                Category::Diet => dataset::diets(),
                Category::MealType => dataset::meal_types(),
            };
            return Ok(values.into_iter().map(|v| format!("{}\n", v)).collect());
        };

        let value = Some(value.to_string());
        let filter = match category {
            Category::Cuisine => RecipeFilter {
                cuisine: value,
                ..Default::default()
            },
            Category::Diet => RecipeFilter {
                diet: value,
                ..Default::default()
            },
            Category::MealType => RecipeFilter {
                meal_type: value,
                ..Default::default()
            },
        };
        let Some(state) = self.list(&filter).await else {
            return Ok(String::new());
        };
        let favorites = self.favorites();
        render_list(state, favorites.get(), "Nothing in this category yet.")
    }

    /// Recipe detail.
    pub async fn show(&self, recipe_id: &str) -> Result<String> {
        let Some(state) = self.lookup(recipe_id).await else {
            return Ok(String::new());
        };
        match state {
            ViewState::Ready(recipe) => {
                let favorites = self.favorites();
                Ok(render::recipe_detail(&recipe, favorites.get().contains(&recipe.id)))
            }
            ViewState::Error(error) if error.is_not_found() => {
                bail!("Recipe not found: {}", error.message)
            }
            ViewState::Error(error) => bail!("Couldn't load recipe: {}", error.message),
            ViewState::Loading | ViewState::Empty => Ok(String::new()),
        }
    }

    pub fn list_favorites(&self) -> String {
        let favorites = self.favorites();
        if favorites.get().is_empty() {
            return "No favorites yet. Use `favorites toggle <id>` to save one.\n".to_string();
        }
        favorites
            .get()
            .list()
            .map(|f| format!("{}\n", render::favorite_card(f)))
            .collect()
    }

    pub async fn toggle_favorite(&self, recipe_id: &str) -> Result<String> {
        let recipe = self.require_recipe(recipe_id).await?;
        let mut favorites = self.favorites();
        let now_favorite = favorites.update(|f| f.toggle(&recipe));
        tracing::info!(recipe_id, now_favorite, "toggled favorite");

        Ok(if now_favorite {
            format!("Saved {} to favorites.\n", recipe.title)
        } else {
            format!("Removed {} from favorites.\n", recipe.title)
        })
    }

    async fn require_recipe(&self, recipe_id: &str) -> Result<Recipe> {
        let response = self
            .load(self.service.get_recipe_by_id(Some(recipe_id)))
            .await
            .ok_or_else(|| anyhow!("Cancelled"))?;
        Ok(response.into_result()?)
    }
}

/// The meal planner. Built with the resolved feature flag.
pub struct Planner<'a> {
    app: &'a App,
    enabled: bool,
}

impl<'a> Planner<'a> {
    pub fn new(app: &'a App, enabled: bool) -> Self {
        Self { app, enabled }
    }

    fn plan(&self) -> Result<Persisted<MealPlan>> {
        if !self.enabled {
            bail!("The meal planner is disabled by feature flags.");
        }
        Ok(Persisted::bind(
            self.app.store.clone(),
            MEAL_PLAN_KEY,
            MealPlan::empty,
        ))
    }

    pub fn show(&self) -> Result<String> {
        let plan = self.plan()?;
        Ok(render::meal_plan(plan.get(), |id| {
            dataset::recipes()
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.title.clone())
                .unwrap_or_else(|| "Unknown recipe".to_string())
        }))
    }

    pub async fn set(&self, day: &str, slot: &str, recipe_id: &str) -> Result<String> {
        let (day, slot) = parse_cell(day, slot)?;
        let mut plan = self.plan()?;
        let recipe = self.app.require_recipe(recipe_id).await?;
        plan.update(|p| p.assign(day, slot, &recipe.id));
        Ok(format!(
            "Planned {} for {} {}.\n",
            recipe.title,
            day.as_str(),
            slot.as_str()
        ))
    }

    pub fn clear(&self, day: &str, slot: &str) -> Result<String> {
        let (day, slot) = parse_cell(day, slot)?;
        let mut plan = self.plan()?;
        Ok(match plan.update(|p| p.clear(day, slot)) {
            Some(id) => format!("Cleared {} from {} {}.\n", id, day.as_str(), slot.as_str()),
            None => format!("{} {} was already empty.\n", day.as_str(), slot.as_str()),
        })
    }
}

fn parse_cell(day: &str, slot: &str) -> Result<(Day, Slot)> {
    let day = Day::from_str(day).ok_or_else(|| anyhow!("Unknown day: {}", day))?;
    let slot = Slot::from_str(slot).ok_or_else(|| anyhow!("Unknown slot: {}", slot))?;
    Ok((day, slot))
}

fn render_list(state: ViewState<RecipeList>, favorites: &Favorites, empty: &str) -> Result<String> {
    match state {
        ViewState::Ready(list) => {
            let mut out = format!("{} recipe(s)\n", list.total);
            for recipe in &list.items {
                out.push_str(&render::recipe_card(recipe, favorites.contains(&recipe.id)));
                out.push('\n');
            }
            Ok(out)
        }
        ViewState::Empty => Ok(format!("{}\n", empty)),
        ViewState::Error(error) => bail!("Couldn't load recipes: {}", error.message),
        ViewState::Loading => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_core::{FileStore, Latency, MemoryStore, RecipesApi};

    fn app() -> App {
        let service = Arc::new(RecipesApi::new().with_latency(Latency::none()));
        App::new(service, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_feed_lists_matches() {
        let filter = RecipeFilter {
            cuisine: Some("Mexican".to_string()),
            ..Default::default()
        };
        let out = app().feed(&filter).await.unwrap();
        assert!(out.starts_with("1 recipe(s)\n"));
        assert!(out.contains("Spicy Black Bean Tacos"));
    }

    #[tokio::test]
    async fn test_feed_empty_state() {
        let filter = RecipeFilter {
            q: Some("durian".to_string()),
            ..Default::default()
        };
        let out = app().feed(&filter).await.unwrap();
        assert_eq!(out, "No recipes match these filters.\n");
    }

    #[tokio::test]
    async fn test_categories() {
        let app = app();
        let overview = app.categories(None, None).await.unwrap();
        assert!(overview.contains("Cuisines: American, Californian"));

        let diets = app.categories(Some(Category::Diet), None).await.unwrap();
        assert_eq!(diets, "Dairy-Free\nGluten-Free\nVegan\nVegetarian\n");

        let breakfast = app
            .categories(Some(Category::MealType), Some("breakfast"))
            .await
            .unwrap();
        assert!(breakfast.contains("Avocado Toast"));
    }

    #[tokio::test]
    async fn test_show_unknown_recipe_fails() {
        let err = app().show("r-404").await.unwrap_err();
        assert!(err.to_string().contains("Recipe not found"));
    }

    #[tokio::test]
    async fn test_favorite_toggle_marks_feed() {
        let app = app();
        let msg = app.toggle_favorite("r-003").await.unwrap();
        assert!(msg.starts_with("Saved"));
        assert!(app.list_favorites().contains("r-003"));

        let feed = app.feed(&RecipeFilter::default()).await.unwrap();
        assert!(feed.contains("★ r-003"));

        let msg = app.toggle_favorite("r-003").await.unwrap();
        assert!(msg.starts_with("Removed"));
        assert!(app.list_favorites().starts_with("No favorites yet"));
    }

    #[tokio::test]
    async fn test_planner_set_show_clear() {
        let app = app();
        let planner = Planner::new(&app, true);

        planner.set("mon", "dinner", "r-001").await.unwrap();
        let grid = planner.show().unwrap();
        assert!(grid.contains("Lemon Garlic Salmon Bowl (r-001)"));

        let msg = planner.clear("Monday", "Dinner").unwrap();
        assert_eq!(msg, "Cleared r-001 from monday dinner.\n");
        assert!(planner.set("mon", "dinner", "r-404").await.is_err());
        assert!(planner.set("someday", "dinner", "r-001").await.is_err());
    }

    #[tokio::test]
    async fn test_state_persists_across_runs() {
        let dir = tempfile::TempDir::new().unwrap();
        let open = || {
            let service = Arc::new(RecipesApi::new().with_latency(Latency::none()));
            App::new(service, Arc::new(FileStore::new(dir.path().to_path_buf())))
        };

        {
            let app = open();
            app.toggle_favorite("r-002").await.unwrap();
            Planner::new(&app, true)
                .set("fri", "lunch", "r-004")
                .await
                .unwrap();
        }

        let app = open();
        assert!(app.list_favorites().contains("Chickpea Tikka Masala"));
        let grid = Planner::new(&app, true).show().unwrap();
        assert!(grid.contains("Mediterranean Quinoa Salad (r-004)"));
    }

    #[tokio::test]
    async fn test_disabled_planner_refuses() {
        let app = app();
        let planner = Planner::new(&app, false);
        assert!(planner.show().is_err());
        assert!(planner.set("mon", "lunch", "r-004").await.is_err());
    }
}
