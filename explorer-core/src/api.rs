//! Recipe query service.
//!
//! Serves recipes from the in-memory dataset behind the same interface a REST
//! backend would have. Every call sleeps for a short, configurable delay to
//! emulate network latency. Failures come back as data in [`ApiResponse`],
//! never as `Err`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use crate::dataset;
use crate::error::ApiError;
use crate::query::{run_query, RecipeFilter};
use crate::types::Recipe;

/// Default simulated latency for listing recipes.
pub const DEFAULT_LIST_LATENCY_MS: u64 = 250;

/// Default simulated latency for a single-recipe lookup.
pub const DEFAULT_LOOKUP_LATENCY_MS: u64 = 180;

/// Base used to build request URLs when no backend is configured.
const PLACEHOLDER_BASE: &str = "http://localhost";

/// The `{data, error}` envelope. Exactly one side is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: ApiError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err(ApiError {
                message: "Empty response.".to_string(),
                status: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeList {
    pub items: Vec<Recipe>,
    pub total: usize,
}

/// Simulated network delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub list: Duration,
    pub lookup: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            lookup: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(DEFAULT_LIST_LATENCY_MS),
            lookup: Duration::from_millis(DEFAULT_LOOKUP_LATENCY_MS),
        }
    }
}

/// Trait for recipe services, enabling fakes in tests.
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// List recipes matching a filter, sorted as requested.
    async fn list_recipes(&self, filter: &RecipeFilter) -> ApiResponse<RecipeList>;

    /// Look up a single recipe.
    async fn get_recipe_by_id(&self, recipe_id: Option<&str>) -> ApiResponse<Recipe>;
}

/// Recipe service backed by the sample dataset.
#[derive(Debug, Clone)]
pub struct RecipesApi {
    recipes: &'static [Recipe],
    latency: Latency,
    base_url: String,
}

impl Default for RecipesApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipesApi {
    /// Create a service over the sample dataset with default latency.
    pub fn new() -> Self {
        Self {
            recipes: dataset::recipes(),
            latency: Latency::default(),
            base_url: String::new(),
        }
    }

    /// Serve a different (static) dataset.
    pub fn with_recipes(mut self, recipes: &'static [Recipe]) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Set the backend base URL. Trailing slashes are trimmed.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The REST URL equivalent to a call, for logging and future backends.
    /// Falls back to a localhost base when none is configured.
    pub fn build_url(&self, path: &str, query: &[(&str, String)]) -> Option<Url> {
        let base = if self.base_url.is_empty() {
            PLACEHOLDER_BASE
        } else {
            &self.base_url
        };
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        let mut url = Url::parse(&format!("{}{}", base, path)).ok()?;
        let query: Vec<_> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Some(url)
    }
}

#[async_trait]
impl RecipeService for RecipesApi {
    async fn list_recipes(&self, filter: &RecipeFilter) -> ApiResponse<RecipeList> {
        if let Some(url) = self.build_url("/recipes", &filter.query_pairs()) {
            tracing::debug!(url = %url, "list recipes");
        }

        sleep(self.latency.list).await;

        let items = run_query(self.recipes, filter);
        let total = items.len();
        tracing::debug!(total, "list recipes: done");

        ApiResponse::ok(RecipeList { items, total })
    }

    async fn get_recipe_by_id(&self, recipe_id: Option<&str>) -> ApiResponse<Recipe> {
        let Some(recipe_id) = recipe_id.filter(|id| !id.is_empty()) else {
            return ApiResponse::fail(ApiError::bad_request("recipeId is required."));
        };

        if let Some(mut url) = self.build_url("/recipes", &[]) {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(recipe_id);
            }
            tracing::debug!(url = %url, "get recipe");
        }

        sleep(self.latency.lookup).await;

        match self.recipes.iter().find(|r| r.id == recipe_id) {
            Some(recipe) => ApiResponse::ok(recipe.clone()),
            None => {
                tracing::debug!(recipe_id, "get recipe: not found");
                ApiResponse::fail(ApiError::not_found("Recipe not found."))
            }
        }
    }
}
