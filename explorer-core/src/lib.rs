pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod favorites;
pub mod meal_plan;
pub mod query;
pub mod storage;
pub mod types;
pub mod view;

pub use api::{ApiResponse, Latency, RecipeList, RecipeService, RecipesApi};
pub use config::{AppConfig, FeatureFlags, FlagValue};
pub use error::{ApiError, ApiErrorKind, StorageError};
pub use favorites::Favorites;
pub use meal_plan::{Day, MealPlan, Slot};
pub use query::{RecipeFilter, SortKey};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, Persisted, StorageEvent, StoreHandleId, FAVORITES_KEY,
    MEAL_PLAN_KEY,
};
pub use types::{Difficulty, FavoriteRecipe, Ingredient, Nutrition, Recipe};
pub use view::{RequestTicket, RequestTracker, ViewState};
