//! Favorites: recipe projections keyed by recipe id.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::types::{FavoriteRecipe, Recipe};

/// The favorites map. Every key equals the id of the projection it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    by_id: BTreeMap<String, FavoriteRecipe>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from untrusted JSON, dropping entries that don't decode or whose
    /// key doesn't match the projection id. Non-objects yield an empty map.
    pub fn coerce(value: &JsonValue) -> Self {
        let mut favorites = Self::new();
        let Some(entries) = value.as_object() else {
            return favorites;
        };

        for (key, entry) in entries {
            match FavoriteRecipe::deserialize(entry) {
                Ok(favorite) if favorite.id == *key => {
                    favorites.by_id.insert(key.clone(), favorite);
                }
                Ok(favorite) => {
                    tracing::debug!(key = %key, id = %favorite.id, "dropping favorite with mismatched id");
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "dropping malformed favorite");
                }
            }
        }
        favorites
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.by_id.contains_key(recipe_id)
    }

    pub fn get(&self, recipe_id: &str) -> Option<&FavoriteRecipe> {
        self.by_id.get(recipe_id)
    }

    pub fn add(&mut self, recipe: &Recipe) {
        self.by_id
            .insert(recipe.id.clone(), FavoriteRecipe::from(recipe));
    }

    pub fn remove(&mut self, recipe_id: &str) -> Option<FavoriteRecipe> {
        self.by_id.remove(recipe_id)
    }

    /// Flip a recipe's favorite state. Returns true if it is now a favorite.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        if self.remove(&recipe.id).is_some() {
            false
        } else {
            self.add(recipe);
            true
        }
    }

    /// Favorites ordered by recipe id.
    pub fn list(&self) -> impl Iterator<Item = &FavoriteRecipe> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Serialize for Favorites {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.by_id.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Favorites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(Self::coerce(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use serde_json::json;

    #[test]
    fn test_toggle_adds_then_removes() {
        let recipe = &dataset::recipes()[1];
        let mut favorites = Favorites::new();

        assert!(favorites.toggle(recipe));
        assert!(favorites.contains(&recipe.id));
        assert_eq!(favorites.get(&recipe.id).unwrap().title, recipe.title);

        assert!(!favorites.toggle(recipe));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_prior_state() {
        let recipes = dataset::recipes();
        let mut favorites = Favorites::new();
        favorites.add(&recipes[0]);
        favorites.add(&recipes[4]);
        let before = favorites.clone();

        for recipe in recipes {
            favorites.toggle(recipe);
            favorites.toggle(recipe);
            assert_eq!(favorites, before);
        }
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let recipes = dataset::recipes();
        let mut favorites = Favorites::new();
        favorites.add(&recipes[5]);
        favorites.add(&recipes[0]);
        let ids: Vec<_> = favorites.list().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["r-001", "r-006"]);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut favorites = Favorites::new();
        favorites.add(&dataset::recipes()[2]);
        let json = serde_json::to_value(&favorites).unwrap();
        assert_eq!(json["r-003"]["id"], "r-003");
        assert_eq!(json["r-003"]["cookTimeMinutes"], 10);
    }

    #[test]
    fn test_coerce_drops_bad_entries() {
        let value = json!({
            "r-001": { "id": "r-001", "title": "Salmon" },
            "r-002": { "id": "r-999", "title": "Wrong key" },
            "r-003": "not an object",
            "r-004": { "title": "No id" }
        });
        let favorites = Favorites::coerce(&value);
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites.get("r-001").unwrap().title, "Salmon");
    }

    #[test]
    fn test_coerce_non_object_is_empty() {
        assert!(Favorites::coerce(&json!(null)).is_empty());
        assert!(Favorites::coerce(&json!(["r-001"])).is_empty());
    }

    #[test]
    fn test_deserialize_round_trips_through_coerce() {
        let mut favorites = Favorites::new();
        favorites.add(&dataset::recipes()[0]);
        let json = serde_json::to_string(&favorites).unwrap();
        let decoded: Favorites = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, favorites);
    }
}
