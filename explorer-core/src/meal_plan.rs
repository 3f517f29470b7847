//! Weekly meal plan: a fixed 7-day by 3-slot grid of recipe ids.
//!
//! Stored plans are untrusted. Decoding goes through [`MealPlan::coerce`], which
//! rebuilds the full grid and resets any cell that isn't a non-empty string, so
//! a plan is always safe to index no matter what was in storage.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in week order
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    /// Accepts full names and three-letter abbreviations, any case.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == s || (s.len() == 3 && day.as_str().starts_with(&s)))
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Breakfast,
    Lunch,
    Dinner,
}

impl Slot {
    /// All slots in meal order
    pub const ALL: [Slot; 3] = [Slot::Breakfast, Slot::Lunch, Slot::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Breakfast => "breakfast",
            Slot::Lunch => "lunch",
            Slot::Dinner => "dinner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(Slot::Breakfast),
            "lunch" => Some(Slot::Lunch),
            "dinner" => Some(Slot::Dinner),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Recipe ids planned for each day and slot. Always exactly 21 cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealPlan {
    cells: [[Option<String>; 3]; 7],
}

impl MealPlan {
    /// A plan with every cell empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild a plan from arbitrary JSON.
    ///
    /// Each cell takes `value[day][slot]` only if it is a non-empty string.
    /// Unknown keys are dropped, and anything that isn't an object of objects
    /// leaves the affected cells empty.
    pub fn coerce(value: &JsonValue) -> Self {
        let mut plan = Self::empty();
        for day in Day::ALL {
            let Some(slots) = value.get(day.as_str()).and_then(JsonValue::as_object) else {
                continue;
            };
            for slot in Slot::ALL {
                let recipe_id = slots
                    .get(slot.as_str())
                    .and_then(JsonValue::as_str)
                    .filter(|id| !id.is_empty());
                if let Some(recipe_id) = recipe_id {
                    plan.cells[day.index()][slot.index()] = Some(recipe_id.to_string());
                }
            }
        }
        plan
    }

    pub fn get(&self, day: Day, slot: Slot) -> Option<&str> {
        self.cells[day.index()][slot.index()].as_deref()
    }

    /// Put a recipe in a cell. An empty id clears the cell.
    pub fn assign(&mut self, day: Day, slot: Slot, recipe_id: &str) {
        self.cells[day.index()][slot.index()] =
            Some(recipe_id.to_string()).filter(|id| !id.is_empty());
    }

    /// Empty a cell, returning what it held.
    pub fn clear(&mut self, day: Day, slot: Slot) -> Option<String> {
        self.cells[day.index()][slot.index()].take()
    }

    /// Every filled cell, in week then meal order.
    pub fn assigned(&self) -> impl Iterator<Item = (Day, Slot, &str)> {
        Day::ALL.into_iter().flat_map(move |day| {
            Slot::ALL
                .into_iter()
                .filter_map(move |slot| self.get(day, slot).map(|id| (day, slot, id)))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.assigned().next().is_none()
    }
}

impl Serialize for MealPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct DaySlots<'a>(&'a [Option<String>; 3]);

        impl Serialize for DaySlots<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(Slot::ALL.len()))?;
                for slot in Slot::ALL {
                    map.serialize_entry(slot.as_str(), &self.0[slot.index()])?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(Day::ALL.len()))?;
        for day in Day::ALL {
            map.serialize_entry(day.as_str(), &DaySlots(&self.cells[day.index()]))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MealPlan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(Self::coerce(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell_count(value: &JsonValue) -> usize {
        value
            .as_object()
            .unwrap()
            .values()
            .map(|slots| slots.as_object().unwrap().len())
            .sum()
    }

    #[test]
    fn test_empty_plan_serializes_all_cells() {
        let value = serde_json::to_value(MealPlan::empty()).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 7);
        assert_eq!(cell_count(&value), 21);
        assert_eq!(value["monday"]["breakfast"], JsonValue::Null);
        assert_eq!(value["sunday"]["dinner"], JsonValue::Null);
    }

    #[test]
    fn test_coerce_null_and_garbage() {
        for value in [json!(null), json!("plan"), json!([1, 2, 3]), json!(42)] {
            assert_eq!(MealPlan::coerce(&value), MealPlan::empty());
        }
    }

    #[test]
    fn test_coerce_keeps_only_non_empty_strings() {
        let value = json!({
            "monday": { "breakfast": "r-003", "lunch": "", "dinner": 5 },
            "tuesday": "r-001",
            "friday": { "dinner": "r-005", "brunch": "r-003" },
            "someday": { "lunch": "r-002" }
        });
        let plan = MealPlan::coerce(&value);

        assert_eq!(plan.get(Day::Monday, Slot::Breakfast), Some("r-003"));
        assert_eq!(plan.get(Day::Monday, Slot::Lunch), None);
        assert_eq!(plan.get(Day::Monday, Slot::Dinner), None);
        assert_eq!(plan.get(Day::Tuesday, Slot::Dinner), None);
        assert_eq!(plan.get(Day::Friday, Slot::Dinner), Some("r-005"));
        assert_eq!(plan.assigned().count(), 2);

        let reencoded = serde_json::to_value(&plan).unwrap();
        assert_eq!(cell_count(&reencoded), 21);
        assert!(reencoded.get("someday").is_none());
        assert!(reencoded["friday"].get("brunch").is_none());
    }

    #[test]
    fn test_coerce_is_idempotent() {
        let mut plan = MealPlan::empty();
        plan.assign(Day::Wednesday, Slot::Lunch, "r-004");
        plan.assign(Day::Sunday, Slot::Breakfast, "r-003");

        let once = MealPlan::coerce(&serde_json::to_value(&plan).unwrap());
        let twice = MealPlan::coerce(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, plan);
        assert_eq!(twice, plan);
    }

    #[test]
    fn test_assign_and_clear() {
        let mut plan = MealPlan::empty();
        plan.assign(Day::Thursday, Slot::Dinner, "r-002");
        assert_eq!(plan.get(Day::Thursday, Slot::Dinner), Some("r-002"));

        assert_eq!(plan.clear(Day::Thursday, Slot::Dinner).as_deref(), Some("r-002"));
        assert!(plan.is_empty());

        plan.assign(Day::Thursday, Slot::Dinner, "r-002");
        plan.assign(Day::Thursday, Slot::Dinner, "");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_assigned_is_in_week_order() {
        let mut plan = MealPlan::empty();
        plan.assign(Day::Sunday, Slot::Lunch, "r-006");
        plan.assign(Day::Monday, Slot::Dinner, "r-001");
        plan.assign(Day::Monday, Slot::Breakfast, "r-003");

        let cells: Vec<_> = plan.assigned().collect();
        assert_eq!(
            cells,
            vec![
                (Day::Monday, Slot::Breakfast, "r-003"),
                (Day::Monday, Slot::Dinner, "r-001"),
                (Day::Sunday, Slot::Lunch, "r-006"),
            ]
        );
    }

    #[test]
    fn test_day_and_slot_parsing() {
        assert_eq!(Day::from_str("Monday"), Some(Day::Monday));
        assert_eq!(Day::from_str("sat"), Some(Day::Saturday));
        assert_eq!(Day::from_str("s"), None);
        assert_eq!(Day::from_str("funday"), None);
        assert_eq!(Slot::from_str("DINNER"), Some(Slot::Dinner));
        assert_eq!(Slot::from_str("brunch"), None);
    }

    #[test]
    fn test_deserialize_never_fails_on_json() {
        let plan: MealPlan = serde_json::from_str(r#"{"monday": null}"#).unwrap();
        assert_eq!(plan, MealPlan::empty());
    }
}
