use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One planned meal: a saved recipe or a free-text label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealEntry {
    Recipe(String),
    Custom(String),
}

impl MealEntry {
    pub fn recipe_id(&self) -> Option<&str> {
        match self {
            MealEntry::Recipe(id) => Some(id),
            MealEntry::Custom(_) => None,
        }
    }
}

/// `day -> meal type -> entries`, kept free of empty branches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MealGrid {
    days: BTreeMap<String, BTreeMap<String, Vec<MealEntry>>>,
}

impl MealGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days
            .values()
            .flat_map(|meals| meals.values())
            .map(Vec::len)
            .sum()
    }

    pub fn add(&mut self, day: NaiveDate, meal_type: &str, entry: MealEntry) {
        self.days
            .entry(day_key(day))
            .or_default()
            .entry(meal_type_key(meal_type))
            .or_default()
            .push(entry);
    }

    /// Removes the entry at `index`, pruning the meal type and then the day
    /// once they are empty. Out-of-range indices leave the grid untouched.
    pub fn remove(&mut self, day: NaiveDate, meal_type: &str, index: usize) -> Option<MealEntry> {
        let day = day_key(day);
        let meal_type = meal_type_key(meal_type);
        let meals = self.days.get_mut(&day)?;
        let entries = meals.get_mut(&meal_type)?;
        if index >= entries.len() {
            return None;
        }
        let removed = entries.remove(index);
        if entries.is_empty() {
            meals.remove(&meal_type);
        }
        if meals.is_empty() {
            self.days.remove(&day);
        }
        Some(removed)
    }

    pub fn entries(&self, day: NaiveDate, meal_type: &str) -> &[MealEntry] {
        self.days
            .get(&day_key(day))
            .and_then(|meals| meals.get(&meal_type_key(meal_type)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.days.contains_key(&day_key(day))
    }

    pub fn contains_meal_type(&self, day: NaiveDate, meal_type: &str) -> bool {
        self.days
            .get(&day_key(day))
            .map(|meals| meals.contains_key(&meal_type_key(meal_type)))
            .unwrap_or(false)
    }

    /// Iterates `(day, meal type, entries)` in day then meal-type order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[MealEntry])> {
        self.days.iter().flat_map(|(day, meals)| {
            meals
                .iter()
                .map(move |(meal_type, entries)| (day.as_str(), meal_type.as_str(), entries.as_slice()))
        })
    }

    pub fn recipe_ids(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .flat_map(|(_, _, entries)| entries.iter().filter_map(MealEntry::recipe_id))
    }

    /// Drops every reference to `recipe_id`, pruning emptied branches.
    pub fn remove_recipe(&mut self, recipe_id: &str) -> usize {
        let mut removed = 0;
        for meals in self.days.values_mut() {
            for entries in meals.values_mut() {
                let before = entries.len();
                entries.retain(|entry| entry.recipe_id() != Some(recipe_id));
                removed += before - entries.len();
            }
            meals.retain(|_, entries| !entries.is_empty());
        }
        self.days.retain(|_, meals| !meals.is_empty());
        removed
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn meal_type_key(meal_type: &str) -> String {
    meal_type.trim().to_lowercase()
}
