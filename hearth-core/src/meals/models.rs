use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::grid::MealGrid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub servings: Option<i64>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub recipe_id: String,
    pub family_id: String,
    pub title: String,
    pub notes: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub servings: Option<i64>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub source_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Recipe {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: Option<NaiveDateTime> = row.get("created_at")?;
        let ingredients: String = row.get("ingredients")?;
        let instructions: String = row.get("instructions")?;
        Ok(Self {
            recipe_id: row.get("recipe_id")?,
            family_id: row.get("family_id")?,
            title: row.get("title")?,
            notes: row.get("notes")?,
            ingredients: serde_json::from_str(&ingredients).unwrap_or_default(),
            instructions: serde_json::from_str(&instructions).unwrap_or_default(),
            servings: row.get("servings")?,
            prep_time_minutes: row.get("prep_time_minutes")?,
            cook_time_minutes: row.get("cook_time_minutes")?,
            source_url: row.get("source_url")?,
            created_at: created_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }

    pub fn total_time_minutes(&self) -> Option<i64> {
        match (self.prep_time_minutes, self.cook_time_minutes) {
            (None, None) => None,
            (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlan {
    pub meal_plan_id: String,
    pub family_id: String,
    pub week_start_date: NaiveDate,
    pub notes: Option<String>,
    pub meals: MealGrid,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MealPlan {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let updated_at: Option<NaiveDateTime> = row.get("updated_at")?;
        let meals: String = row.get("meals")?;
        Ok(Self {
            meal_plan_id: row.get("meal_plan_id")?,
            family_id: row.get("family_id")?,
            week_start_date: row.get("week_start_date")?,
            notes: row.get("notes")?,
            meals: serde_json::from_str(&meals).unwrap_or_default(),
            updated_at: updated_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        week_covers(self.week_start_date, day)
    }
}

/// Whether `day` falls in the seven days starting at `week_start_date`.
pub fn week_covers(week_start_date: NaiveDate, day: NaiveDate) -> bool {
    let offset = (day - week_start_date).num_days();
    (0..7).contains(&offset)
}
