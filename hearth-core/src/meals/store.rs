use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use super::grid::{MealEntry, MealGrid};
use super::ingredients::parse_ingredient;
use super::models::{week_covers, MealPlan, NewRecipe, Recipe};
use crate::lists::{ListItem, ListStore, NewListItem};
use crate::store::{new_id, Database, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct RecipeStore {
    db: Database,
}

impl RecipeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create_recipe(&self, family_id: &str, recipe: &NewRecipe) -> StoreResult<Recipe> {
        let title = recipe.title.trim();
        if title.is_empty() {
            return Err(StoreError::invalid("title", "recipe title must not be empty"));
        }
        let conn = self.db.open()?;
        let recipe_id = new_id("rcp");
        conn.execute(
            "INSERT INTO recipes(recipe_id, family_id, title, notes, ingredients, instructions,
                                 servings, prep_time_minutes, cook_time_minutes, source_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                recipe_id,
                family_id,
                title,
                recipe.notes,
                serde_json::to_string(&recipe.ingredients)?,
                serde_json::to_string(&recipe.instructions)?,
                recipe.servings,
                recipe.prep_time_minutes,
                recipe.cook_time_minutes,
                recipe.source_url,
            ],
        )?;
        fetch_recipe(&conn, &recipe_id)?.ok_or_else(|| StoreError::not_found("recipe", recipe_id))
    }

    pub fn fetch_recipe(&self, recipe_id: &str) -> StoreResult<Option<Recipe>> {
        let conn = self.db.open()?;
        fetch_recipe(&conn, recipe_id)
    }

    pub fn recipes_for_family(&self, family_id: &str) -> StoreResult<Vec<Recipe>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM recipes WHERE family_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map([family_id], |row| Recipe::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Deletes the recipe and drops it from every meal plan of its family.
    pub fn delete_recipe(&self, recipe_id: &str) -> StoreResult<()> {
        let mut conn = self.db.open()?;
        let recipe = fetch_recipe(&conn, recipe_id)?
            .ok_or_else(|| StoreError::not_found("recipe", recipe_id))?;
        let plans = plans_for_family(&conn, &recipe.family_id)?;

        let tx = conn.transaction()?;
        for mut plan in plans {
            if plan.meals.remove_recipe(recipe_id) > 0 {
                write_meals(&tx, &plan.meal_plan_id, &plan.meals)?;
            }
        }
        tx.execute("DELETE FROM recipes WHERE recipe_id = ?1", [recipe_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Copies the recipe's ingredients onto a list of the same family.
    pub fn add_to_list(
        &self,
        recipe_id: &str,
        lists: &ListStore,
        list_id: &str,
    ) -> StoreResult<Vec<ListItem>> {
        let recipe = self
            .fetch_recipe(recipe_id)?
            .ok_or_else(|| StoreError::not_found("recipe", recipe_id))?;
        let list = lists
            .fetch_list(list_id)?
            .ok_or_else(|| StoreError::not_found("list", list_id))?;
        if list.family_id != recipe.family_id {
            return Err(StoreError::invalid(
                "list_id",
                "list and recipe belong to different families",
            ));
        }
        let items: Vec<NewListItem> = recipe
            .ingredients
            .iter()
            .map(|ingredient| ingredient.trim())
            .filter(|ingredient| !ingredient.is_empty())
            .map(|ingredient| {
                let parsed = parse_ingredient(ingredient);
                NewListItem {
                    name: parsed.name,
                    quantity: parsed.quantity,
                    notes: Some(format!("From recipe: {}", recipe.title)),
                    ..NewListItem::default()
                }
            })
            .collect();
        if items.is_empty() {
            warn!(target: "meals", %recipe_id, "recipe has no ingredients to add");
            return Ok(Vec::new());
        }
        info!(target: "meals", %recipe_id, %list_id, count = items.len(), "adding ingredients to list");
        lists.add_items(list_id, &items)
    }
}

#[derive(Debug, Clone)]
pub struct MealPlanStore {
    db: Database,
}

impl MealPlanStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn plan_for_week(
        &self,
        family_id: &str,
        week_start_date: NaiveDate,
    ) -> StoreResult<Option<MealPlan>> {
        let conn = self.db.open()?;
        plan_for_week(&conn, family_id, week_start_date)
    }

    pub fn get_or_create(&self, family_id: &str, week_start_date: NaiveDate) -> StoreResult<MealPlan> {
        let conn = self.db.open()?;
        conn.execute(
            "INSERT INTO meal_plans(meal_plan_id, family_id, week_start_date)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(family_id, week_start_date) DO NOTHING",
            params![new_id("mpl"), family_id, week_start_date],
        )?;
        plan_for_week(&conn, family_id, week_start_date)?
            .ok_or_else(|| StoreError::not_found("meal plan", week_start_date.to_string()))
    }

    pub fn fetch_plan(&self, meal_plan_id: &str) -> StoreResult<Option<MealPlan>> {
        let conn = self.db.open()?;
        fetch_plan(&conn, meal_plan_id)
    }

    pub fn plans_for_family(&self, family_id: &str) -> StoreResult<Vec<MealPlan>> {
        let conn = self.db.open()?;
        plans_for_family(&conn, family_id)
    }

    /// Replaces the whole grid; the last writer wins.
    pub fn save_meals(&self, meal_plan_id: &str, meals: &MealGrid) -> StoreResult<MealPlan> {
        let conn = self.db.open()?;
        write_meals(&conn, meal_plan_id, meals)?;
        fetch_plan(&conn, meal_plan_id)?
            .ok_or_else(|| StoreError::not_found("meal plan", meal_plan_id))
    }

    pub fn set_notes(&self, meal_plan_id: &str, notes: Option<&str>) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute(
            "UPDATE meal_plans SET notes = ?2, updated_at = CURRENT_TIMESTAMP WHERE meal_plan_id = ?1",
            params![meal_plan_id, notes],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found("meal plan", meal_plan_id));
        }
        Ok(())
    }

    /// Appends a meal to the week's plan, creating the plan when needed.
    pub fn add_meal(
        &self,
        family_id: &str,
        week_start_date: NaiveDate,
        day: NaiveDate,
        meal_type: &str,
        entry: MealEntry,
    ) -> StoreResult<MealPlan> {
        if meal_type.trim().is_empty() {
            return Err(StoreError::invalid("meal_type", "must not be empty"));
        }
        match &entry {
            MealEntry::Recipe(recipe_id) => {
                let conn = self.db.open()?;
                let recipe = fetch_recipe(&conn, recipe_id)?
                    .ok_or_else(|| StoreError::not_found("recipe", recipe_id))?;
                if recipe.family_id != family_id {
                    return Err(StoreError::invalid(
                        "recipe_id",
                        "recipe belongs to a different family",
                    ));
                }
            }
            MealEntry::Custom(name) if name.trim().is_empty() => {
                return Err(StoreError::invalid("name", "custom meal must not be empty"));
            }
            MealEntry::Custom(_) => {}
        }

        if !week_covers(week_start_date, day) {
            return Err(StoreError::invalid(
                "day",
                format!("{day} is outside the week starting {week_start_date}"),
            ));
        }
        let mut plan = self.get_or_create(family_id, week_start_date)?;
        plan.meals.add(day, meal_type, entry);
        self.save_meals(&plan.meal_plan_id, &plan.meals)
    }

    pub fn remove_meal(
        &self,
        meal_plan_id: &str,
        day: NaiveDate,
        meal_type: &str,
        index: usize,
    ) -> StoreResult<MealPlan> {
        let mut plan = self
            .fetch_plan(meal_plan_id)?
            .ok_or_else(|| StoreError::not_found("meal plan", meal_plan_id))?;
        if plan.meals.remove(day, meal_type, index).is_none() {
            return Err(StoreError::not_found(
                "meal",
                format!("{day}/{meal_type}#{index}"),
            ));
        }
        self.save_meals(meal_plan_id, &plan.meals)
    }

    pub fn delete_plan(&self, meal_plan_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute("DELETE FROM meal_plans WHERE meal_plan_id = ?1", [meal_plan_id])?;
        if affected == 0 {
            return Err(StoreError::not_found("meal plan", meal_plan_id));
        }
        Ok(())
    }
}

fn fetch_recipe(conn: &Connection, recipe_id: &str) -> StoreResult<Option<Recipe>> {
    let recipe = conn
        .query_row(
            "SELECT * FROM recipes WHERE recipe_id = ?1",
            [recipe_id],
            |row| Recipe::from_row(row),
        )
        .optional()?;
    Ok(recipe)
}

fn fetch_plan(conn: &Connection, meal_plan_id: &str) -> StoreResult<Option<MealPlan>> {
    let plan = conn
        .query_row(
            "SELECT * FROM meal_plans WHERE meal_plan_id = ?1",
            [meal_plan_id],
            |row| MealPlan::from_row(row),
        )
        .optional()?;
    Ok(plan)
}

fn plan_for_week(
    conn: &Connection,
    family_id: &str,
    week_start_date: NaiveDate,
) -> StoreResult<Option<MealPlan>> {
    let plan = conn
        .query_row(
            "SELECT * FROM meal_plans WHERE family_id = ?1 AND week_start_date = ?2",
            params![family_id, week_start_date],
            |row| MealPlan::from_row(row),
        )
        .optional()?;
    Ok(plan)
}

fn plans_for_family(conn: &Connection, family_id: &str) -> StoreResult<Vec<MealPlan>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM meal_plans WHERE family_id = ?1 ORDER BY week_start_date DESC",
    )?;
    let rows = stmt
        .query_map([family_id], |row| MealPlan::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn write_meals(conn: &Connection, meal_plan_id: &str, meals: &MealGrid) -> StoreResult<()> {
    let affected = conn.execute(
        "UPDATE meal_plans SET meals = ?2, updated_at = CURRENT_TIMESTAMP WHERE meal_plan_id = ?1",
        params![meal_plan_id, serde_json::to_string(meals)?],
    )?;
    if affected == 0 {
        return Err(StoreError::not_found("meal plan", meal_plan_id));
    }
    Ok(())
}
