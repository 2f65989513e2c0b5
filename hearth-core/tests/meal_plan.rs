use chrono::NaiveDate;
use hearth_core::family::FamilyStore;
use hearth_core::lists::{ListStore, ListType};
use hearth_core::meals::{MealEntry, MealGrid, MealPlanStore, NewRecipe, RecipeStore};
use hearth_core::{Database, StoreError};
use tempfile::{tempdir, TempDir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Fixture {
    _dir: TempDir,
    db: Database,
    family_id: String,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let db = Database::new(dir.path().join("hearth.sqlite")).unwrap();
    db.initialize().unwrap();
    let (family, _) = FamilyStore::new(db.clone())
        .create_family("The Parkers", "pat@example.com", None)
        .unwrap();
    Fixture {
        _dir: dir,
        db,
        family_id: family.family_id,
    }
}

#[test]
fn grid_prunes_empty_branches() {
    let monday = date(2025, 3, 3);
    let mut grid = MealGrid::new();
    grid.add(monday, "Dinner", MealEntry::Custom("Tacos".into()));
    assert!(grid.contains_meal_type(monday, "dinner"));

    assert_eq!(grid.remove(monday, "dinner", 3), None);
    assert_eq!(
        grid.remove(monday, "dinner", 0),
        Some(MealEntry::Custom("Tacos".into()))
    );
    assert!(!grid.contains_meal_type(monday, "dinner"));
    assert!(!grid.contains_day(monday));
    assert!(grid.is_empty());
}

#[test]
fn grid_keeps_sibling_meals() {
    let monday = date(2025, 3, 3);
    let mut grid = MealGrid::new();
    grid.add(monday, "lunch", MealEntry::Custom("Soup".into()));
    grid.add(monday, "dinner", MealEntry::Custom("Tacos".into()));
    grid.remove(monday, "dinner", 0);
    assert!(grid.contains_day(monday));
    assert_eq!(grid.len(), 1);
    assert_eq!(
        serde_json::to_value(&grid).unwrap(),
        serde_json::json!({"2025-03-03": {"lunch": [{"custom": "Soup"}]}})
    );
}

#[test]
fn meals_persist_per_week() {
    let fx = fixture();
    let plans = MealPlanStore::new(fx.db.clone());
    let week = date(2025, 3, 3);

    let plan = plans
        .add_meal(&fx.family_id, week, date(2025, 3, 5), "dinner", MealEntry::Custom("Pizza".into()))
        .unwrap();
    let again = plans
        .add_meal(&fx.family_id, week, date(2025, 3, 5), "dinner", MealEntry::Custom("Salad".into()))
        .unwrap();
    assert_eq!(plan.meal_plan_id, again.meal_plan_id);
    assert_eq!(again.meals.entries(date(2025, 3, 5), "dinner").len(), 2);

    let outside = plans.add_meal(
        &fx.family_id,
        week,
        date(2025, 3, 10),
        "dinner",
        MealEntry::Custom("Late".into()),
    );
    assert!(matches!(outside, Err(StoreError::Invalid { .. })));

    let next_week = date(2025, 3, 10);
    let stray = plans.add_meal(
        &fx.family_id,
        next_week,
        date(2025, 3, 5),
        "lunch",
        MealEntry::Custom("Soup".into()),
    );
    assert!(matches!(stray, Err(StoreError::Invalid { .. })));
    assert!(plans.plan_for_week(&fx.family_id, next_week).unwrap().is_none());

    let pruned = plans
        .remove_meal(&again.meal_plan_id, date(2025, 3, 5), "dinner", 0)
        .unwrap();
    let pruned = plans
        .remove_meal(&pruned.meal_plan_id, date(2025, 3, 5), "dinner", 0)
        .unwrap();
    assert!(pruned.meals.is_empty());
    assert!(plans
        .remove_meal(&pruned.meal_plan_id, date(2025, 3, 5), "dinner", 0)
        .is_err());
}

#[test]
fn deleting_a_recipe_clears_it_from_plans() {
    let fx = fixture();
    let recipes = RecipeStore::new(fx.db.clone());
    let plans = MealPlanStore::new(fx.db.clone());
    let recipe = recipes
        .create_recipe(
            &fx.family_id,
            &NewRecipe {
                title: "Chili".into(),
                ingredients: vec!["Ground beef".into(), "Kidney beans".into()],
                prep_time_minutes: Some(15),
                cook_time_minutes: Some(45),
                ..NewRecipe::default()
            },
        )
        .unwrap();
    assert_eq!(recipe.total_time_minutes(), Some(60));

    let week = date(2025, 3, 3);
    plans
        .add_meal(&fx.family_id, week, week, "dinner", MealEntry::Recipe(recipe.recipe_id.clone()))
        .unwrap();
    let plan = plans
        .add_meal(&fx.family_id, week, week, "lunch", MealEntry::Custom("Leftovers".into()))
        .unwrap();
    assert_eq!(plan.meals.recipe_ids().count(), 1);

    recipes.delete_recipe(&recipe.recipe_id).unwrap();
    let plan = plans.plan_for_week(&fx.family_id, week).unwrap().unwrap();
    assert_eq!(plan.meals.recipe_ids().count(), 0);
    assert_eq!(plan.meals.len(), 1);
}

#[test]
fn unknown_recipes_are_rejected() {
    let fx = fixture();
    let plans = MealPlanStore::new(fx.db);
    let week = date(2025, 3, 3);
    let result = plans.add_meal(&fx.family_id, week, week, "dinner", MealEntry::Recipe("rcp-missing".into()));
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[test]
fn recipe_ingredients_become_list_items() {
    let fx = fixture();
    let recipes = RecipeStore::new(fx.db.clone());
    let lists = ListStore::new(fx.db.clone());
    let recipe = recipes
        .create_recipe(
            &fx.family_id,
            &NewRecipe {
                title: "Pancakes".into(),
                ingredients: vec![
                    "1½ cups flour".into(),
                    " ".into(),
                    "2 eggs".into(),
                    "1 cup milk 250 mL".into(),
                    "Salt".into(),
                ],
                ..NewRecipe::default()
            },
        )
        .unwrap();
    let list = lists
        .create_list(&fx.family_id, "Groceries", ListType::Grocery, None)
        .unwrap();

    let items = recipes.add_to_list(&recipe.recipe_id, &lists, &list.list_id).unwrap();
    assert_eq!(
        items.iter().map(|item| item.name.as_str()).collect::<Vec<_>>(),
        vec!["flour", "eggs", "milk", "Salt"]
    );
    assert_eq!(
        items.iter().map(|item| item.quantity.as_deref()).collect::<Vec<_>>(),
        vec![Some("1 1/2 cups"), Some("2"), Some("1 cup"), None]
    );
    assert!(items
        .iter()
        .all(|item| item.notes.as_deref() == Some("From recipe: Pancakes")));
    assert!(items.iter().all(|item| item.category_id.is_some()));
}
