pub mod grid;
pub mod ingredients;
pub mod models;
pub mod store;

pub use grid::{MealEntry, MealGrid};
pub use ingredients::{parse_ingredient, ParsedIngredient};
pub use models::{MealPlan, NewRecipe, Recipe};
pub use store::{MealPlanStore, RecipeStore};
