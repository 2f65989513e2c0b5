pub mod categorize;
pub mod models;
pub mod store;

pub use categorize::{suggest_category, DEFAULT_GROCERY_CATEGORIES};
pub use models::{
    CompletedGroceryItem, FamilyList, GroceryCategory, ListItem, ListType, NewListItem,
};
pub use store::ListStore;
