use std::collections::HashSet;

use rusqlite::{params, Connection};

use super::models::GroceryCategory;
use crate::store::{new_id, StoreResult};

#[derive(Debug, Clone, Copy)]
pub struct DefaultGroceryCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

pub const DEFAULT_GROCERY_CATEGORIES: &[DefaultGroceryCategory] = &[
    DefaultGroceryCategory {
        name: "Produce",
        description: "Fruits & Vegetables",
        keywords: &[
            "apple", "apples", "banana", "bananas", "lettuce", "tomato", "tomatoes", "onion",
            "onions", "garlic", "herb", "herbs", "fruit", "fruits", "vegetable", "vegetables",
            "produce", "carrot", "carrots", "potato", "potatoes", "pepper", "peppers",
            "cucumber", "cucumbers", "spinach", "broccoli", "cauliflower", "celery", "corn",
            "peas", "beans", "green beans",
        ],
    },
    DefaultGroceryCategory {
        name: "Meat & Seafood",
        description: "",
        keywords: &[
            "chicken", "beef", "pork", "salmon", "shrimp", "fish", "meat", "seafood", "turkey",
            "bacon", "sausage", "steak", "ground", "tuna", "cod", "tilapia", "crab", "lobster",
            "mussels", "clams", "ham", "ribs",
        ],
    },
    DefaultGroceryCategory {
        name: "Dairy & Eggs",
        description: "",
        keywords: &[
            "milk", "cheese", "yogurt", "butter", "egg", "eggs", "dairy", "cream",
            "sour cream", "cottage cheese", "mozzarella", "cheddar", "swiss", "parmesan",
            "ricotta", "feta", "greek yogurt",
        ],
    },
    DefaultGroceryCategory {
        name: "Pantry Staples",
        description: "Dry Goods",
        keywords: &[
            "rice", "pasta", "flour", "sugar", "bean", "beans", "spice", "spices", "oil", "oils",
            "canned", "salt", "pepper", "vinegar", "soy sauce", "olive oil", "vegetable oil",
            "canola oil", "baking powder", "baking soda", "yeast", "breadcrumbs", "cereal",
            "oatmeal", "quinoa", "barley", "lentils", "chickpeas", "black beans", "kidney beans",
        ],
    },
    DefaultGroceryCategory {
        name: "Frozen Foods",
        description: "",
        keywords: &[
            "frozen", "pizza", "ice cream", "berries", "frozen vegetables", "frozen fruit",
            "frozen meals", "frozen chicken", "frozen fish", "frozen berries", "frozen peas",
            "frozen corn", "frozen broccoli",
        ],
    },
    DefaultGroceryCategory {
        name: "Bakery",
        description: "",
        keywords: &[
            "bread", "bagel", "bagels", "tortilla", "tortillas", "pastry", "pastries", "bakery",
            "roll", "rolls", "bun", "buns", "croissant", "muffin", "muffins", "donut", "donuts",
            "cake", "cakes", "cookie", "cookies",
        ],
    },
    DefaultGroceryCategory {
        name: "Snacks & Packaged Goods",
        description: "",
        keywords: &[
            "chips", "crackers", "granola", "nuts", "snacks", "pretzels", "popcorn", "trail mix",
            "almonds", "walnuts", "peanuts", "cashews", "pistachios", "cookies", "candy",
            "chocolate", "bars", "granola bars", "energy bars",
        ],
    },
    DefaultGroceryCategory {
        name: "Beverages",
        description: "",
        keywords: &[
            "coffee", "tea", "juice", "soda", "water", "beverages", "beer", "wine",
            "sparkling water", "lemonade", "iced tea", "sports drink", "energy drink",
            "hot chocolate", "cocoa", "milk", "almond milk", "soy milk", "oat milk",
        ],
    },
    DefaultGroceryCategory {
        name: "Household & Miscellaneous",
        description: "",
        keywords: &[
            "cleaning", "paper towels", "toiletries", "household", "toilet paper", "soap",
            "shampoo", "conditioner", "toothpaste", "detergent", "laundry", "dish soap",
            "sponges", "trash bags", "ziploc", "aluminum foil", "plastic wrap", "batteries",
            "light bulbs",
        ],
    },
];

/// Best-guess category for an item name.
///
/// A category whose name contains the item name (or the reverse) wins; after
/// that the first category with a keyword contained in the item name.
/// Categories are checked in the order given.
pub fn suggest_category<'a>(
    item_name: &str,
    categories: &'a [GroceryCategory],
) -> Option<&'a GroceryCategory> {
    let item = item_name.trim().to_lowercase();
    if item.is_empty() {
        return None;
    }

    categories
        .iter()
        .find(|category| {
            let name = category.name.to_lowercase();
            name.contains(&item) || item.contains(&name)
        })
        .or_else(|| {
            categories.iter().find(|category| {
                category
                    .keywords
                    .iter()
                    .any(|keyword| item.contains(&keyword.to_lowercase()))
            })
        })
}

/// Inserts any default grocery categories the family is missing.
pub fn seed_default_categories(conn: &Connection, family_id: &str) -> StoreResult<usize> {
    let existing: HashSet<String> = {
        let mut stmt = conn.prepare("SELECT name FROM grocery_categories WHERE family_id = ?1")?;
        let names = stmt
            .query_map([family_id], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        names
    };

    let mut inserted = 0;
    for (index, category) in DEFAULT_GROCERY_CATEGORIES.iter().enumerate() {
        if existing.contains(category.name) {
            continue;
        }
        let description = if category.description.is_empty() {
            None
        } else {
            Some(category.description)
        };
        conn.execute(
            "INSERT INTO grocery_categories(category_id, family_id, name, description, position, is_default, keywords)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                new_id("gcat"),
                family_id,
                category.name,
                description,
                index as i64 + 1,
                serde_json::to_string(category.keywords)?,
            ],
        )?;
        inserted += 1;
    }
    Ok(inserted)
}
