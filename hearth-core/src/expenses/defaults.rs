use std::collections::HashSet;

use rusqlite::{params, Connection};

use crate::store::{new_id, StoreResult};

#[derive(Debug, Clone, Copy)]
pub struct DefaultExpenseCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const fn category(
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
) -> DefaultExpenseCategory {
    DefaultExpenseCategory {
        name,
        description,
        icon,
        color,
    }
}

pub const DEFAULT_EXPENSE_CATEGORIES: &[DefaultExpenseCategory] = &[
    category("Food & Dining", "Restaurants, groceries, and food delivery", "utensils", "#f97316"),
    category("Transportation", "Gas, public transit, parking, rideshare", "car", "#3b82f6"),
    category("Utilities", "Electricity, water, gas, internet, phone", "bolt", "#eab308"),
    category("Shopping", "General shopping and retail purchases", "shopping-bag", "#8b5cf6"),
    category("Entertainment", "Movies, concerts, hobbies, subscriptions", "film", "#ec4899"),
    category("Healthcare", "Medical expenses, prescriptions, insurance", "heartbeat", "#ef4444"),
    category("Education", "Tuition, books, courses, supplies", "graduation-cap", "#06b6d4"),
    category("Home & Garden", "Home improvement, furniture, maintenance", "home", "#10b981"),
    category("Personal Care", "Haircuts, cosmetics, personal items", "user", "#f59e0b"),
    category("Travel", "Hotels, flights, vacation expenses", "plane", "#6366f1"),
    category("Bills & Fees", "Bank fees, service charges, subscriptions", "file-invoice-dollar", "#64748b"),
    category("Gifts & Donations", "Gifts, charity, donations", "gift", "#f43f5e"),
    category("Other", "Miscellaneous expenses", "ellipsis-h", "#94a3b8"),
];

/// Inserts whichever default expense categories the family lacks, matched by
/// name.
pub fn seed_default_categories(conn: &Connection, family_id: &str) -> StoreResult<usize> {
    let existing: HashSet<String> = {
        let mut stmt = conn.prepare("SELECT name FROM expense_categories WHERE family_id = ?1")?;
        let names = stmt
            .query_map([family_id], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        names
    };

    let mut inserted = 0;
    for (index, default) in DEFAULT_EXPENSE_CATEGORIES.iter().enumerate() {
        if existing.contains(default.name) {
            continue;
        }
        conn.execute(
            "INSERT INTO expense_categories(category_id, family_id, name, description, icon, color, position, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
            params![
                new_id("cat"),
                family_id,
                default.name,
                default.description,
                default.icon,
                default.color,
                index as i64 + 1,
            ],
        )?;
        inserted += 1;
    }
    Ok(inserted)
}
