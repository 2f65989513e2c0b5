use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::categorize::suggest_category;
use super::models::{
    CompletedGroceryItem, FamilyList, GroceryCategory, ListItem, ListType, NewListItem,
    DEFAULT_LIST_COLOR,
};
use crate::store::{bool_to_sql, new_id, Database, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct ListStore {
    db: Database,
}

impl ListStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create_list(
        &self,
        family_id: &str,
        name: &str,
        list_type: ListType,
        created_by: Option<&str>,
    ) -> StoreResult<FamilyList> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::invalid("name", "list name must not be empty"));
        }
        let conn = self.db.open()?;
        let list_id = new_id("lst");
        conn.execute(
            "INSERT INTO lists(list_id, family_id, created_by, name, list_type, color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                list_id,
                family_id,
                created_by,
                name,
                list_type.as_str(),
                DEFAULT_LIST_COLOR
            ],
        )?;
        info!(target: "lists", %list_id, %list_type, "list created");
        fetch_list(&conn, &list_id)?.ok_or_else(|| StoreError::not_found("list", list_id))
    }

    pub fn fetch_list(&self, list_id: &str) -> StoreResult<Option<FamilyList>> {
        let conn = self.db.open()?;
        fetch_list(&conn, list_id)
    }

    pub fn lists_for_family(
        &self,
        family_id: &str,
        include_archived: bool,
    ) -> StoreResult<Vec<FamilyList>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM lists
             WHERE family_id = ?1 AND (?2 OR archived = 0)
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
            .query_map(params![family_id, include_archived], |row| {
                FamilyList::from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn update_list(
        &self,
        list_id: &str,
        name: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
    ) -> StoreResult<FamilyList> {
        if let Some(color) = color {
            if !is_hex_color(color) {
                return Err(StoreError::invalid("color", format!("`{color}` is not #rrggbb")));
            }
        }
        let conn = self.db.open()?;
        let affected = conn.execute(
            "UPDATE lists
             SET name = COALESCE(?2, name),
                 description = COALESCE(?3, description),
                 color = COALESCE(?4, color),
                 updated_at = CURRENT_TIMESTAMP
             WHERE list_id = ?1",
            params![list_id, name.map(str::trim), description, color],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found("list", list_id));
        }
        fetch_list(&conn, list_id)?.ok_or_else(|| StoreError::not_found("list", list_id))
    }

    pub fn set_archived(&self, list_id: &str, archived: bool) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute(
            "UPDATE lists SET archived = ?2, updated_at = CURRENT_TIMESTAMP WHERE list_id = ?1",
            params![list_id, bool_to_sql(archived)],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found("list", list_id));
        }
        Ok(())
    }

    pub fn delete_list(&self, list_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute("DELETE FROM lists WHERE list_id = ?1", [list_id])?;
        if affected == 0 {
            return Err(StoreError::not_found("list", list_id));
        }
        Ok(())
    }

    pub fn categories(&self, family_id: &str) -> StoreResult<Vec<GroceryCategory>> {
        let conn = self.db.open()?;
        categories(&conn, family_id)
    }

    pub fn add_item(&self, list_id: &str, item: &NewListItem) -> StoreResult<ListItem> {
        let mut items = self.add_items(list_id, std::slice::from_ref(item))?;
        items
            .pop()
            .ok_or_else(|| StoreError::not_found("list item", list_id))
    }

    /// Appends items in order. Grocery items without a category get the
    /// suggested one.
    pub fn add_items(&self, list_id: &str, items: &[NewListItem]) -> StoreResult<Vec<ListItem>> {
        let mut conn = self.db.open()?;
        let list = fetch_list(&conn, list_id)?.ok_or_else(|| StoreError::not_found("list", list_id))?;
        let grocery_categories = if list.list_type == ListType::Grocery {
            categories(&conn, &list.family_id)?
        } else {
            Vec::new()
        };

        let tx = conn.transaction()?;
        let mut position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) FROM list_items WHERE list_id = ?1",
            [list_id],
            |row| row.get(0),
        )?;
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                return Err(StoreError::invalid("name", "item name must not be empty"));
            }
            let category_id = item.category_id.clone().or_else(|| {
                suggest_category(name, &grocery_categories).map(|category| {
                    debug!(target: "lists", item = name, category = %category.name, "category suggested");
                    category.category_id.clone()
                })
            });
            position += 1;
            let item_id = new_id("itm");
            tx.execute(
                "INSERT INTO list_items(item_id, list_id, name, notes, quantity, category_id, position, due_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    item_id,
                    list_id,
                    name,
                    item.notes,
                    item.quantity,
                    category_id,
                    position,
                    item.due_date,
                ],
            )?;
            ids.push(item_id);
        }
        tx.execute(
            "UPDATE lists SET updated_at = CURRENT_TIMESTAMP WHERE list_id = ?1",
            [list_id],
        )?;
        tx.commit()?;

        ids.iter()
            .map(|id| fetch_item(&conn, id)?.ok_or_else(|| StoreError::not_found("list item", id)))
            .collect()
    }

    pub fn items(&self, list_id: &str) -> StoreResult<Vec<ListItem>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM list_items WHERE list_id = ?1 ORDER BY position ASC, created_at ASC",
        )?;
        let rows = stmt
            .query_map([list_id], |row| ListItem::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Marks an item done or not done. Completing an item on a grocery list
    /// also appends it to the family's completed-grocery history.
    pub fn set_completed(
        &self,
        item_id: &str,
        completed: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<ListItem> {
        let mut conn = self.db.open()?;
        let item = fetch_item(&conn, item_id)?
            .ok_or_else(|| StoreError::not_found("list item", item_id))?;
        let list = fetch_list(&conn, &item.list_id)?
            .ok_or_else(|| StoreError::not_found("list", &item.list_id))?;

        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE list_items
             SET completed = ?2, completed_at = ?3, updated_at = CURRENT_TIMESTAMP
             WHERE item_id = ?1",
            params![
                item_id,
                bool_to_sql(completed),
                completed.then(|| now.naive_utc())
            ],
        )?;
        if completed && !item.completed && list.list_type == ListType::Grocery {
            let category_name: Option<String> = match &item.category_id {
                Some(category_id) => tx
                    .query_row(
                        "SELECT name FROM grocery_categories WHERE category_id = ?1",
                        [category_id],
                        |row| row.get(0),
                    )
                    .optional()?,
                None => None,
            };
            tx.execute(
                "INSERT INTO completed_grocery_items(family_id, list_name, item_name, quantity, category_name, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    list.family_id,
                    list.name,
                    item.name,
                    item.quantity,
                    category_name,
                    now.naive_utc()
                ],
            )?;
        }
        tx.commit()?;
        fetch_item(&conn, item_id)?.ok_or_else(|| StoreError::not_found("list item", item_id))
    }

    /// Applies a drag-and-drop result: `ordered_ids` must be exactly the
    /// list's item ids, in their new order.
    pub fn reorder_items(&self, list_id: &str, ordered_ids: &[String]) -> StoreResult<()> {
        let mut conn = self.db.open()?;
        let current: HashSet<String> = {
            let mut stmt = conn.prepare("SELECT item_id FROM list_items WHERE list_id = ?1")?;
            let ids = stmt
                .query_map([list_id], |row| row.get::<_, String>(0))?
                .collect::<Result<HashSet<_>, _>>()?;
            ids
        };
        let requested: HashSet<String> = ordered_ids.iter().cloned().collect();
        if requested.len() != ordered_ids.len() || requested != current {
            return Err(StoreError::invalid(
                "ordered_ids",
                "must list every item of the list exactly once",
            ));
        }

        let tx = conn.transaction()?;
        for (position, item_id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE list_items SET position = ?2, updated_at = CURRENT_TIMESTAMP WHERE item_id = ?1",
                params![item_id, position as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete_item(&self, item_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute("DELETE FROM list_items WHERE item_id = ?1", [item_id])?;
        if affected == 0 {
            return Err(StoreError::not_found("list item", item_id));
        }
        Ok(())
    }

    pub fn completed_history(
        &self,
        family_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<CompletedGroceryItem>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM completed_grocery_items
             WHERE family_id = ?1
             ORDER BY completed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![family_id, limit as i64], |row| {
                CompletedGroceryItem::from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn fetch_list(conn: &Connection, list_id: &str) -> StoreResult<Option<FamilyList>> {
    let list = conn
        .query_row("SELECT * FROM lists WHERE list_id = ?1", [list_id], |row| {
            FamilyList::from_row(row)
        })
        .optional()?;
    Ok(list)
}

fn fetch_item(conn: &Connection, item_id: &str) -> StoreResult<Option<ListItem>> {
    let item = conn
        .query_row(
            "SELECT * FROM list_items WHERE item_id = ?1",
            [item_id],
            |row| ListItem::from_row(row),
        )
        .optional()?;
    Ok(item)
}

fn categories(conn: &Connection, family_id: &str) -> StoreResult<Vec<GroceryCategory>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM grocery_categories WHERE family_id = ?1 ORDER BY position ASC, name ASC",
    )?;
    let rows = stmt
        .query_map([family_id], |row| GroceryCategory::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
