use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    Todo,
    Grocery,
    Shopping,
    Other,
}

impl ListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::Todo => "todo",
            ListType::Grocery => "grocery",
            ListType::Shopping => "shopping",
            ListType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListType::Todo => "To-Do List",
            ListType::Grocery => "Grocery List",
            ListType::Shopping => "Shopping List",
            ListType::Other => "Other",
        }
    }
}

impl Default for ListType {
    fn default() -> Self {
        ListType::Shopping
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(ListType::Todo),
            "grocery" => Ok(ListType::Grocery),
            "shopping" => Ok(ListType::Shopping),
            "other" => Ok(ListType::Other),
            other => Err(format!("unknown list type: {other}")),
        }
    }
}

pub const DEFAULT_LIST_COLOR: &str = "#10b981";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyList {
    pub list_id: String,
    pub family_id: String,
    pub created_by: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub list_type: ListType,
    pub color: String,
    pub archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FamilyList {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: Option<NaiveDateTime> = row.get("created_at")?;
        let updated_at: Option<NaiveDateTime> = row.get("updated_at")?;
        Ok(Self {
            list_id: row.get("list_id")?,
            family_id: row.get("family_id")?,
            created_by: row.get("created_by")?,
            name: row.get("name")?,
            description: row.get("description")?,
            list_type: row
                .get::<_, String>("list_type")?
                .parse()
                .unwrap_or_default(),
            color: row.get("color")?,
            archived: row.get::<_, i64>("archived")? != 0,
            created_at: created_at.map(|dt| Utc.from_utc_datetime(&dt)),
            updated_at: updated_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewListItem {
    pub name: String,
    pub notes: Option<String>,
    pub quantity: Option<String>,
    pub category_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl NewListItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItem {
    pub item_id: String,
    pub list_id: String,
    pub name: String,
    pub notes: Option<String>,
    pub quantity: Option<String>,
    pub category_id: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub position: i64,
    pub due_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ListItem {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let completed_at: Option<NaiveDateTime> = row.get("completed_at")?;
        let created_at: Option<NaiveDateTime> = row.get("created_at")?;
        Ok(Self {
            item_id: row.get("item_id")?,
            list_id: row.get("list_id")?,
            name: row.get("name")?,
            notes: row.get("notes")?,
            quantity: row.get("quantity")?,
            category_id: row.get("category_id")?,
            completed: row.get::<_, i64>("completed")? != 0,
            completed_at: completed_at.map(|dt| Utc.from_utc_datetime(&dt)),
            position: row.get("position")?,
            due_date: row.get("due_date")?,
            created_at: created_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroceryCategory {
    pub category_id: String,
    pub family_id: String,
    pub name: String,
    pub description: Option<String>,
    pub position: i64,
    pub is_default: bool,
    pub keywords: Vec<String>,
}

impl GroceryCategory {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let keywords: String = row.get("keywords")?;
        Ok(Self {
            category_id: row.get("category_id")?,
            family_id: row.get("family_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            position: row.get("position")?,
            is_default: row.get::<_, i64>("is_default")? != 0,
            keywords: serde_json::from_str(&keywords).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedGroceryItem {
    pub family_id: String,
    pub list_name: String,
    pub item_name: String,
    pub quantity: Option<String>,
    pub recipe_name: Option<String>,
    pub category_name: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletedGroceryItem {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let completed_at: Option<NaiveDateTime> = row.get("completed_at")?;
        Ok(Self {
            family_id: row.get("family_id")?,
            list_name: row.get("list_name")?,
            item_name: row.get("item_name")?,
            quantity: row.get("quantity")?,
            recipe_name: row.get("recipe_name")?,
            category_name: row.get("category_name")?,
            completed_at: completed_at.map(|dt| Utc.from_utc_datetime(&dt)),
        })
    }
}
