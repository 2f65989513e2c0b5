use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use hearth_core::lists::{ListStore, ListType, NewListItem};

use crate::report::{ActionResult, ListDetail};
use crate::{render, AppError, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Creates a list in the selected family
    Create(ListCreateArgs),
    /// Lists of the selected family
    All(ListAllArgs),
    /// A list with its items in order
    Show(ListIdArgs),
    /// Renames or recolours a list
    Update(ListUpdateArgs),
    /// Appends an item; grocery items get a suggested category
    Add(ListAddArgs),
    /// Marks an item done
    Complete(CompleteArgs),
    /// Sets the item order from every item id of the list
    Reorder(ReorderArgs),
    /// Archives or restores a list
    Archive(ArchiveArgs),
    /// Removes one item
    RemoveItem(ItemIdArgs),
    /// Deletes a list and its items
    Delete(ListIdArgs),
    /// Grocery categories of the selected family
    Categories,
    /// Recently completed grocery items
    History(HistoryArgs),
}

#[derive(Args, Debug)]
pub struct ListCreateArgs {
    pub name: String,
    /// todo, grocery, shopping or other
    #[arg(long = "type", default_value_t = ListType::Shopping)]
    pub list_type: ListType,
    /// Email of the creating member
    #[arg(long)]
    pub created_by: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListAllArgs {
    /// Include archived lists
    #[arg(long, default_value_t = false)]
    pub archived: bool,
}

#[derive(Args, Debug)]
pub struct ListIdArgs {
    pub list_id: String,
}

#[derive(Args, Debug)]
pub struct ItemIdArgs {
    pub item_id: String,
}

#[derive(Args, Debug)]
pub struct ListUpdateArgs {
    pub list_id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Hex colour, #rrggbb
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListAddArgs {
    pub list_id: String,
    pub name: String,
    #[arg(long)]
    pub quantity: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Category id; grocery lists suggest one when omitted
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub due: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct CompleteArgs {
    pub item_id: String,
    /// Marks the item not done instead
    #[arg(long, default_value_t = false)]
    pub undo: bool,
}

#[derive(Args, Debug)]
pub struct ReorderArgs {
    pub list_id: String,
    #[arg(required = true)]
    pub item_ids: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    pub list_id: String,
    /// Restores an archived list
    #[arg(long, default_value_t = false)]
    pub restore: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &ListCommands,
    format: OutputFormat,
) -> Result<()> {
    let store = ListStore::new(context.database()?);
    match command {
        ListCommands::Create(args) => {
            let list = store.create_list(
                &context.family_id()?,
                &args.name,
                args.list_type,
                args.created_by.as_deref(),
            )?;
            render(&list, format)
        }
        ListCommands::All(args) => {
            render(&store.lists_for_family(&context.family_id()?, args.archived)?, format)
        }
        ListCommands::Show(args) => render(&list_detail(&store, &args.list_id)?, format),
        ListCommands::Update(args) => {
            let list = store.update_list(
                &args.list_id,
                args.name.as_deref(),
                args.description.as_deref(),
                args.color.as_deref(),
            )?;
            render(&list, format)
        }
        ListCommands::Add(args) => {
            let item = store.add_item(
                &args.list_id,
                &NewListItem {
                    name: args.name.clone(),
                    notes: args.notes.clone(),
                    quantity: args.quantity.clone(),
                    category_id: args.category.clone(),
                    due_date: args.due,
                },
            )?;
            render(&item, format)
        }
        ListCommands::Complete(args) => {
            let item = store.set_completed(&args.item_id, !args.undo, Utc::now())?;
            render(&item, format)
        }
        ListCommands::Reorder(args) => {
            store.reorder_items(&args.list_id, &args.item_ids)?;
            render(&list_detail(&store, &args.list_id)?, format)
        }
        ListCommands::Archive(args) => {
            store.set_archived(&args.list_id, !args.restore)?;
            let verb = if args.restore { "restored" } else { "archived" };
            render(&ActionResult::ok(format!("list {} {verb}", args.list_id)), format)
        }
        ListCommands::RemoveItem(args) => {
            store.delete_item(&args.item_id)?;
            render(&ActionResult::ok(format!("item {} removed", args.item_id)), format)
        }
        ListCommands::Delete(args) => {
            store.delete_list(&args.list_id)?;
            render(&ActionResult::ok(format!("list {} deleted", args.list_id)), format)
        }
        ListCommands::Categories => render(&store.categories(&context.family_id()?)?, format),
        ListCommands::History(args) => {
            render(&store.completed_history(&context.family_id()?, args.limit)?, format)
        }
    }
}

fn list_detail(store: &ListStore, list_id: &str) -> Result<ListDetail> {
    let list = store
        .fetch_list(list_id)?
        .ok_or_else(|| AppError::MissingResource(format!("list {list_id}")))?;
    let items = store.items(list_id)?;
    Ok(ListDetail { list, items })
}
