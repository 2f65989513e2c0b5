use clap::{Args, Subcommand};
use hearth_core::lists::ListStore;
use hearth_core::meals::{NewRecipe, RecipeStore};

use crate::report::ActionResult;
use crate::{render, AppError, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum RecipeCommands {
    /// Saves a recipe in the selected family
    Create(RecipeCreateArgs),
    /// Recipes of the selected family, newest first
    List,
    /// One recipe
    Show(RecipeIdArgs),
    /// Copies a recipe's ingredients onto a list
    AddToList(AddToListArgs),
    /// Deletes a recipe and drops it from every meal plan
    Delete(RecipeIdArgs),
}

#[derive(Args, Debug)]
pub struct RecipeCreateArgs {
    pub title: String,
    /// One ingredient; repeat for more
    #[arg(long = "ingredient")]
    pub ingredients: Vec<String>,
    /// One instruction step; repeat for more
    #[arg(long = "step")]
    pub instructions: Vec<String>,
    #[arg(long)]
    pub servings: Option<i64>,
    /// Preparation time in minutes
    #[arg(long)]
    pub prep: Option<i64>,
    /// Cooking time in minutes
    #[arg(long)]
    pub cook: Option<i64>,
    #[arg(long)]
    pub source_url: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecipeIdArgs {
    pub recipe_id: String,
}

#[derive(Args, Debug)]
pub struct AddToListArgs {
    pub recipe_id: String,
    pub list_id: String,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &RecipeCommands,
    format: OutputFormat,
) -> Result<()> {
    let db = context.database()?;
    let store = RecipeStore::new(db.clone());
    match command {
        RecipeCommands::Create(args) => {
            let recipe = store.create_recipe(
                &context.family_id()?,
                &NewRecipe {
                    title: args.title.clone(),
                    notes: args.notes.clone(),
                    ingredients: args.ingredients.clone(),
                    instructions: args.instructions.clone(),
                    servings: args.servings,
                    prep_time_minutes: args.prep,
                    cook_time_minutes: args.cook,
                    source_url: args.source_url.clone(),
                },
            )?;
            render(&recipe, format)
        }
        RecipeCommands::List => render(&store.recipes_for_family(&context.family_id()?)?, format),
        RecipeCommands::Show(args) => {
            let recipe = store
                .fetch_recipe(&args.recipe_id)?
                .ok_or_else(|| AppError::MissingResource(format!("recipe {}", args.recipe_id)))?;
            render(&recipe, format)
        }
        RecipeCommands::AddToList(args) => {
            let items = store.add_to_list(&args.recipe_id, &ListStore::new(db), &args.list_id)?;
            render(&items, format)
        }
        RecipeCommands::Delete(args) => {
            store.delete_recipe(&args.recipe_id)?;
            render(
                &ActionResult::ok(format!("recipe {} deleted", args.recipe_id)),
                format,
            )
        }
    }
}
