use chrono::NaiveDate;
use clap::{ArgGroup, Args, Subcommand};
use hearth_core::meals::{MealEntry, MealPlanStore};

use super::week_start;
use crate::report::ActionResult;
use crate::{render, AppError, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum MealCommands {
    /// Meal plan of one week
    Show(WeekArgs),
    /// Every plan of the selected family
    List,
    /// Adds a recipe or a free-text meal to a day
    Add(MealAddArgs),
    /// Removes one entry from a day and meal type
    Remove(MealRemoveArgs),
    /// Sets or clears the week's notes
    Notes(MealNotesArgs),
}

#[derive(Args, Debug)]
pub struct WeekArgs {
    /// Any day of the week; defaults to the current week
    #[arg(long)]
    pub week: Option<NaiveDate>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("entry").required(true).args(["recipe", "custom"])))]
pub struct MealAddArgs {
    pub day: NaiveDate,
    /// breakfast, lunch, dinner, snack...
    pub meal_type: String,
    #[arg(long)]
    pub recipe: Option<String>,
    /// Free-text meal name
    #[arg(long)]
    pub custom: Option<String>,
}

#[derive(Args, Debug)]
pub struct MealRemoveArgs {
    pub day: NaiveDate,
    pub meal_type: String,
    /// Position within the day and meal type
    #[arg(default_value_t = 0)]
    pub index: usize,
}

#[derive(Args, Debug)]
pub struct MealNotesArgs {
    #[command(flatten)]
    pub week: WeekArgs,
    /// New notes; omit to clear
    pub notes: Option<String>,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &MealCommands,
    format: OutputFormat,
) -> Result<()> {
    let store = MealPlanStore::new(context.database()?);
    let family_id = context.family_id()?;
    match command {
        MealCommands::Show(args) => {
            let week = week_start(args.week.unwrap_or_else(|| context.today()));
            render(&store.get_or_create(&family_id, week)?, format)
        }
        MealCommands::List => render(&store.plans_for_family(&family_id)?, format),
        MealCommands::Add(args) => {
            let entry = meal_entry(args)?;
            let plan = store.add_meal(
                &family_id,
                week_start(args.day),
                args.day,
                &args.meal_type,
                entry,
            )?;
            render(&plan, format)
        }
        MealCommands::Remove(args) => {
            let week = week_start(args.day);
            let plan = store
                .plan_for_week(&family_id, week)?
                .ok_or_else(|| AppError::MissingResource(format!("meal plan for week {week}")))?;
            let plan = store.remove_meal(&plan.meal_plan_id, args.day, &args.meal_type, args.index)?;
            render(&plan, format)
        }
        MealCommands::Notes(args) => {
            let week = week_start(args.week.week.unwrap_or_else(|| context.today()));
            let plan = store.get_or_create(&family_id, week)?;
            store.set_notes(&plan.meal_plan_id, args.notes.as_deref())?;
            render(
                &ActionResult::ok(format!("notes updated for week {week}")),
                format,
            )
        }
    }
}

fn meal_entry(args: &MealAddArgs) -> Result<MealEntry> {
    match (&args.recipe, &args.custom) {
        (Some(recipe_id), None) => Ok(MealEntry::Recipe(recipe_id.clone())),
        (None, Some(name)) => Ok(MealEntry::Custom(name.clone())),
        _ => Err(AppError::Failed(
            "pass exactly one of --recipe or --custom".to_string(),
        )),
    }
}
