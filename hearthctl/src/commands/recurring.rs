use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hearth_core::expenses::{ExpenseStore, NewRecurringExpense, PaymentMethod, RecurringUpdate};
use hearth_core::Frequency;

use crate::report::{ActionResult, RecurringCreated};
use crate::{render, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum RecurringCommands {
    /// Creates a template and fills in this year's occurrences
    Create(RecurringCreateArgs),
    /// Changes a template; the next due date is recomputed
    Update(RecurringUpdateArgs),
    /// Generates missing occurrences of every active template for this year
    Generate,
    /// Templates of the selected family
    List,
    /// Expenses generated from one template
    Occurrences(RecurringIdArgs),
    /// Deletes a template and the expenses generated from it
    Delete(RecurringIdArgs),
}

#[derive(Args, Debug)]
pub struct RecurringCreateArgs {
    /// Amount such as 1250.00
    pub amount: String,
    pub description: String,
    /// Category id
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value_t = Frequency::Monthly)]
    pub frequency: Frequency,
    /// Defaults to today
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long, default_value_t = PaymentMethod::CreditCard)]
    pub payment: PaymentMethod,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecurringUpdateArgs {
    pub recurring_id: String,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub frequency: Option<Frequency>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// true or false
    #[arg(long)]
    pub active: Option<bool>,
    #[arg(long)]
    pub payment: Option<PaymentMethod>,
}

#[derive(Args, Debug)]
pub struct RecurringIdArgs {
    pub recurring_id: String,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &RecurringCommands,
    format: OutputFormat,
) -> Result<()> {
    let store = ExpenseStore::new(context.database()?);
    match command {
        RecurringCommands::Create(args) => {
            let template = NewRecurringExpense {
                category_id: args.category.clone(),
                amount: args.amount.clone(),
                description: args.description.clone(),
                notes: args.notes.clone(),
                frequency: args.frequency,
                start_date: args.start.unwrap_or_else(|| context.today()),
                end_date: args.end,
                payment_method: args.payment,
            };
            let (recurring, report) =
                store.create_recurring(&context.family_id()?, &template, context.today())?;
            render(&RecurringCreated { recurring, report }, format)
        }
        RecurringCommands::Update(args) => {
            let update = RecurringUpdate {
                amount: args.amount.clone(),
                description: args.description.clone(),
                notes: args.notes.clone(),
                frequency: args.frequency,
                start_date: args.start,
                end_date: args.end,
                is_active: args.active,
                payment_method: args.payment,
            };
            render(&store.update_recurring(&args.recurring_id, &update)?, format)
        }
        RecurringCommands::Generate => {
            let report = store.generate_for_family(&context.family_id()?, context.today())?;
            render(&report, format)
        }
        RecurringCommands::List => {
            render(&store.recurring_for_family(&context.family_id()?)?, format)
        }
        RecurringCommands::Occurrences(args) => {
            render(&store.expenses_for_recurring(&args.recurring_id)?, format)
        }
        RecurringCommands::Delete(args) => {
            store.delete_recurring(&args.recurring_id)?;
            render(
                &ActionResult::ok(format!("recurring expense {} deleted", args.recurring_id)),
                format,
            )
        }
    }
}
