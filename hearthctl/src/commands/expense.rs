use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hearth_core::expenses::{ExpenseStore, NewExpense, PaymentMethod};
use hearth_core::recurrence::period_window;
use hearth_core::Frequency;

use crate::report::{ActionResult, ExpenseList};
use crate::{render, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Expense categories of the selected family
    Categories,
    /// Records an expense
    Add(ExpenseAddArgs),
    /// Expenses in a date range, newest first
    List(ExpenseListArgs),
    /// Spending totals for the period containing today
    Stats(StatsArgs),
    /// Deletes an expense
    Delete(ExpenseIdArgs),
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    /// Amount such as 12.50
    pub amount: String,
    pub description: String,
    /// Category id
    #[arg(long)]
    pub category: String,
    /// Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value_t = PaymentMethod::CreditCard)]
    pub payment: PaymentMethod,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExpenseListArgs {
    /// Defaults to the first day of the current month
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Defaults to the last day of the current month
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// daily, weekly, monthly or yearly
    #[arg(long, default_value_t = Frequency::Monthly)]
    pub period: Frequency,
}

#[derive(Args, Debug)]
pub struct ExpenseIdArgs {
    pub expense_id: String,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &ExpenseCommands,
    format: OutputFormat,
) -> Result<()> {
    let store = ExpenseStore::new(context.database()?);
    match command {
        ExpenseCommands::Categories => {
            let family_id = context.family_id()?;
            store.ensure_default_categories(&family_id)?;
            render(&store.categories(&family_id)?, format)
        }
        ExpenseCommands::Add(args) => {
            let expense = store.create_expense(
                &context.family_id()?,
                &NewExpense {
                    category_id: args.category.clone(),
                    amount: args.amount.clone(),
                    description: args.description.clone(),
                    notes: args.notes.clone(),
                    expense_date: args.date.unwrap_or_else(|| context.today()),
                    payment_method: args.payment,
                },
            )?;
            render(&expense, format)
        }
        ExpenseCommands::List(args) => {
            let (month_start, month_end) = period_window(Frequency::Monthly, context.today());
            let from = args.from.unwrap_or(month_start);
            let until = args.until.unwrap_or(month_end);
            let expenses = store.expenses_between(&context.family_id()?, from, until)?;
            render(&ExpenseList::new(from, until, expenses), format)
        }
        ExpenseCommands::Stats(args) => {
            let stats = store.stats(&context.family_id()?, args.period, context.today())?;
            render(&stats, format)
        }
        ExpenseCommands::Delete(args) => {
            store.delete_expense(&args.expense_id)?;
            render(
                &ActionResult::ok(format!("expense {} deleted", args.expense_id)),
                format,
            )
        }
    }
}
