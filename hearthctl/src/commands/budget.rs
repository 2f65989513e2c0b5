use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hearth_core::expenses::{BudgetAlertStatus, ExpenseStore, NewBudget};
use hearth_core::Frequency;

use crate::{render, AppError, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum BudgetCommands {
    /// Sets a spending limit for a category
    Create(BudgetCreateArgs),
    /// Budgets of the selected family
    List,
    /// Budgets at or over their alert threshold
    Check(BudgetCheckArgs),
}

#[derive(Args, Debug)]
pub struct BudgetCreateArgs {
    /// Limit such as 400.00
    pub amount: String,
    /// Category id
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value_t = Frequency::Monthly)]
    pub period: Frequency,
    /// Defaults to today
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Warning threshold in percent (default 80)
    #[arg(long)]
    pub threshold: Option<u8>,
}

#[derive(Args, Debug)]
pub struct BudgetCheckArgs {
    /// Exit with an error when any budget is exceeded
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &BudgetCommands,
    format: OutputFormat,
) -> Result<()> {
    let store = ExpenseStore::new(context.database()?);
    let family_id = context.family_id()?;
    match command {
        BudgetCommands::Create(args) => {
            let budget = store.create_budget(
                &family_id,
                &NewBudget {
                    category_id: args.category.clone(),
                    amount: args.amount.clone(),
                    period: args.period,
                    start_date: args.start.unwrap_or_else(|| context.today()),
                    end_date: args.end,
                    alert_threshold: args.threshold,
                },
            )?;
            render(&budget, format)
        }
        BudgetCommands::List => render(&store.budgets_for_family(&family_id)?, format),
        BudgetCommands::Check(args) => {
            let alerts = store.check_budgets(&family_id, context.today())?;
            render(&alerts, format)?;
            let exceeded = alerts
                .iter()
                .filter(|alert| alert.status == BudgetAlertStatus::Exceeded)
                .count();
            if args.strict && exceeded > 0 {
                return Err(AppError::Failed(format!("{exceeded} budget(s) exceeded")));
            }
            Ok(())
        }
    }
}
