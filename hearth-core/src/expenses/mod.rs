//! Household expenses: categories, one-off entries, recurring templates and
//! budgets.

pub mod amount;
pub mod defaults;
pub mod models;
pub mod store;

pub use amount::{format_cents, parse_amount_cents};
pub use defaults::DEFAULT_EXPENSE_CATEGORIES;
pub use models::{
    Budget, BudgetAlert, BudgetAlertStatus, CategoryTotal, Expense, ExpenseCategory,
    FamilyGenerationReport, GenerationReport, NewBudget, NewExpense, NewRecurringExpense,
    PaymentMethod, RecurringExpense, RecurringUpdate, SpendingStats,
};
pub use store::ExpenseStore;
