use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{error, info, warn};

use super::amount::{format_cents, parse_amount_cents};
use super::defaults::seed_default_categories;
use super::models::{
    Budget, BudgetAlert, Expense, ExpenseCategory, FamilyGenerationReport, GenerationReport,
    NewBudget, NewExpense, NewRecurringExpense, RecurringExpense, RecurringUpdate, SpendingStats,
    DEFAULT_ALERT_THRESHOLD,
};
use crate::recurrence::{next_due_date, occurrences_between, period_window, Frequency};
use crate::store::{bool_to_sql, new_id, Database, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct ExpenseStore {
    db: Database,
}

impl ExpenseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn categories(&self, family_id: &str) -> StoreResult<Vec<ExpenseCategory>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM expense_categories WHERE family_id = ?1 ORDER BY position ASC, name ASC",
        )?;
        let rows = stmt
            .query_map([family_id], |row| ExpenseCategory::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn ensure_default_categories(&self, family_id: &str) -> StoreResult<usize> {
        let conn = self.db.open()?;
        let inserted = seed_default_categories(&conn, family_id)?;
        if inserted > 0 {
            info!(target: "expenses", %family_id, inserted, "default categories added");
        }
        Ok(inserted)
    }

    pub fn create_expense(&self, family_id: &str, expense: &NewExpense) -> StoreResult<Expense> {
        let amount = normalized_amount(&expense.amount)?;
        let description = non_empty("description", &expense.description)?;
        let conn = self.db.open()?;
        ensure_category(&conn, family_id, &expense.category_id)?;
        let expense_id = new_id("exp");
        conn.execute(
            "INSERT INTO expenses(expense_id, family_id, category_id, amount, description, notes, expense_date, payment_method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                expense_id,
                family_id,
                expense.category_id,
                amount,
                description,
                expense.notes,
                expense.expense_date,
                expense.payment_method.as_str(),
            ],
        )?;
        fetch_expense(&conn, &expense_id)?.ok_or_else(|| StoreError::not_found("expense", expense_id))
    }

    pub fn fetch_expense(&self, expense_id: &str) -> StoreResult<Option<Expense>> {
        let conn = self.db.open()?;
        fetch_expense(&conn, expense_id)
    }

    /// Expenses dated within `[from, until]`, newest first.
    pub fn expenses_between(
        &self,
        family_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> StoreResult<Vec<Expense>> {
        let conn = self.db.open()?;
        expenses_between(&conn, family_id, None, from, until)
    }

    pub fn expenses_for_recurring(&self, recurring_id: &str) -> StoreResult<Vec<Expense>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM expenses WHERE recurring_id = ?1 ORDER BY expense_date ASC",
        )?;
        let rows = stmt
            .query_map([recurring_id], |row| Expense::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete_expense(&self, expense_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute("DELETE FROM expenses WHERE expense_id = ?1", [expense_id])?;
        if affected == 0 {
            return Err(StoreError::not_found("expense", expense_id));
        }
        Ok(())
    }

    /// Stores a template and fills in its occurrences from `start_date`
    /// through the earlier of `end_date` and the end of `today`'s year.
    pub fn create_recurring(
        &self,
        family_id: &str,
        template: &NewRecurringExpense,
        today: NaiveDate,
    ) -> StoreResult<(RecurringExpense, GenerationReport)> {
        let amount = normalized_amount(&template.amount)?;
        let description = non_empty("description", &template.description)?;
        if let Some(end_date) = template.end_date {
            if end_date < template.start_date {
                return Err(StoreError::invalid("end_date", "must not precede start_date"));
            }
        }

        let mut conn = self.db.open()?;
        ensure_category(&conn, family_id, &template.category_id)?;
        let recurring_id = new_id("rec");
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO recurring_expenses(recurring_id, family_id, category_id, amount, description, notes,
                                            frequency, start_date, end_date, next_due_date, payment_method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                recurring_id,
                family_id,
                template.category_id,
                amount,
                description,
                template.notes,
                template.frequency.as_str(),
                template.start_date,
                template.end_date,
                next_due_date(template.start_date, template.frequency),
                template.payment_method.as_str(),
            ],
        )?;
        let recurring = fetch_recurring(&tx, &recurring_id)?
            .ok_or_else(|| StoreError::not_found("recurring expense", &recurring_id))?;
        let report = generate_occurrences(&tx, &recurring, recurring.start_date, year_end(today))?;
        tx.commit()?;

        info!(
            target: "expenses",
            %recurring_id,
            frequency = %template.frequency,
            generated = report.generated,
            "recurring expense created"
        );
        let recurring = fetch_recurring(&conn, &recurring_id)?
            .ok_or_else(|| StoreError::not_found("recurring expense", recurring_id))?;
        Ok((recurring, report))
    }

    pub fn fetch_recurring(&self, recurring_id: &str) -> StoreResult<Option<RecurringExpense>> {
        let conn = self.db.open()?;
        fetch_recurring(&conn, recurring_id)
    }

    pub fn recurring_for_family(&self, family_id: &str) -> StoreResult<Vec<RecurringExpense>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM recurring_expenses WHERE family_id = ?1 ORDER BY next_due_date ASC",
        )?;
        let rows = stmt
            .query_map([family_id], |row| RecurringExpense::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Applies the update and recomputes `next_due_date` from the resulting
    /// start date and frequency, whatever was stored before.
    pub fn update_recurring(
        &self,
        recurring_id: &str,
        update: &RecurringUpdate,
    ) -> StoreResult<RecurringExpense> {
        let conn = self.db.open()?;
        let current = fetch_recurring(&conn, recurring_id)?
            .ok_or_else(|| StoreError::not_found("recurring expense", recurring_id))?;
        let amount = match &update.amount {
            Some(amount) => normalized_amount(amount)?,
            None => current.amount.clone(),
        };
        let description = match &update.description {
            Some(description) => non_empty("description", description)?.to_string(),
            None => current.description.clone(),
        };
        let frequency = update.frequency.unwrap_or(current.frequency);
        let start_date = update.start_date.unwrap_or(current.start_date);
        let end_date = update.end_date.or(current.end_date);
        if end_date.map_or(false, |end| end < start_date) {
            return Err(StoreError::invalid("end_date", "must not precede start_date"));
        }

        conn.execute(
            "UPDATE recurring_expenses
             SET amount = ?2, description = ?3, notes = ?4, frequency = ?5, start_date = ?6,
                 end_date = ?7, next_due_date = ?8, is_active = ?9, payment_method = ?10,
                 updated_at = CURRENT_TIMESTAMP
             WHERE recurring_id = ?1",
            params![
                recurring_id,
                amount,
                description,
                update.notes.as_ref().or(current.notes.as_ref()),
                frequency.as_str(),
                start_date,
                end_date,
                next_due_date(start_date, frequency),
                bool_to_sql(update.is_active.unwrap_or(current.is_active)),
                update.payment_method.unwrap_or(current.payment_method).as_str(),
            ],
        )?;
        fetch_recurring(&conn, recurring_id)?
            .ok_or_else(|| StoreError::not_found("recurring expense", recurring_id))
    }

    pub fn delete_recurring(&self, recurring_id: &str) -> StoreResult<()> {
        let conn = self.db.open()?;
        let affected = conn.execute(
            "DELETE FROM recurring_expenses WHERE recurring_id = ?1",
            [recurring_id],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found("recurring expense", recurring_id));
        }
        Ok(())
    }

    /// Generates this year's occurrences for every active template of the
    /// family. A failing template is reported and does not stop the others.
    pub fn generate_for_family(
        &self,
        family_id: &str,
        today: NaiveDate,
    ) -> StoreResult<FamilyGenerationReport> {
        let mut conn = self.db.open()?;
        let templates: Vec<RecurringExpense> = {
            let mut stmt = conn.prepare(
                "SELECT * FROM recurring_expenses WHERE family_id = ?1 AND is_active = 1
                 ORDER BY next_due_date ASC",
            )?;
            let rows = stmt
                .query_map([family_id], |row| RecurringExpense::from_row(row))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut report = FamilyGenerationReport {
            recurring_count: templates.len(),
            ..FamilyGenerationReport::default()
        };
        for template in &templates {
            let from = template.rule().first_occurrence_in_year(today.year());
            let outcome = conn.transaction().map_err(StoreError::from).and_then(|tx| {
                let generated = generate_occurrences(&tx, template, from, year_end(today))?;
                tx.commit()?;
                Ok(generated)
            });
            match outcome {
                Ok(generated) => report.generated += generated.generated,
                Err(err) => {
                    error!(
                        target: "expenses",
                        recurring_id = %template.recurring_id,
                        error = %err,
                        "expense generation failed"
                    );
                    report.errors.push(format!(
                        "Error generating expenses for {}: {err}",
                        template.description
                    ));
                }
            }
        }
        info!(
            target: "expenses",
            %family_id,
            generated = report.generated,
            templates = report.recurring_count,
            "recurring expenses generated"
        );
        Ok(report)
    }

    /// Totals for the `period` window that contains `today`.
    pub fn stats(
        &self,
        family_id: &str,
        period: Frequency,
        today: NaiveDate,
    ) -> StoreResult<SpendingStats> {
        let conn = self.db.open()?;
        let (start, end) = period_window(period, today);
        let names = category_names(&conn, family_id)?;
        let mut stats = SpendingStats::empty(period, start, end);
        for expense in expenses_between(&conn, family_id, None, start, end)? {
            let category = names
                .get(&expense.category_id)
                .map(String::as_str)
                .unwrap_or("Uncategorized");
            stats.record(category, expense.amount_cents());
        }
        Ok(stats)
    }

    pub fn create_budget(&self, family_id: &str, budget: &NewBudget) -> StoreResult<Budget> {
        let amount = normalized_amount(&budget.amount)?;
        let threshold = budget.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);
        if threshold > 100 {
            return Err(StoreError::invalid("alert_threshold", "must be between 0 and 100"));
        }
        let conn = self.db.open()?;
        ensure_category(&conn, family_id, &budget.category_id)?;
        let budget_id = new_id("bud");
        conn.execute(
            "INSERT INTO budgets(budget_id, family_id, category_id, amount, period, start_date, end_date, alert_threshold)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                budget_id,
                family_id,
                budget.category_id,
                amount,
                budget.period.as_str(),
                budget.start_date,
                budget.end_date,
                threshold,
            ],
        )?;
        fetch_budget(&conn, &budget_id)?.ok_or_else(|| StoreError::not_found("budget", budget_id))
    }

    pub fn budgets_for_family(&self, family_id: &str) -> StoreResult<Vec<Budget>> {
        let conn = self.db.open()?;
        budgets_for_family(&conn, family_id)
    }

    /// Alerts for active budgets at or over their threshold in the current
    /// period window.
    pub fn check_budgets(&self, family_id: &str, today: NaiveDate) -> StoreResult<Vec<BudgetAlert>> {
        let conn = self.db.open()?;
        let names = category_names(&conn, family_id)?;
        let mut alerts = Vec::new();
        for budget in budgets_for_family(&conn, family_id)?
            .into_iter()
            .filter(|budget| budget.is_active)
        {
            let (start, end) = period_window(budget.period, today);
            let spent: i64 = expenses_between(&conn, family_id, Some(&budget.category_id), start, end)?
                .iter()
                .map(Expense::amount_cents)
                .fold(0, i64::saturating_add);
            if let Some(status) = budget.alert_for(spent) {
                alerts.push(BudgetAlert {
                    budget_id: budget.budget_id.clone(),
                    category_name: names
                        .get(&budget.category_id)
                        .cloned()
                        .unwrap_or_default(),
                    status,
                    percentage: budget.percentage_spent(spent),
                    spent_cents: spent,
                    limit_cents: budget.limit_cents(),
                });
            }
        }
        Ok(alerts)
    }
}

/// Inserts the missing occurrences of `template` in `[from, until]`, both
/// clipped to the template's own range, then advances `next_due_date` past
/// the last one. The template is deactivated once that passes `end_date`.
fn generate_occurrences(
    conn: &Connection,
    template: &RecurringExpense,
    from: NaiveDate,
    until: NaiveDate,
) -> StoreResult<GenerationReport> {
    let from = from.max(template.start_date);
    let until = template.end_date.map_or(until, |end| end.min(until));
    let mut report = GenerationReport::default();
    if from > until {
        warn!(
            target: "expenses",
            recurring_id = %template.recurring_id,
            %from,
            %until,
            "nothing to generate"
        );
        return Ok(report);
    }

    for date in occurrences_between(template.frequency, from, until) {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM expenses WHERE recurring_id = ?1 AND expense_date = ?2)",
            params![template.recurring_id, date],
            |row| row.get(0),
        )?;
        if exists {
            report.skipped += 1;
            continue;
        }
        conn.execute(
            "INSERT INTO expenses(expense_id, family_id, category_id, amount, description, notes,
                                  expense_date, payment_method, recurring_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new_id("exp"),
                template.family_id,
                template.category_id,
                template.amount,
                template.description,
                template.notes,
                date,
                template.payment_method.as_str(),
                template.recurring_id,
            ],
        )?;
        report.generated += 1;
    }
    if report.generated == 0 {
        return Ok(report);
    }

    let last: Option<NaiveDate> = conn.query_row(
        "SELECT MAX(expense_date) FROM expenses
         WHERE recurring_id = ?1 AND expense_date BETWEEN ?2 AND ?3",
        params![template.recurring_id, from, until],
        |row| row.get(0),
    )?;
    let Some(last) = last else {
        return Ok(report);
    };
    let next = next_due_date(last, template.frequency);
    if template.end_date.map_or(false, |end| next > end) {
        conn.execute(
            "UPDATE recurring_expenses SET is_active = 0, updated_at = CURRENT_TIMESTAMP
             WHERE recurring_id = ?1",
            [template.recurring_id.as_str()],
        )?;
        report.deactivated = true;
    } else {
        conn.execute(
            "UPDATE recurring_expenses SET next_due_date = ?2, updated_at = CURRENT_TIMESTAMP
             WHERE recurring_id = ?1",
            params![template.recurring_id, next],
        )?;
        report.next_due_date = Some(next);
    }
    Ok(report)
}

fn year_end(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today)
}

/// Twelve whole digits; the stored text column holds at most twenty characters.
const MAX_AMOUNT_CENTS: i64 = 99_999_999_999_999;

fn normalized_amount(amount: &str) -> StoreResult<String> {
    match parse_amount_cents(amount) {
        Some(cents) if cents < 0 => Err(StoreError::invalid("amount", "must not be negative")),
        Some(cents) if cents > MAX_AMOUNT_CENTS => Err(StoreError::invalid(
            "amount",
            format!("must not exceed {}", format_cents(MAX_AMOUNT_CENTS)),
        )),
        Some(cents) => Ok(format_cents(cents)),
        None => Err(StoreError::invalid(
            "amount",
            format!("`{amount}` is not a decimal amount"),
        )),
    }
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> StoreResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::invalid(field, "must not be empty"));
    }
    Ok(trimmed)
}

fn ensure_category(conn: &Connection, family_id: &str, category_id: &str) -> StoreResult<()> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT family_id FROM expense_categories WHERE category_id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .optional()?;
    match owner {
        Some(owner) if owner == family_id => Ok(()),
        Some(_) => Err(StoreError::invalid(
            "category_id",
            "category belongs to a different family",
        )),
        None => Err(StoreError::not_found("expense category", category_id)),
    }
}

fn category_names(conn: &Connection, family_id: &str) -> StoreResult<HashMap<String, String>> {
    let mut stmt =
        conn.prepare("SELECT category_id, name FROM expense_categories WHERE family_id = ?1")?;
    let names = stmt
        .query_map([family_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(names)
}

fn fetch_expense(conn: &Connection, expense_id: &str) -> StoreResult<Option<Expense>> {
    let expense = conn
        .query_row(
            "SELECT * FROM expenses WHERE expense_id = ?1",
            [expense_id],
            |row| Expense::from_row(row),
        )
        .optional()?;
    Ok(expense)
}

fn expenses_between(
    conn: &Connection,
    family_id: &str,
    category_id: Option<&str>,
    from: NaiveDate,
    until: NaiveDate,
) -> StoreResult<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM expenses
         WHERE family_id = ?1 AND expense_date BETWEEN ?2 AND ?3
           AND (?4 IS NULL OR category_id = ?4)
         ORDER BY expense_date DESC, created_at DESC",
    )?;
    let rows = stmt
        .query_map(params![family_id, from, until, category_id], |row| {
            Expense::from_row(row)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn fetch_recurring(conn: &Connection, recurring_id: &str) -> StoreResult<Option<RecurringExpense>> {
    let recurring = conn
        .query_row(
            "SELECT * FROM recurring_expenses WHERE recurring_id = ?1",
            [recurring_id],
            |row| RecurringExpense::from_row(row),
        )
        .optional()?;
    Ok(recurring)
}

fn fetch_budget(conn: &Connection, budget_id: &str) -> StoreResult<Option<Budget>> {
    let budget = conn
        .query_row(
            "SELECT * FROM budgets WHERE budget_id = ?1",
            [budget_id],
            |row| Budget::from_row(row),
        )
        .optional()?;
    Ok(budget)
}

fn budgets_for_family(conn: &Connection, family_id: &str) -> StoreResult<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM budgets WHERE family_id = ?1 ORDER BY start_date DESC, category_id",
    )?;
    let rows = stmt
        .query_map([family_id], |row| Budget::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
