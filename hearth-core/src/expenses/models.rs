use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::amount::parse_amount_cents;
use crate::recurrence::{Frequency, RecurrenceRule};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    CreditCard,
    DebitCard,
    BankTransfer,
    ETransfer,
    Check,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::ETransfer => "e_transfer",
            PaymentMethod::Check => "check",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "e_transfer" => Ok(PaymentMethod::ETransfer),
            "check" => Ok(PaymentMethod::Check),
            "other" => Ok(PaymentMethod::Other),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

fn to_utc(value: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
    value.map(|dt| Utc.from_utc_datetime(&dt))
}

fn frequency_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Frequency> {
    row.get::<_, String>(column)?
        .parse()
        .map_err(|err: crate::recurrence::RecurrenceError| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategory {
    pub category_id: String,
    pub family_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: String,
    pub position: i64,
    pub is_default: bool,
}

impl ExpenseCategory {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            category_id: row.get("category_id")?,
            family_id: row.get("family_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            icon: row.get("icon")?,
            color: row.get("color")?,
            position: row.get("position")?,
            is_default: row.get::<_, i64>("is_default")? != 0,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExpense {
    pub category_id: String,
    pub amount: String,
    pub description: String,
    pub notes: Option<String>,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub expense_id: String,
    pub family_id: String,
    pub category_id: String,
    pub amount: String,
    pub description: String,
    pub notes: Option<String>,
    pub expense_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub recurring_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            expense_id: row.get("expense_id")?,
            family_id: row.get("family_id")?,
            category_id: row.get("category_id")?,
            amount: row.get("amount")?,
            description: row.get("description")?,
            notes: row.get("notes")?,
            expense_date: row.get("expense_date")?,
            payment_method: row
                .get::<_, String>("payment_method")?
                .parse()
                .unwrap_or_default(),
            recurring_id: row.get("recurring_id")?,
            created_at: to_utc(row.get("created_at")?),
        })
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_id.is_some()
    }

    /// Amount in cents; unparseable amounts count as zero.
    pub fn amount_cents(&self) -> i64 {
        parse_amount_cents(&self.amount).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRecurringExpense {
    pub category_id: String,
    pub amount: String,
    pub description: String,
    pub notes: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Partial update of a template. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecurringUpdate {
    pub amount: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringExpense {
    pub recurring_id: String,
    pub family_id: String,
    pub category_id: String,
    pub amount: String,
    pub description: String,
    pub notes: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_due_date: NaiveDate,
    pub is_active: bool,
    pub payment_method: PaymentMethod,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecurringExpense {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            recurring_id: row.get("recurring_id")?,
            family_id: row.get("family_id")?,
            category_id: row.get("category_id")?,
            amount: row.get("amount")?,
            description: row.get("description")?,
            notes: row.get("notes")?,
            frequency: frequency_column(row, "frequency")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            next_due_date: row.get("next_due_date")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            payment_method: row
                .get::<_, String>("payment_method")?
                .parse()
                .unwrap_or_default(),
            updated_at: to_utc(row.get("updated_at")?),
        })
    }

    pub fn rule(&self) -> RecurrenceRule {
        RecurrenceRule::new(self.frequency, self.start_date)
    }
}

/// Outcome of one generation pass over a single template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationReport {
    pub generated: usize,
    pub skipped: usize,
    pub next_due_date: Option<NaiveDate>,
    pub deactivated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FamilyGenerationReport {
    pub generated: usize,
    pub recurring_count: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBudget {
    pub category_id: String,
    pub amount: String,
    pub period: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: Option<u8>,
}

pub const DEFAULT_ALERT_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub budget_id: String,
    pub family_id: String,
    pub category_id: String,
    pub amount: String,
    pub period: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: u8,
    pub is_active: bool,
}

impl Budget {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            budget_id: row.get("budget_id")?,
            family_id: row.get("family_id")?,
            category_id: row.get("category_id")?,
            amount: row.get("amount")?,
            period: frequency_column(row, "period")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            alert_threshold: row.get("alert_threshold")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
        })
    }

    pub fn limit_cents(&self) -> i64 {
        parse_amount_cents(&self.amount).unwrap_or(0)
    }

    /// Percentage of the limit spent, rounded to two decimals. Zero limits
    /// report zero.
    pub fn percentage_spent(&self, spent_cents: i64) -> f64 {
        let limit = self.limit_cents();
        if limit <= 0 {
            return 0.0;
        }
        let raw = spent_cents as f64 / limit as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    /// Compares the exact ratio in cents; the rounded percentage is for
    /// display only.
    pub fn alert_for(&self, spent_cents: i64) -> Option<BudgetAlertStatus> {
        let limit = i128::from(self.limit_cents());
        if limit <= 0 {
            return None;
        }
        let spent = i128::from(spent_cents) * 100;
        if spent >= limit * 100 {
            Some(BudgetAlertStatus::Exceeded)
        } else if spent >= i128::from(self.alert_threshold) * limit {
            Some(BudgetAlertStatus::Warning)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAlertStatus {
    Exceeded,
    Warning,
}

impl fmt::Display for BudgetAlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BudgetAlertStatus::Exceeded => "exceeded",
            BudgetAlertStatus::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAlert {
    pub budget_id: String,
    pub category_name: String,
    pub status: BudgetAlertStatus,
    pub percentage: f64,
    pub spent_cents: i64,
    pub limit_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub count: usize,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendingStats {
    pub period: Frequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_expenses: usize,
    pub total_cents: i64,
    pub average_cents: i64,
    pub by_category: BTreeMap<String, CategoryTotal>,
}

impl SpendingStats {
    pub fn empty(period: Frequency, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            period,
            start_date,
            end_date,
            total_expenses: 0,
            total_cents: 0,
            average_cents: 0,
            by_category: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, category_name: &str, amount_cents: i64) {
        self.total_expenses += 1;
        self.total_cents = self.total_cents.saturating_add(amount_cents);
        let entry = self.by_category.entry(category_name.to_string()).or_default();
        entry.count += 1;
        entry.total_cents = entry.total_cents.saturating_add(amount_cents);
        self.average_cents =
            (self.total_cents as f64 / self.total_expenses as f64).round() as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(amount: &str, threshold: u8) -> Budget {
        Budget {
            budget_id: "bud-1".into(),
            family_id: "fam-1".into(),
            category_id: "cat-1".into(),
            amount: amount.into(),
            period: Frequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            alert_threshold: threshold,
            is_active: true,
        }
    }

    #[test]
    fn budget_thresholds() {
        let b = budget("200.00", 80);
        assert_eq!(b.alert_for(15_000), None);
        assert_eq!(b.alert_for(16_000), Some(BudgetAlertStatus::Warning));
        assert_eq!(b.alert_for(20_000), Some(BudgetAlertStatus::Exceeded));
        assert_eq!(b.percentage_spent(6_667), 33.34);
    }

    #[test]
    fn just_below_the_limit_is_a_warning() {
        let b = budget("1000.00", 80);
        assert_eq!(b.percentage_spent(99_996), 100.0);
        assert_eq!(b.alert_for(99_996), Some(BudgetAlertStatus::Warning));
        assert_eq!(b.alert_for(100_000), Some(BudgetAlertStatus::Exceeded));

        let b = budget("100.00", 80);
        assert_eq!(b.alert_for(7_999), None);
        assert_eq!(b.alert_for(8_000), Some(BudgetAlertStatus::Warning));
    }

    #[test]
    fn stats_totals_saturate() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut stats = SpendingStats::empty(Frequency::Monthly, day, day);
        stats.record("Other", i64::MAX - 1);
        stats.record("Other", i64::MAX - 1);
        assert_eq!(stats.total_cents, i64::MAX);
        assert_eq!(stats.by_category["Other"].total_cents, i64::MAX);
    }

    #[test]
    fn zero_limit_never_alerts() {
        let b = budget("0", 80);
        assert_eq!(b.percentage_spent(5_000), 0.0);
        assert_eq!(b.alert_for(5_000), None);
    }

    #[test]
    fn stats_average_rounds() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut stats = SpendingStats::empty(Frequency::Monthly, day, day);
        stats.record("Food & Dining", 1000);
        stats.record("Food & Dining", 1001);
        stats.record("Travel", 0);
        assert_eq!(stats.total_cents, 2001);
        assert_eq!(stats.average_cents, 667);
        assert_eq!(stats.by_category["Food & Dining"].count, 2);
    }
}
