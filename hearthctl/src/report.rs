use std::fmt;

use chrono::NaiveDate;
use hearth_core::api::AuthTokens;
use hearth_core::expenses::{
    format_cents, Budget, BudgetAlert, Expense, ExpenseCategory, FamilyGenerationReport,
    GenerationReport, RecurringExpense, SpendingStats,
};
use hearth_core::family::{Family, Invitation, Member};
use hearth_core::lists::{CompletedGroceryItem, FamilyList, GroceryCategory, ListItem};
use hearth_core::meals::{MealEntry, MealPlan, Recipe};
use hearth_core::oauth::{
    CloudFile, ConnectionOutcome, ConnectionStatus, ConnectorService, OAuthCallback, OAuthResult,
};
use hearth_core::Frequency;
use serde::Serialize;

use crate::commands::voice::VoiceStep;
use crate::DisplayFallback;

impl<T: DisplayFallback> DisplayFallback for Vec<T> {
    fn display(&self) -> String {
        if self.is_empty() {
            return "(none)".to_string();
        }
        self.iter()
            .map(DisplayFallback::display)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DisplayFallback for serde_json::Value {
    fn display(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub status: String,
    pub detail: String,
}

impl ActionResult {
    pub(crate) fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            detail: detail.into(),
        }
    }
}

impl DisplayFallback for ActionResult {
    fn display(&self) -> String {
        self.detail.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct DueReport {
    pub start: String,
    pub frequency: Frequency,
    pub next_due_date: NaiveDate,
}

impl DisplayFallback for DueReport {
    fn display(&self) -> String {
        format!(
            "{start} ({frequency}) -> next due {next}",
            start = self.start,
            frequency = self.frequency,
            next = self.next_due_date
        )
    }
}

#[derive(Debug, Serialize)]
pub struct HealthEntry {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub enum CheckStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Warn => "WARN",
            CheckStatus::Error => "ERROR",
        };
        write!(f, "{}", label)
    }
}

impl HealthEntry {
    pub(crate) fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    pub(crate) fn warn(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }

    pub(crate) fn error(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Error,
            detail: detail.into(),
        }
    }
}

impl DisplayFallback for HealthEntry {
    fn display(&self) -> String {
        format!(
            "[{status}] {name}: {detail}",
            status = self.status,
            name = self.name,
            detail = self.detail
        )
    }
}

#[derive(Debug, Serialize)]
pub struct FamilyCreated {
    pub family: Family,
    pub owner: Member,
}

impl DisplayFallback for FamilyCreated {
    fn display(&self) -> String {
        format!(
            "{}\nowner: {}",
            self.family.display(),
            self.owner.display()
        )
    }
}

impl DisplayFallback for Family {
    fn display(&self) -> String {
        format!("{} {}", self.family_id, self.name)
    }
}

impl DisplayFallback for Member {
    fn display(&self) -> String {
        format!(
            "{id} {label} <{email}> [{role}]",
            id = self.member_id,
            label = self.label(),
            email = self.user_email,
            role = self.role
        )
    }
}

impl DisplayFallback for Invitation {
    fn display(&self) -> String {
        format!(
            "{id} {email} [{role}] {status}, expires {expires}\n  token: {token}",
            id = self.invitation_id,
            email = self.email,
            role = self.role,
            status = self.status,
            expires = self.expires_at.format("%Y-%m-%d %H:%M UTC"),
            token = self.token
        )
    }
}

impl DisplayFallback for FamilyList {
    fn display(&self) -> String {
        let archived = if self.archived { " (archived)" } else { "" };
        format!(
            "{id} {name} [{kind}]{archived}",
            id = self.list_id,
            name = self.name,
            kind = self.list_type.label()
        )
    }
}

impl DisplayFallback for ListItem {
    fn display(&self) -> String {
        let mark = if self.completed { "x" } else { " " };
        let mut line = format!("[{mark}] {} {}", self.item_id, self.name);
        if let Some(quantity) = &self.quantity {
            line.push_str(&format!(" ({quantity})"));
        }
        if let Some(due) = self.due_date {
            line.push_str(&format!(" due {due}"));
        }
        line
    }
}

#[derive(Debug, Serialize)]
pub struct ListDetail {
    pub list: FamilyList,
    pub items: Vec<ListItem>,
}

impl DisplayFallback for ListDetail {
    fn display(&self) -> String {
        let mut lines = vec![self.list.display()];
        lines.extend(self.items.iter().map(|item| format!("  {}", item.display())));
        lines.join("\n")
    }
}

impl DisplayFallback for GroceryCategory {
    fn display(&self) -> String {
        format!("{} {}", self.category_id, self.name)
    }
}

impl DisplayFallback for CompletedGroceryItem {
    fn display(&self) -> String {
        let when = self
            .completed_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        format!(
            "{when} {item} from {list}",
            item = self.item_name,
            list = self.list_name
        )
    }
}

impl DisplayFallback for Recipe {
    fn display(&self) -> String {
        let mut line = format!("{} {}", self.recipe_id, self.title);
        if let Some(minutes) = self.total_time_minutes() {
            line.push_str(&format!(" ({minutes} min)"));
        }
        if !self.ingredients.is_empty() {
            line.push_str(&format!("\n  ingredients: {}", self.ingredients.join(", ")));
        }
        line
    }
}

impl DisplayFallback for MealPlan {
    fn display(&self) -> String {
        let mut lines = vec![format!(
            "{} week of {}",
            self.meal_plan_id, self.week_start_date
        )];
        for (day, meal_type, entries) in self.meals.iter() {
            let names: Vec<String> = entries
                .iter()
                .map(|entry| match entry {
                    MealEntry::Recipe(id) => format!("recipe {id}"),
                    MealEntry::Custom(name) => name.clone(),
                })
                .collect();
            lines.push(format!("  {day} {meal_type}: {}", names.join(", ")));
        }
        if let Some(notes) = &self.notes {
            lines.push(format!("  notes: {notes}"));
        }
        lines.join("\n")
    }
}

impl DisplayFallback for ExpenseCategory {
    fn display(&self) -> String {
        format!(
            "{} {} {}",
            self.category_id,
            self.icon.as_deref().unwrap_or("-"),
            self.name
        )
    }
}

impl DisplayFallback for Expense {
    fn display(&self) -> String {
        let recurring = if self.is_recurring() { " (recurring)" } else { "" };
        format!(
            "{date} {amount:>10} {description}{recurring}",
            date = self.expense_date,
            amount = self.amount,
            description = self.description
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseList {
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub total: String,
    pub expenses: Vec<Expense>,
}

impl ExpenseList {
    pub(crate) fn new(from: NaiveDate, until: NaiveDate, expenses: Vec<Expense>) -> Self {
        let total_cents: i64 = expenses.iter().map(Expense::amount_cents).sum();
        Self {
            from,
            until,
            total: format_cents(total_cents),
            expenses,
        }
    }
}

impl DisplayFallback for ExpenseList {
    fn display(&self) -> String {
        let mut lines = vec![format!(
            "{} to {}: {} expenses, total {}",
            self.from,
            self.until,
            self.expenses.len(),
            self.total
        )];
        lines.extend(self.expenses.iter().map(DisplayFallback::display));
        lines.join("\n")
    }
}

impl DisplayFallback for SpendingStats {
    fn display(&self) -> String {
        let mut lines = vec![format!(
            "{period} {start} to {end}: {count} expenses, total {total}, average {average}",
            period = self.period,
            start = self.start_date,
            end = self.end_date,
            count = self.total_expenses,
            total = format_cents(self.total_cents),
            average = format_cents(self.average_cents)
        )];
        for (category, totals) in &self.by_category {
            lines.push(format!(
                "  {category}: {} ({})",
                format_cents(totals.total_cents),
                totals.count
            ));
        }
        lines.join("\n")
    }
}

impl DisplayFallback for RecurringExpense {
    fn display(&self) -> String {
        let state = if self.is_active { "active" } else { "inactive" };
        format!(
            "{id} {amount} {description} [{frequency}] next {next} ({state})",
            id = self.recurring_id,
            amount = self.amount,
            description = self.description,
            frequency = self.frequency,
            next = self.next_due_date
        )
    }
}

#[derive(Debug, Serialize)]
pub struct RecurringCreated {
    pub recurring: RecurringExpense,
    pub report: GenerationReport,
}

impl DisplayFallback for RecurringCreated {
    fn display(&self) -> String {
        let mut line = format!(
            "{}\ngenerated {} occurrence(s), skipped {}",
            self.recurring.display(),
            self.report.generated,
            self.report.skipped
        );
        if self.report.deactivated {
            line.push_str(", template ended");
        }
        line
    }
}

impl DisplayFallback for FamilyGenerationReport {
    fn display(&self) -> String {
        let mut lines = vec![format!(
            "generated {} expense(s) from {} recurring template(s)",
            self.generated, self.recurring_count
        )];
        lines.extend(self.errors.iter().map(|error| format!("  {error}")));
        lines.join("\n")
    }
}

impl DisplayFallback for Budget {
    fn display(&self) -> String {
        format!(
            "{id} {category} {amount} per {period} from {start} (alert at {threshold}%)",
            id = self.budget_id,
            category = self.category_id,
            amount = self.amount,
            period = self.period,
            start = self.start_date,
            threshold = self.alert_threshold
        )
    }
}

impl DisplayFallback for BudgetAlert {
    fn display(&self) -> String {
        format!(
            "[{status}] {category}: {spent} of {limit} ({percentage:.2}%)",
            status = self.status,
            category = self.category_name,
            spent = format_cents(self.spent_cents),
            limit = format_cents(self.limit_cents),
            percentage = self.percentage
        )
    }
}

impl DisplayFallback for VoiceStep {
    fn display(&self) -> String {
        let mut line = format!("> {}\n  {}", self.transcript, self.action);
        if let Some(message) = &self.message {
            line.push_str(&format!(": {message}"));
        }
        if let (Some(name), Some(list_type)) = (&self.list_name, self.list_type) {
            line.push_str(&format!(": {name} [{list_type}]"));
        }
        if let Some(list_id) = &self.list_id {
            line.push_str(&format!(" as {list_id}"));
        }
        line
    }
}

impl DisplayFallback for AuthTokens {
    fn display(&self) -> String {
        match &self.refresh {
            Some(refresh) => format!("access: {}\nrefresh: {refresh}", self.access),
            None => format!("access: {}", self.access),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkReport {
    pub link: String,
}

impl DisplayFallback for LinkReport {
    fn display(&self) -> String {
        self.link.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct CallbackReport {
    pub success: bool,
    pub message: Option<String>,
    pub service: Option<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

impl From<&OAuthCallback> for CallbackReport {
    fn from(callback: &OAuthCallback) -> Self {
        Self {
            success: callback.success,
            message: callback.message.clone(),
            service: callback.service.clone(),
            summary: callback.to_string(),
            connected: None,
        }
    }
}

impl DisplayFallback for CallbackReport {
    fn display(&self) -> String {
        match self.connected {
            Some(true) => format!("{} (confirmed)", self.summary),
            Some(false) => format!("{} (not yet connected)", self.summary),
            None => self.summary.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub service: ConnectorService,
    #[serde(flatten)]
    pub status: Option<ConnectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceStatus {
    pub(crate) fn new(service: ConnectorService, result: OAuthResult<ConnectionStatus>) -> Self {
        match result {
            Ok(status) => Self {
                service,
                status: Some(status),
                error: None,
            },
            Err(err) => Self {
                service,
                status: None,
                error: Some(err.to_string()),
            },
        }
    }
}

impl DisplayFallback for ServiceStatus {
    fn display(&self) -> String {
        let label = self.service.label();
        match (&self.status, &self.error) {
            (Some(status), _) if status.requires_reconnection => {
                format!("{label}: reconnect required")
            }
            (Some(status), _) if status.connected => match &status.email {
                Some(email) => format!("{label}: connected as {email}"),
                None => format!("{label}: connected"),
            },
            (Some(_), _) => format!("{label}: not connected"),
            (None, Some(error)) => format!("{label}: error: {error}"),
            (None, None) => format!("{label}: unknown"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConnectReport {
    pub service: ConnectorService,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConnectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl ConnectReport {
    pub(crate) fn new(service: ConnectorService, outcome: ConnectionOutcome) -> Self {
        match outcome {
            ConnectionOutcome::Connected(status) => Self {
                service,
                outcome: "connected",
                status: Some(status),
                attempts: None,
            },
            ConnectionOutcome::Pending { attempts } => Self {
                service,
                outcome: "pending",
                status: None,
                attempts: Some(attempts),
            },
        }
    }
}

impl DisplayFallback for CloudFile {
    fn display(&self) -> String {
        let kind = if self.is_folder { "dir " } else { "file" };
        let size = self.size.map(|bytes| format!(" ({bytes} bytes)")).unwrap_or_default();
        format!("{kind} {}  {}{size}", self.id, self.name)
    }
}

impl DisplayFallback for ConnectReport {
    fn display(&self) -> String {
        let label = self.service.label();
        match (&self.status, self.attempts) {
            (Some(status), _) => match &status.email {
                Some(email) => format!("{label} connected as {email}"),
                None => format!("{label} connected"),
            },
            (None, Some(attempts)) => format!(
                "{label} authorization not finished after {attempts} checks; run `connect status` later"
            ),
            (None, None) => format!("{label} {}", self.outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::OAuthError;

    #[test]
    fn empty_vectors_render_placeholder() {
        let entries: Vec<HealthEntry> = Vec::new();
        assert_eq!(entries.display(), "(none)");
        let entries = vec![
            HealthEntry::ok("database", "integrity ok"),
            HealthEntry::warn("api", "no token"),
        ];
        assert_eq!(
            entries.display(),
            "[OK] database: integrity ok\n[WARN] api: no token"
        );
    }

    #[test]
    fn service_status_flattens_connection_fields() {
        let row = ServiceStatus::new(
            ConnectorService::OneDrive,
            Ok(ConnectionStatus {
                connected: true,
                email: Some("ana@example.com".to_string()),
                ..ConnectionStatus::default()
            }),
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["service"], "onedrive");
        assert_eq!(json["connected"], true);
        assert!(json.get("error").is_none());
        assert_eq!(row.display(), "OneDrive: connected as ana@example.com");

        let file = CloudFile {
            id: "d-1".to_string(),
            name: "Lease.pdf".to_string(),
            size: Some(2048),
            ..CloudFile::default()
        };
        assert_eq!(file.display(), "file d-1  Lease.pdf (2048 bytes)");

        let failed = ServiceStatus::new(
            ConnectorService::Outlook,
            Err(OAuthError::ReconnectRequired(ConnectorService::Outlook)),
        );
        assert!(failed.display().starts_with("Outlook: error:"));
    }

    #[test]
    fn pending_connect_mentions_attempts() {
        let report = ConnectReport::new(
            ConnectorService::GoogleDrive,
            ConnectionOutcome::Pending { attempts: 20 },
        );
        assert_eq!(report.outcome, "pending");
        assert!(report.display().contains("after 20 checks"));
    }
}
