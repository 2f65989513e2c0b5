use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use hearth_core::{
    load_hearth_config, ApiClient, AppContext, ContextHandle, Database, Frequency, HearthConfig,
};
use serde::Serialize;
use thiserror::Error;

pub mod commands;
mod report;

use commands::{
    auth::AuthCommands, budget::BudgetCommands, connect::ConnectCommands, db::DbCommands,
    expense::ExpenseCommands, family::FamilyCommands, list::ListCommands, meal::MealCommands,
    recipe::RecipeCommands, recurring::RecurringCommands, voice::VoiceArgs,
};
pub use report::{CheckStatus, DueReport, HealthEntry};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] hearth_core::ConfigError),
    #[error("store error: {0}")]
    Store(#[from] hearth_core::StoreError),
    #[error("api error: {0}")]
    Api(#[from] hearth_core::ApiError),
    #[error("connector error: {0}")]
    OAuth(#[from] hearth_core::OAuthError),
    #[error("date error: {0}")]
    Recurrence(#[from] hearth_core::RecurrenceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("required resource missing: {0}")]
    MissingResource(String),
    #[error("{0}")]
    Failed(String),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hearth household organizer control interface", long_about = None)]
pub struct Cli {
    /// Path to hearth.toml
    #[arg(long, default_value = "configs/hearth.toml")]
    pub config: PathBuf,
    /// Data directory override (replaces paths.data_dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Alternative path to the household database
    #[arg(long)]
    pub database: Option<PathBuf>,
    /// Family the command acts on
    #[arg(long)]
    pub family: Option<String>,
    /// Bearer token for the REST backend (falls back to HEARTH_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
    /// Date treated as today, YYYY-MM-DD
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Computes the next due date of a recurring rule
    Due(DueArgs),
    /// Families, members and invitations
    #[command(subcommand)]
    Family(FamilyCommands),
    /// Lists and list items
    #[command(subcommand)]
    List(ListCommands),
    /// Saved recipes
    #[command(subcommand)]
    Recipe(RecipeCommands),
    /// Weekly meal plans
    #[command(subcommand)]
    Meal(MealCommands),
    /// One-off expenses and spending stats
    #[command(subcommand)]
    Expense(ExpenseCommands),
    /// Recurring expense templates
    #[command(subcommand)]
    Recurring(RecurringCommands),
    /// Category budgets
    #[command(subcommand)]
    Budget(BudgetCommands),
    /// Feeds transcripts from stdin through the voice list flow
    Voice(VoiceArgs),
    /// Backend account operations
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Cloud connector authorization
    #[command(subcommand)]
    Connect(ConnectCommands),
    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommands),
    /// Prints a shell completion script
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct DueArgs {
    /// Start date, YYYY-MM-DD
    pub start: String,
    /// daily, weekly, monthly or yearly
    #[arg(long, default_value_t = Frequency::Monthly)]
    pub frequency: Frequency,
    /// Fall back to today's date when the start date is malformed
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Completions(args) => {
            let mut command = Cli::command();
            clap_complete::generate(args.shell, &mut command, "hearthctl", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Due(args) => {
            let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
            let report = due_report(args, today)?;
            return render(&report, cli.format);
        }
        _ => {}
    }

    let context = CtlContext::new(&cli)?;
    let format = cli.format;
    match &cli.command {
        Commands::Family(command) => commands::family::execute(&context, command, format),
        Commands::List(command) => commands::list::execute(&context, command, format),
        Commands::Recipe(command) => commands::recipe::execute(&context, command, format),
        Commands::Meal(command) => commands::meal::execute(&context, command, format),
        Commands::Expense(command) => commands::expense::execute(&context, command, format),
        Commands::Recurring(command) => commands::recurring::execute(&context, command, format),
        Commands::Budget(command) => commands::budget::execute(&context, command, format),
        Commands::Voice(args) => commands::voice::execute(&context, args, format),
        Commands::Auth(command) => commands::auth::execute(&context, command, format),
        Commands::Connect(command) => commands::connect::execute(&context, command, format),
        Commands::Db(command) => commands::db::execute(&context, command, format),
        Commands::Completions(_) | Commands::Due(_) => Ok(()),
    }
}

fn due_report(args: &DueArgs, today: NaiveDate) -> Result<DueReport> {
    let next_due_date = if args.lenient {
        hearth_core::recurrence::next_due_date_or_today(&args.start, args.frequency, today)
    } else {
        hearth_core::recurrence::next_due_date_str(&args.start, args.frequency)?
    };
    Ok(DueReport {
        start: args.start.trim().to_string(),
        frequency: args.frequency,
        next_due_date,
    })
}

fn render<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + DisplayFallback,
{
    match format {
        OutputFormat::Text => {
            println!("{}", value.display());
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
            Ok(())
        }
    }
}

trait DisplayFallback {
    fn display(&self) -> String;
}

/// Resolved configuration and paths for one invocation.
#[derive(Debug)]
pub(crate) struct CtlContext {
    config: HearthConfig,
    config_path: PathBuf,
    data_dir: PathBuf,
    database_path: PathBuf,
    selection: ContextHandle,
    token: Option<String>,
    today: NaiveDate,
}

impl CtlContext {
    fn new(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.clone();
        let config = load_hearth_config(&config_path)?;

        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| config.resolve_path(&config.paths.data_dir));
        let database_path = cli
            .database
            .clone()
            .unwrap_or_else(|| data_dir.join(&config.paths.database));

        let selection = ContextHandle::new(AppContext {
            family_id: cli.family.clone(),
            ..AppContext::default()
        });
        let token = cli
            .token
            .clone()
            .or_else(|| std::env::var("HEARTH_TOKEN").ok())
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            config,
            config_path,
            data_dir,
            database_path,
            selection,
            token,
            today: cli.today.unwrap_or_else(|| Local::now().date_naive()),
        })
    }

    pub(crate) fn config(&self) -> &HearthConfig {
        &self.config
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    pub(crate) fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Opens the household database, creating the schema on first use.
    pub(crate) fn database(&self) -> Result<Database> {
        let db = Database::builder()
            .path(&self.database_path)
            .create_if_missing(true)
            .build()?;
        db.initialize()?;
        Ok(db)
    }

    pub(crate) fn family_id(&self) -> Result<String> {
        self.selection.current().family_id.ok_or_else(|| {
            AppError::MissingResource("no family selected, pass --family".to_string())
        })
    }

    pub(crate) fn api_client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(&self.config.api)?;
        Ok(match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    pub(crate) fn runtime(&self) -> Result<tokio::runtime::Runtime> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime)
    }

    pub(crate) fn health_check(&self) -> Vec<HealthEntry> {
        vec![
            self.check_path("hearth.toml", &self.config_path),
            self.check_directory("data_dir", &self.data_dir),
            self.check_database("database", &self.database_path),
            self.check_api(),
        ]
    }

    fn check_path(&self, name: &str, path: &Path) -> HealthEntry {
        if path.exists() {
            HealthEntry::ok(name, format!("{}", path.display()))
        } else {
            HealthEntry::error(name, format!("{} missing", path.display()))
        }
    }

    fn check_directory(&self, name: &str, path: &Path) -> HealthEntry {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => HealthEntry::ok(name, format!("{}", path.display())),
            Ok(_) => HealthEntry::warn(
                name,
                format!("{} exists but is not a directory", path.display()),
            ),
            Err(_) => HealthEntry::warn(
                name,
                format!("{} missing (created on first write)", path.display()),
            ),
        }
    }

    fn check_database(&self, name: &str, path: &Path) -> HealthEntry {
        if !path.exists() {
            return HealthEntry::warn(
                name,
                format!("{} not initialised, run `db init`", path.display()),
            );
        }
        match Database::builder()
            .path(path)
            .read_only(true)
            .build()
            .and_then(|db| db.integrity_check())
        {
            Ok(result) if result.eq_ignore_ascii_case("ok") => {
                HealthEntry::ok(name, "integrity ok".to_string())
            }
            Ok(result) => HealthEntry::warn(name, format!("integrity_check: {result}")),
            Err(err) => HealthEntry::error(name, format!("failed to open: {err}")),
        }
    }

    fn check_api(&self) -> HealthEntry {
        match ApiClient::new(&self.config.api) {
            Ok(client) if self.token.is_some() => {
                HealthEntry::ok("api", format!("{} (token set)", client.base_url()))
            }
            Ok(client) => HealthEntry::warn("api", format!("{} (no token)", client.base_url())),
            Err(err) => HealthEntry::error("api", err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{FamilyStore, ListStore, ListType};
    use tempfile::TempDir;

    fn prepare_test_context(family: Option<&str>) -> (TempDir, CtlContext) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let configs_dir = root.join("configs");
        fs::create_dir_all(&configs_dir).unwrap();
        fs::copy("../configs/hearth.toml", configs_dir.join("hearth.toml")).unwrap();

        let data_dir = root.join("data");
        let cli = Cli {
            config: configs_dir.join("hearth.toml"),
            data_dir: Some(data_dir.clone()),
            database: None,
            family: family.map(str::to_string),
            token: None,
            today: NaiveDate::from_ymd_opt(2025, 3, 14),
            format: OutputFormat::Json,
            command: Commands::Db(DbCommands::Health),
        };
        let context = CtlContext::new(&cli).unwrap();
        (temp, context)
    }

    #[test]
    fn context_resolves_database_under_data_dir() {
        let (temp, context) = prepare_test_context(None);
        assert_eq!(
            context.database_path(),
            temp.path().join("data").join("hearth.sqlite")
        );
        assert_eq!(context.today(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert!(matches!(
            context.family_id(),
            Err(AppError::MissingResource(_))
        ));
    }

    #[test]
    fn health_check_flags_uninitialised_database() {
        let (_temp, context) = prepare_test_context(None);
        let report = context.health_check();
        let database = report.iter().find(|entry| entry.name == "database").unwrap();
        assert!(matches!(database.status, CheckStatus::Warn));

        context.database().unwrap();
        let report = context.health_check();
        let database = report.iter().find(|entry| entry.name == "database").unwrap();
        assert!(matches!(database.status, CheckStatus::Ok));
        assert!(report
            .iter()
            .all(|entry| !matches!(entry.status, CheckStatus::Error)));
    }

    #[test]
    fn stores_share_the_resolved_database() {
        let (_temp, context) = prepare_test_context(None);
        let (family, _) = FamilyStore::new(context.database().unwrap())
            .create_family("Rivera", "ana@example.com", Some("Ana"))
            .unwrap();

        let lists = ListStore::new(context.database().unwrap());
        lists
            .create_list(&family.family_id, "Weekend", ListType::Grocery, None)
            .unwrap();
        assert_eq!(lists.lists_for_family(&family.family_id, false).unwrap().len(), 1);
    }

    #[test]
    fn due_report_follows_month_end() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let strict = due_report(
            &DueArgs {
                start: "2024-01-31".to_string(),
                frequency: Frequency::Monthly,
                lenient: false,
            },
            today,
        )
        .unwrap();
        assert_eq!(strict.next_due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let malformed = DueArgs {
            start: "31/01/2024".to_string(),
            frequency: Frequency::Weekly,
            lenient: false,
        };
        assert!(matches!(
            due_report(&malformed, today),
            Err(AppError::Recurrence(_))
        ));

        let lenient = due_report(
            &DueArgs {
                lenient: true,
                ..malformed
            },
            today,
        )
        .unwrap();
        assert_eq!(lenient.next_due_date, today);
    }

    #[test]
    fn cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "hearthctl",
            "--family",
            "fam-1",
            "--format",
            "json",
            "list",
            "create",
            "Weekly shop",
            "--type",
            "grocery",
        ])
        .unwrap();
        assert_eq!(cli.family.as_deref(), Some("fam-1"));
        assert!(matches!(cli.command, Commands::List(_)));

        Cli::command().debug_assert();
    }
}
