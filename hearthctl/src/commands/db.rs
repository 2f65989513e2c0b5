use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::report::{ActionResult, CheckStatus};
use crate::{render, AppError, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Creates the database file and schema
    Init,
    /// Copies the database with the SQLite online backup API
    Backup(BackupArgs),
    /// Checks config, data directory, database integrity and API settings
    Health,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    pub destination: PathBuf,
}

pub(crate) fn execute(context: &CtlContext, command: &DbCommands, format: OutputFormat) -> Result<()> {
    match command {
        DbCommands::Init => {
            context.database()?;
            render(
                &ActionResult::ok(format!(
                    "schema ready at {}",
                    context.database_path().display()
                )),
                format,
            )
        }
        DbCommands::Backup(args) => {
            if !context.database_path().exists() {
                return Err(AppError::MissingResource(format!(
                    "{} does not exist",
                    context.database_path().display()
                )));
            }
            context.database()?.backup_to(&args.destination)?;
            render(
                &ActionResult::ok(format!("backup written to {}", args.destination.display())),
                format,
            )
        }
        DbCommands::Health => {
            let report = context.health_check();
            render(&report, format)?;
            if report
                .iter()
                .any(|entry| matches!(entry.status, CheckStatus::Error))
            {
                return Err(AppError::MissingResource(
                    "one or more checks failed".to_string(),
                ));
            }
            Ok(())
        }
    }
}
