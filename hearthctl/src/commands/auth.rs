use clap::{Args, Subcommand};
use hearth_core::api::Registration;

use crate::{render, AppError, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Exchanges credentials for access and refresh tokens
    Login(LoginArgs),
    /// Creates a backend account
    Register(RegisterArgs),
    /// Profile of the token's user
    Profile,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub email: String,
    /// Falls back to HEARTH_PASSWORD
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    pub email: String,
    /// Falls back to HEARTH_PASSWORD
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &AuthCommands,
    format: OutputFormat,
) -> Result<()> {
    let client = context.api_client()?;
    let runtime = context.runtime()?;
    match command {
        AuthCommands::Login(args) => {
            let password = password(args.password.as_deref())?;
            let tokens = runtime.block_on(client.login(&args.email, &password))?;
            render(&tokens, format)
        }
        AuthCommands::Register(args) => {
            let password = password(args.password.as_deref())?;
            let registration = Registration {
                email: &args.email,
                password: &password,
                first_name: args.first_name.as_deref(),
                last_name: args.last_name.as_deref(),
            };
            let tokens = runtime.block_on(client.register(&registration))?;
            render(&tokens, format)
        }
        AuthCommands::Profile => {
            if client.token().is_none() {
                return Err(AppError::MissingResource(
                    "no token, pass --token or set HEARTH_TOKEN".to_string(),
                ));
            }
            let profile = runtime.block_on(client.profile())?;
            render(&profile, format)
        }
    }
}

fn password(provided: Option<&str>) -> Result<String> {
    provided
        .map(str::to_string)
        .or_else(|| std::env::var("HEARTH_PASSWORD").ok())
        .filter(|password| !password.is_empty())
        .ok_or_else(|| {
            AppError::MissingResource("no password, pass --password or set HEARTH_PASSWORD".into())
        })
}
