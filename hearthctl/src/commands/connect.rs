use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use hearth_core::oauth::{
    CommandLauncher, ConnectionOutcome, ConnectorService, HttpConnectorBackend, OAuthCallback,
    OAuthFlow,
};

use crate::report::{CallbackReport, ConnectReport, LinkReport, ServiceStatus};
use crate::{render, CtlContext, OutputFormat, Result};

#[derive(Subcommand, Debug)]
pub enum ConnectCommands {
    /// Connection status of every cloud service, fetched concurrently
    Status(ConnectStatusArgs),
    /// Starts authorization, opens the browser and waits for the grant
    Start(ConnectStartArgs),
    /// Parses a deep-link callback and optionally confirms it with the backend
    Callback(CallbackArgs),
    /// Renders a deep-link callback
    Link(LinkArgs),
    /// Lists a folder of a connected drive (onedrive or googledrive)
    Files(FilesArgs),
}

#[derive(Args, Debug)]
pub struct ConnectStatusArgs {
    /// Only this service
    #[arg(long)]
    pub service: Option<ConnectorService>,
}

#[derive(Args, Debug)]
pub struct ConnectStartArgs {
    /// outlook, onedrive, googledrive or googlephotos
    pub service: ConnectorService,
    /// Program that opens the authorization URL
    #[arg(long, default_value = "xdg-open")]
    pub browser: PathBuf,
    /// Seconds between status checks (overrides oauth.poll_interval_seconds)
    #[arg(long)]
    pub interval: Option<u64>,
    /// Status checks before giving up (overrides oauth.poll_attempts)
    #[arg(long)]
    pub attempts: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CallbackArgs {
    pub link: String,
    /// Confirm the connection with one status check
    #[arg(long, default_value_t = false)]
    pub check: bool,
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    pub service: ConnectorService,
    /// Folder to list instead of the drive root
    #[arg(long)]
    pub folder: Option<String>,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    pub service: ConnectorService,
    /// Renders a failed callback
    #[arg(long, default_value_t = false)]
    pub failed: bool,
    #[arg(long)]
    pub message: Option<String>,
}

pub(crate) fn execute(
    context: &CtlContext,
    command: &ConnectCommands,
    format: OutputFormat,
) -> Result<()> {
    let scheme = context.config().oauth.redirect_scheme.as_str();
    match command {
        ConnectCommands::Link(args) => {
            let callback = OAuthCallback {
                success: !args.failed,
                message: args.message.clone(),
                service: Some(args.service.as_str().to_string()),
            };
            render(
                &LinkReport {
                    link: callback.render(scheme),
                },
                format,
            )
        }
        ConnectCommands::Callback(args) => {
            let callback = OAuthCallback::parse(&args.link, scheme)?;
            let mut report = CallbackReport::from(&callback);
            if args.check {
                let flow = flow(context, PathBuf::from("xdg-open"))?;
                let outcome = context.runtime()?.block_on(flow.complete(&callback))?;
                report.connected = Some(matches!(outcome, ConnectionOutcome::Connected(_)));
            }
            render(&report, format)
        }
        ConnectCommands::Status(args) => {
            let services: Vec<ConnectorService> = match args.service {
                Some(service) => vec![service],
                None => ConnectorService::ALL.to_vec(),
            };
            let flow = flow(context, PathBuf::from("xdg-open"))?;
            let results = context.runtime()?.block_on(flow.statuses(&services));
            let rows: Vec<ServiceStatus> = results
                .into_iter()
                .map(|(service, result)| ServiceStatus::new(service, result))
                .collect();
            render(&rows, format)
        }
        ConnectCommands::Files(args) => {
            let flow = flow(context, PathBuf::from("xdg-open"))?;
            let files = context
                .runtime()?
                .block_on(flow.files(args.service, args.folder.as_deref()))?;
            render(&files, format)
        }
        ConnectCommands::Start(args) => {
            let mut flow = flow(context, args.browser.clone())?;
            if args.interval.is_some() || args.attempts.is_some() {
                let oauth = &context.config().oauth;
                flow = flow.with_polling(
                    Duration::from_secs(args.interval.unwrap_or(oauth.poll_interval_seconds)),
                    args.attempts.unwrap_or(oauth.poll_attempts),
                );
            }
            let outcome = context.runtime()?.block_on(flow.connect(args.service))?;
            render(&ConnectReport::new(args.service, outcome), format)
        }
    }
}

fn flow(context: &CtlContext, browser: PathBuf) -> Result<OAuthFlow> {
    let backend = HttpConnectorBackend::new(context.api_client()?);
    Ok(OAuthFlow::new(
        Arc::new(backend),
        Arc::new(CommandLauncher::new(browser)),
        &context.config().oauth,
    ))
}
