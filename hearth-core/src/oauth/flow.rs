use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use super::callback::OAuthCallback;
use super::error::{OAuthError, OAuthResult};
use super::service::{CloudFile, ConnectionStatus, ConnectorService};
use crate::api::ApiClient;
use crate::config::OAuthSection;

/// Server side of the connector flow.
#[async_trait]
pub trait ConnectorBackend: Send + Sync {
    /// Starts a grant and returns the provider authorization URL.
    async fn initiate(&self, service: ConnectorService) -> OAuthResult<String>;
    async fn connection_status(&self, service: ConnectorService) -> OAuthResult<ConnectionStatus>;
    /// Lists a drive folder, the root when `folder_id` is `None`.
    async fn list_files(
        &self,
        service: ConnectorService,
        folder_id: Option<&str>,
    ) -> OAuthResult<Vec<CloudFile>>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FilesResponse {
    Bare(Vec<CloudFile>),
    Wrapped {
        #[serde(alias = "value")]
        files: Vec<CloudFile>,
    },
}

#[derive(Debug, Serialize)]
struct FilesQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct InitiateResponse {
    auth_url: String,
}

pub struct HttpConnectorBackend {
    api: ApiClient,
}

impl HttpConnectorBackend {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ConnectorBackend for HttpConnectorBackend {
    async fn initiate(&self, service: ConnectorService) -> OAuthResult<String> {
        let response: InitiateResponse = self.api.post(&service.initiate_path(), &json!({})).await?;
        Ok(response.auth_url)
    }

    async fn connection_status(&self, service: ConnectorService) -> OAuthResult<ConnectionStatus> {
        Ok(self.api.get(&service.connection_path()).await?)
    }

    async fn list_files(
        &self,
        service: ConnectorService,
        folder_id: Option<&str>,
    ) -> OAuthResult<Vec<CloudFile>> {
        let path = service.files_path().ok_or(OAuthError::Unsupported {
            service,
            operation: "file listing",
        })?;
        let response: FilesResponse = self
            .api
            .get_with_query(&path, &FilesQuery { folder_id })
            .await?;
        Ok(match response {
            FilesResponse::Bare(files) | FilesResponse::Wrapped { files } => files,
        })
    }
}

/// Hands the authorization URL to whatever shows it to the user.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self, url: &str) -> OAuthResult<()>;
}

/// Opens URLs with an external program such as `xdg-open` or `open`.
pub struct CommandLauncher {
    program: PathBuf,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for CommandLauncher {
    async fn open(&self, url: &str) -> OAuthResult<()> {
        let status = Command::new(&self.program)
            .arg(url)
            .status()
            .await
            .map_err(|err| OAuthError::Launch(format!("{}: {err}", self.program.display())))?;
        if !status.success() {
            return Err(OAuthError::Launch(format!(
                "{} exited with {status}",
                self.program.display()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Connected(ConnectionStatus),
    /// The user did not finish the grant within the polling budget.
    Pending { attempts: u32 },
}

pub struct OAuthFlow {
    backend: Arc<dyn ConnectorBackend>,
    launcher: Arc<dyn BrowserLauncher>,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl OAuthFlow {
    pub fn new(
        backend: Arc<dyn ConnectorBackend>,
        launcher: Arc<dyn BrowserLauncher>,
        config: &OAuthSection,
    ) -> Self {
        Self {
            backend,
            launcher,
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            poll_attempts: config.poll_attempts,
        }
    }

    pub fn with_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    /// Runs initiate, browser hand-off and status polling in order. Any
    /// failure ends the flow.
    pub async fn connect(&self, service: ConnectorService) -> OAuthResult<ConnectionOutcome> {
        let auth_url = self.backend.initiate(service).await?;
        if Url::parse(&auth_url).is_err() {
            return Err(OAuthError::InvalidAuthUrl { url: auth_url });
        }
        info!(target: "oauth", %service, "authorization started");
        self.launcher.open(&auth_url).await?;

        for attempt in 1..=self.poll_attempts {
            sleep(self.poll_interval).await;
            let status = self.backend.connection_status(service).await?;
            if status.connected {
                info!(target: "oauth", %service, attempt, "service connected");
                return Ok(ConnectionOutcome::Connected(status));
            }
            if status.requires_reconnection {
                return Err(OAuthError::ReconnectRequired(service));
            }
            debug!(target: "oauth", %service, attempt, "still waiting for authorization");
        }
        warn!(
            target: "oauth",
            %service,
            attempts = self.poll_attempts,
            "authorization not completed in time"
        );
        Ok(ConnectionOutcome::Pending {
            attempts: self.poll_attempts,
        })
    }

    /// Resolves a deep-link callback into a connection outcome with a single
    /// status check.
    pub async fn complete(&self, callback: &OAuthCallback) -> OAuthResult<ConnectionOutcome> {
        let service = match callback.service.as_deref() {
            Some(name) => name.parse::<ConnectorService>()?,
            None => {
                return Err(OAuthError::InvalidCallback(
                    "callback does not name a service".into(),
                ))
            }
        };
        if !callback.success {
            return Err(OAuthError::Denied {
                service,
                message: callback
                    .message
                    .clone()
                    .unwrap_or_else(|| "authorization failed".to_string()),
            });
        }
        let status = self.backend.connection_status(service).await?;
        if status.connected {
            Ok(ConnectionOutcome::Connected(status))
        } else {
            Ok(ConnectionOutcome::Pending { attempts: 1 })
        }
    }

    pub async fn files(
        &self,
        service: ConnectorService,
        folder_id: Option<&str>,
    ) -> OAuthResult<Vec<CloudFile>> {
        if service.files_path().is_none() {
            return Err(OAuthError::Unsupported {
                service,
                operation: "file listing",
            });
        }
        let files = self.backend.list_files(service, folder_id).await?;
        debug!(target: "oauth", %service, count = files.len(), "listed drive files");
        Ok(files)
    }

    /// Fetches the status of every given service concurrently, in input
    /// order.
    pub async fn statuses(
        &self,
        services: &[ConnectorService],
    ) -> Vec<(ConnectorService, OAuthResult<ConnectionStatus>)> {
        let checks = services.iter().map(|service| {
            let backend = Arc::clone(&self.backend);
            let service = *service;
            async move { (service, backend.connection_status(service).await) }
        });
        join_all(checks).await
    }
}
