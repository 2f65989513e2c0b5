use thiserror::Error;

use super::service::ConnectorService;
use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unknown connector service: {0}")]
    UnknownService(String),
    #[error("invalid oauth callback: {0}")]
    InvalidCallback(String),
    #[error("backend returned an unusable authorization url `{url}`")]
    InvalidAuthUrl { url: String },
    #[error("failed to open browser: {0}")]
    Launch(String),
    #[error("{service} authorization was not completed: {message}")]
    Denied {
        service: ConnectorService,
        message: String,
    },
    #[error("{service} does not offer {operation}")]
    Unsupported {
        service: ConnectorService,
        operation: &'static str,
    },
    #[error("{0} needs to be reconnected")]
    ReconnectRequired(ConnectorService),
}

pub type OAuthResult<T> = std::result::Result<T, OAuthError>;

impl OAuthError {
    /// True when the user should be sent through the connect flow again.
    pub fn needs_reconnect(&self) -> bool {
        match self {
            OAuthError::ReconnectRequired(_) => true,
            OAuthError::Api(err) => err.needs_reconnect(),
            OAuthError::Denied { message, .. } => {
                let message = message.to_lowercase();
                message.contains("reconnect") || message.contains("token expired")
            }
            _ => false,
        }
    }
}
