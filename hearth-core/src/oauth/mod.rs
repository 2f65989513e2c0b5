//! Cloud connector authorization: service catalogue, deep-link callback and
//! the initiate, open and poll sequence.

pub mod callback;
pub mod error;
pub mod flow;
pub mod service;

pub use callback::OAuthCallback;
pub use error::{OAuthError, OAuthResult};
pub use flow::{
    BrowserLauncher, CommandLauncher, ConnectionOutcome, ConnectorBackend, HttpConnectorBackend,
    OAuthFlow,
};
pub use service::{CloudFile, ConnectionStatus, ConnectorService};
