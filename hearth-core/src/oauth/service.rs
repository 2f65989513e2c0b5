use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::OAuthError;

/// A cloud service the family account can be connected to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorService {
    Outlook,
    OneDrive,
    GoogleDrive,
    GooglePhotos,
}

impl ConnectorService {
    pub const ALL: [ConnectorService; 4] = [
        ConnectorService::Outlook,
        ConnectorService::OneDrive,
        ConnectorService::GoogleDrive,
        ConnectorService::GooglePhotos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorService::Outlook => "outlook",
            ConnectorService::OneDrive => "onedrive",
            ConnectorService::GoogleDrive => "googledrive",
            ConnectorService::GooglePhotos => "googlephotos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectorService::Outlook => "Outlook",
            ConnectorService::OneDrive => "OneDrive",
            ConnectorService::GoogleDrive => "Google Drive",
            ConnectorService::GooglePhotos => "Google Photos",
        }
    }

    pub fn initiate_path(&self) -> String {
        format!("/{}/oauth/initiate/", self.as_str())
    }

    pub fn connection_path(&self) -> String {
        format!("/{}/connection/", self.as_str())
    }

    /// Only the document stores can be browsed.
    pub fn files_path(&self) -> Option<String> {
        match self {
            ConnectorService::OneDrive | ConnectorService::GoogleDrive => {
                Some(format!("/{}/files/", self.as_str()))
            }
            ConnectorService::Outlook | ConnectorService::GooglePhotos => None,
        }
    }
}

impl fmt::Display for ConnectorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorService {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outlook" => Ok(ConnectorService::Outlook),
            "onedrive" => Ok(ConnectorService::OneDrive),
            "googledrive" => Ok(ConnectorService::GoogleDrive),
            "googlephotos" => Ok(ConnectorService::GooglePhotos),
            other => Err(OAuthError::UnknownService(other.to_string())),
        }
    }
}

/// Body of `GET /{service}/connection/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default, alias = "account_email")]
    pub email: Option<String>,
    #[serde(default)]
    pub last_sync_at: Option<String>,
    #[serde(default, alias = "oauth_tokens_require_reconnection")]
    pub requires_reconnection: bool,
}

/// A file or folder in a connected drive. Field aliases cover both the
/// OneDrive and Google Drive spellings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloudFile {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "size_from_number_or_text")]
    pub size: Option<u64>,
    #[serde(default, alias = "modifiedTime", alias = "lastModifiedDateTime")]
    pub modified_at: Option<String>,
    #[serde(default, alias = "webViewLink", alias = "webUrl")]
    pub web_url: Option<String>,
    #[serde(default, alias = "isFolder")]
    pub is_folder: bool,
}

/// Google Drive reports sizes as strings.
fn size_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Option::<Size>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Size::Number(size)) => Ok(Some(size)),
        Some(Size::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_service_name() {
        assert_eq!(
            ConnectorService::GooglePhotos.initiate_path(),
            "/googlephotos/oauth/initiate/"
        );
        assert_eq!(ConnectorService::Outlook.connection_path(), "/outlook/connection/");
    }

    #[test]
    fn parses_service_names() {
        for service in ConnectorService::ALL {
            assert_eq!(service.as_str().parse::<ConnectorService>().unwrap(), service);
        }
        assert!("dropbox".parse::<ConnectorService>().is_err());
    }

    #[test]
    fn status_accepts_backend_aliases() {
        let status: ConnectionStatus = serde_json::from_str(
            r#"{"connected": true, "account_email": "pat@example.com"}"#,
        )
        .unwrap();
        assert!(status.connected);
        assert_eq!(status.email.as_deref(), Some("pat@example.com"));
        assert!(!status.requires_reconnection);
    }

    #[test]
    fn files_only_for_drives() {
        assert_eq!(
            ConnectorService::GoogleDrive.files_path().as_deref(),
            Some("/googledrive/files/")
        );
        assert_eq!(ConnectorService::GooglePhotos.files_path(), None);
    }

    #[test]
    fn drive_files_accept_both_spellings() {
        let google: CloudFile = serde_json::from_str(
            r#"{"id": "1a", "name": "Lease.pdf", "mimeType": "application/pdf", "size": "2048", "modifiedTime": "2025-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(google.size, Some(2048));
        assert_eq!(google.mime_type.as_deref(), Some("application/pdf"));

        let onedrive: CloudFile = serde_json::from_str(
            r#"{"id": "B!12", "name": "Taxes", "size": 0, "lastModifiedDateTime": "2025-02-01T08:00:00Z", "webUrl": "https://onedrive.live.com/x", "is_folder": true}"#,
        )
        .unwrap();
        assert!(onedrive.is_folder);
        assert_eq!(onedrive.modified_at.as_deref(), Some("2025-02-01T08:00:00Z"));
        assert_eq!(onedrive.mime_type, None);
    }
}
