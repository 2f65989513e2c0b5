use std::fmt;

use url::form_urlencoded;
use url::Url;

use super::error::{OAuthError, OAuthResult};
use super::service::ConnectorService;

const CALLBACK_HOST: &str = "oauth";
const CALLBACK_PATH: &str = "/callback";

/// The deep link the backend redirects to once a provider grant finishes:
/// `<scheme>://oauth/callback?success=<bool>&message=<text>&service=<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCallback {
    pub success: bool,
    pub message: Option<String>,
    pub service: Option<String>,
}

impl OAuthCallback {
    pub fn parse(link: &str, scheme: &str) -> OAuthResult<Self> {
        let url = Url::parse(link.trim())
            .map_err(|err| OAuthError::InvalidCallback(format!("{link}: {err}")))?;
        if url.scheme() != scheme {
            return Err(OAuthError::InvalidCallback(format!(
                "expected scheme `{scheme}`, got `{}`",
                url.scheme()
            )));
        }
        if url.host_str() != Some(CALLBACK_HOST) || url.path() != CALLBACK_PATH {
            return Err(OAuthError::InvalidCallback(format!(
                "`{link}` is not an oauth callback"
            )));
        }

        let mut success = None;
        let mut message = None;
        let mut service = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "success" => {
                    success = Some(match value.as_ref() {
                        "true" => true,
                        "false" => false,
                        other => {
                            return Err(OAuthError::InvalidCallback(format!(
                                "success must be `true` or `false`, got `{other}`"
                            )))
                        }
                    })
                }
                "message" => message = Some(value.into_owned()),
                "service" => service = Some(value.into_owned()),
                _ => {}
            }
        }
        let success = success
            .ok_or_else(|| OAuthError::InvalidCallback("missing `success` parameter".into()))?;
        Ok(Self {
            success,
            message,
            service,
        })
    }

    /// Renders the link back in the same parameter order it is parsed from.
    pub fn render(&self, scheme: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("success", if self.success { "true" } else { "false" });
        if let Some(message) = &self.message {
            query.append_pair("message", message);
        }
        if let Some(service) = &self.service {
            query.append_pair("service", service);
        }
        format!(
            "{scheme}://{CALLBACK_HOST}{CALLBACK_PATH}?{}",
            query.finish()
        )
    }

    pub fn connector(&self) -> Option<ConnectorService> {
        self.service.as_deref()?.parse().ok()
    }
}

impl fmt::Display for OAuthCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let service = self.service.as_deref().unwrap_or("unknown service");
        let outcome = if self.success { "connected" } else { "failed" };
        match &self.message {
            Some(message) => write!(f, "{service} {outcome}: {message}"),
            None => write!(f, "{service} {outcome}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_encoded_message() {
        let callback = OAuthCallback::parse(
            "myapp://oauth/callback?success=false&message=Access%20denied%21&service=onedrive",
            "myapp",
        )
        .unwrap();
        assert!(!callback.success);
        assert_eq!(callback.message.as_deref(), Some("Access denied!"));
        assert_eq!(callback.connector(), Some(ConnectorService::OneDrive));
    }

    #[test]
    fn service_is_optional() {
        let callback = OAuthCallback::parse("myapp://oauth/callback?success=true", "myapp").unwrap();
        assert!(callback.success);
        assert_eq!(callback.service, None);
        assert_eq!(callback.render("myapp"), "myapp://oauth/callback?success=true");
    }

    #[test]
    fn rejects_foreign_links() {
        assert!(OAuthCallback::parse("otherapp://oauth/callback?success=true", "myapp").is_err());
        assert!(OAuthCallback::parse("myapp://oauth/done?success=true", "myapp").is_err());
        assert!(OAuthCallback::parse("myapp://oauth/callback?success=yes", "myapp").is_err());
        assert!(OAuthCallback::parse("myapp://oauth/callback?message=hi", "myapp").is_err());
    }
}
