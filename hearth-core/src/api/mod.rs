//! Bearer-token JSON client for the family organizer REST backend.

pub mod error;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

pub use error::{error_message, ApiError, ApiResult, ErrorClass};

use crate::config::ApiSection;

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const PROFILE_PATH: &str = "/profile/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiSection) -> ApiResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/lists/`.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&url).map_err(|source| ApiError::InvalidUrl { url, source })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.client.get(self.endpoint(path)?);
        self.send(request).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.get(self.endpoint(path)?).query(query);
        self.send(request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.endpoint(path)?).json(body);
        self.send(request).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.patch(self.endpoint(path)?).json(body);
        self.send(request).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.client.delete(self.endpoint(path)?);
        self.send::<Value>(request).await.map(|_| ())
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthTokens> {
        self.post(LOGIN_PATH, &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn register(&self, registration: &Registration<'_>) -> ApiResult<AuthTokens> {
        self.post(REGISTER_PATH, registration).await
    }

    pub async fn profile(&self) -> ApiResult<Value> {
        self.get(PROFILE_PATH).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;
        debug!(target: "api", %url, status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            let data = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
            };
            let message = error_message(status.as_u16(), status.canonical_reason(), &data);
            warn!(target: "api", %url, status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
                data,
            });
        }
        if body.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(base_url: &str) -> ApiSection {
        ApiSection {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = ApiClient::new(&section("http://localhost:8000/api/")).unwrap();
        assert_eq!(
            client.endpoint("/lists/").unwrap().as_str(),
            "http://localhost:8000/api/lists/"
        );
        assert_eq!(
            client.endpoint("onedrive/oauth/initiate/").unwrap().as_str(),
            "http://localhost:8000/api/onedrive/oauth/initiate/"
        );
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = ApiClient::new(&section("localhost/api")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn token_is_optional() {
        let client = ApiClient::new(&section("http://localhost:8000/api")).unwrap();
        assert_eq!(client.token(), None);
        assert_eq!(client.with_token("abc").token(), Some("abc"));
    }
}
