use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HearthConfig {
    pub system: SystemSection,
    pub paths: PathsSection,
    pub api: ApiSection,
    #[serde(default)]
    pub voice: VoiceSection,
    #[serde(default)]
    pub oauth: OAuthSection,
}

impl HearthConfig {
    pub fn resolve_path<P: AsRef<Path>>(&self, candidate: P) -> PathBuf {
        let path = candidate.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.paths.base_dir).join(path)
        }
    }

    /// Location of the SQLite database, `paths.data_dir/paths.database`.
    pub fn database_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.data_dir)
            .join(&self.paths.database)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.oauth.redirect_scheme.contains(':') || self.oauth.redirect_scheme.is_empty() {
            return Err(ConfigError::Invalid {
                field: "oauth.redirect_scheme",
                reason: format!("`{}` is not a bare scheme", self.oauth.redirect_scheme),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemSection {
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    pub base_dir: String,
    pub data_dir: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    "hearth.sqlite".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    15
}

impl ApiSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceSection {
    pub grace_window_ms: u64,
    pub max_reprompts: u32,
}

impl Default for VoiceSection {
    fn default() -> Self {
        Self {
            grace_window_ms: 2000,
            max_reprompts: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthSection {
    pub redirect_scheme: String,
    pub poll_interval_seconds: u64,
    pub poll_attempts: u32,
}

impl Default for OAuthSection {
    fn default() -> Self {
        Self {
            redirect_scheme: "myapp".to_string(),
            poll_interval_seconds: 3,
            poll_attempts: 20,
        }
    }
}

pub fn load_hearth_config<P: AsRef<Path>>(path: P) -> Result<HearthConfig> {
    let config: HearthConfig = load_toml(path)?;
    config.validate()?;
    Ok(config)
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fixture_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../configs/hearth.toml");
        let config = load_hearth_config(path).expect("config should parse");
        assert_eq!(config.system.environment, "development");
        assert_eq!(config.voice.grace_window_ms, 2000);
        assert_eq!(config.oauth.redirect_scheme, "myapp");
        assert!(config.database_path().ends_with("data/hearth.sqlite"));
    }

    #[test]
    fn missing_voice_section_uses_defaults() {
        let config: HearthConfig = toml::from_str(
            r#"
            [system]
            environment = "test"
            [paths]
            base_dir = "/srv/hearth"
            data_dir = "data"
            [api]
            base_url = "https://example.test/api"
            "#,
        )
        .unwrap();
        assert_eq!(config.voice.max_reprompts, 3);
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/srv/hearth/data/hearth.sqlite")
        );
    }

    #[test]
    fn rejects_scheme_with_separator() {
        let mut config: HearthConfig = toml::from_str(
            r#"
            [system]
            environment = "test"
            [paths]
            base_dir = "."
            data_dir = "data"
            [api]
            base_url = "https://example.test/api"
            "#,
        )
        .unwrap();
        config.oauth.redirect_scheme = "myapp://".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "oauth.redirect_scheme", .. })
        ));
    }
}
