use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Session-wide selections every screen or command reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppContext {
    pub family_id: Option<String>,
    pub theme: Theme,
}

/// Owner of the current [`AppContext`]. Readers subscribe and are woken only
/// when a value actually changes.
#[derive(Debug)]
pub struct ContextHandle {
    sender: watch::Sender<AppContext>,
}

impl ContextHandle {
    pub fn new(initial: AppContext) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn current(&self) -> AppContext {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppContext> {
        self.sender.subscribe()
    }

    /// Returns whether the selection changed.
    pub fn select_family(&self, family_id: Option<String>) -> bool {
        self.sender.send_if_modified(|context| {
            if context.family_id == family_id {
                return false;
            }
            context.family_id = family_id;
            true
        })
    }

    pub fn set_theme(&self, theme: Theme) -> bool {
        self.sender.send_if_modified(|context| {
            if context.theme == theme {
                return false;
            }
            context.theme = theme;
            true
        })
    }
}

impl Default for ContextHandle {
    fn default() -> Self {
        Self::new(AppContext::default())
    }
}
