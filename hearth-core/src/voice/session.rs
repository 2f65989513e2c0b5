use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::parser::{match_list_type, parse_create_list};
use crate::config::VoiceSection;
use crate::lists::ListType;

pub const LIST_TYPE_PROMPT: &str =
    "What type of list is this? Say todo, grocery, shopping, or other.";
pub const LIST_TYPE_REPROMPT: &str =
    "Sorry, I didn't catch that. Say todo, grocery, shopping, or other.";
pub const GIVE_UP_MESSAGE: &str = "Okay, I didn't create the list. Try again from the mic button.";
pub const NOT_UNDERSTOOD_MESSAGE: &str = "Try saying \"create list\" followed by a name.";

#[derive(Debug, Clone, Copy)]
pub struct VoiceConfig {
    /// Transcripts this soon after a spoken prompt are treated as echo.
    pub grace_window: Duration,
    pub max_reprompts: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            grace_window: Duration::from_millis(2000),
            max_reprompts: 3,
        }
    }
}

impl From<&VoiceSection> for VoiceConfig {
    fn from(section: &VoiceSection) -> Self {
        Self {
            grace_window: Duration::from_millis(section.grace_window_ms),
            max_reprompts: section.max_reprompts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    AwaitingListType {
        pending_name: String,
        prompted_at: Instant,
        reprompts: u32,
    },
}

/// What the caller must do after a transcript, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceAction {
    /// Transcript dropped (inside the grace window).
    Ignore,
    /// Speak the text, then restart listening.
    Speak(String),
    CreateList { name: String, list_type: ListType },
    NotUnderstood(String),
    GiveUp(String),
}

#[derive(Debug)]
pub struct VoiceSession {
    state: VoiceState,
    config: VoiceConfig,
}

impl VoiceSession {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            state: VoiceState::Idle,
            config,
        }
    }

    pub fn state(&self) -> &VoiceState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, VoiceState::Idle)
    }

    pub fn cancel(&mut self) {
        if !self.is_idle() {
            info!(target: "voice", "voice session cancelled");
        }
        self.state = VoiceState::Idle;
    }

    pub fn on_transcript(&mut self, transcript: &str, now: Instant) -> VoiceAction {
        let state = std::mem::replace(&mut self.state, VoiceState::Idle);
        match state {
            VoiceState::Idle => self.handle_idle(transcript, now),
            VoiceState::AwaitingListType {
                pending_name,
                prompted_at,
                reprompts,
            } => self.handle_awaiting(transcript, now, pending_name, prompted_at, reprompts),
        }
    }

    fn handle_idle(&mut self, transcript: &str, now: Instant) -> VoiceAction {
        let Some(intent) = parse_create_list(transcript) else {
            debug!(target: "voice", transcript, "no create-list intent");
            return VoiceAction::NotUnderstood(NOT_UNDERSTOOD_MESSAGE.to_string());
        };
        if let Some(list_type) = intent.list_type {
            info!(target: "voice", name = %intent.name, %list_type, "create list with inline type");
            return VoiceAction::CreateList {
                name: intent.name,
                list_type,
            };
        }
        info!(target: "voice", name = %intent.name, "awaiting list type");
        self.state = VoiceState::AwaitingListType {
            pending_name: intent.name,
            prompted_at: now,
            reprompts: 0,
        };
        VoiceAction::Speak(LIST_TYPE_PROMPT.to_string())
    }

    fn handle_awaiting(
        &mut self,
        transcript: &str,
        now: Instant,
        pending_name: String,
        prompted_at: Instant,
        reprompts: u32,
    ) -> VoiceAction {
        if now.saturating_duration_since(prompted_at) < self.config.grace_window {
            debug!(target: "voice", transcript, "ignored inside grace window");
            self.state = VoiceState::AwaitingListType {
                pending_name,
                prompted_at,
                reprompts,
            };
            return VoiceAction::Ignore;
        }

        if let Some(list_type) = match_list_type(transcript) {
            info!(target: "voice", name = %pending_name, %list_type, "list type recognised");
            return VoiceAction::CreateList {
                name: pending_name,
                list_type,
            };
        }

        if reprompts >= self.config.max_reprompts {
            info!(target: "voice", name = %pending_name, reprompts, "reprompt budget exhausted");
            return VoiceAction::GiveUp(GIVE_UP_MESSAGE.to_string());
        }

        self.state = VoiceState::AwaitingListType {
            pending_name,
            prompted_at: now,
            reprompts: reprompts + 1,
        };
        VoiceAction::Speak(LIST_TYPE_REPROMPT.to_string())
    }
}
