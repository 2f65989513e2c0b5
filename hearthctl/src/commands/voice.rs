use std::io::BufRead;
use std::time::{Duration, Instant};

use clap::Args;
use hearth_core::lists::{ListStore, ListType};
use hearth_core::voice::{VoiceAction, VoiceConfig, VoiceSession};
use serde::Serialize;
use tracing::info;

use crate::{render, CtlContext, OutputFormat, Result};

#[derive(Args, Debug)]
pub struct VoiceArgs {
    /// Simulated milliseconds between transcripts; defaults to the grace window
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Create recognised lists in the selected family
    #[arg(long, default_value_t = false)]
    pub create: bool,
    /// Email recorded as the creator of created lists
    #[arg(long)]
    pub created_by: Option<String>,
}

/// One transcript and the session's response to it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoiceStep {
    pub transcript: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
}

impl VoiceStep {
    fn new(transcript: &str, action: &VoiceAction) -> Self {
        let mut step = Self {
            transcript: transcript.to_string(),
            action: "ignore",
            message: None,
            list_name: None,
            list_type: None,
            list_id: None,
        };
        match action {
            VoiceAction::Ignore => {}
            VoiceAction::Speak(text) => {
                step.action = "speak";
                step.message = Some(text.clone());
            }
            VoiceAction::CreateList { name, list_type } => {
                step.action = "create_list";
                step.list_name = Some(name.clone());
                step.list_type = Some(*list_type);
            }
            VoiceAction::NotUnderstood(text) => {
                step.action = "not_understood";
                step.message = Some(text.clone());
            }
            VoiceAction::GiveUp(text) => {
                step.action = "give_up";
                step.message = Some(text.clone());
            }
        }
        step
    }
}

pub(crate) fn execute(context: &CtlContext, args: &VoiceArgs, format: OutputFormat) -> Result<()> {
    let config = VoiceConfig::from(&context.config().voice);
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(config.grace_window);

    let stdin = std::io::stdin();
    let transcripts = stdin
        .lock()
        .lines()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut steps = replay(config, interval, &transcripts);
    if args.create {
        let family_id = context.family_id()?;
        let store = ListStore::new(context.database()?);
        for step in steps.iter_mut() {
            if let (Some(name), Some(list_type)) = (&step.list_name, step.list_type) {
                let list =
                    store.create_list(&family_id, name, list_type, args.created_by.as_deref())?;
                info!(target: "voice", list_id = %list.list_id, "list created from voice");
                step.list_id = Some(list.list_id);
            }
        }
    }
    render(&steps, format)
}

/// Feeds transcripts into a fresh session, spacing them `interval` apart.
/// Blank lines are skipped.
pub(crate) fn replay(config: VoiceConfig, interval: Duration, transcripts: &[String]) -> Vec<VoiceStep> {
    let mut session = VoiceSession::new(config);
    let start = Instant::now();
    transcripts
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, transcript)| {
            let now = start + interval * index as u32;
            let action = session.on_transcript(transcript, now);
            VoiceStep::new(transcript, &action)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn prompt_then_answer_creates_list() {
        let config = VoiceConfig::default();
        let steps = replay(
            config,
            config.grace_window,
            &lines(&["create list weekend errands", "", "shopping"]),
        );
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].action, "speak");
        assert_eq!(steps[1].action, "create_list");
        assert_eq!(steps[1].list_name.as_deref(), Some("weekend errands"));
        assert_eq!(steps[1].list_type, Some(ListType::Shopping));
    }

    #[test]
    fn answers_inside_grace_window_are_ignored() {
        let steps = replay(
            VoiceConfig::default(),
            Duration::from_millis(100),
            &lines(&["create list camping", "todo"]),
        );
        assert_eq!(steps[1].action, "ignore");
        assert!(steps[1].list_type.is_none());
    }

    #[test]
    fn unknown_phrase_is_not_understood() {
        let steps = replay(
            VoiceConfig::default(),
            Duration::from_secs(3),
            &lines(&["what's the weather"]),
        );
        assert_eq!(steps[0].action, "not_understood");
        assert!(steps[0].message.is_some());
    }
}
