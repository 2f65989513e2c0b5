use std::time::{Duration, Instant};

use hearth_core::lists::ListType;
use hearth_core::voice::{
    match_list_type, parse_create_list, VoiceAction, VoiceConfig, VoiceSession, VoiceState,
    LIST_TYPE_PROMPT, LIST_TYPE_REPROMPT,
};

fn session(max_reprompts: u32) -> VoiceSession {
    VoiceSession::new(VoiceConfig {
        grace_window: Duration::from_millis(2000),
        max_reprompts,
    })
}

#[test]
fn aliases_resolve_list_types() {
    for phrase in ["todo", "to do", "To-Do", "1", "one", "a todo please"] {
        assert_eq!(match_list_type(phrase), Some(ListType::Todo), "{phrase}");
    }
    assert_eq!(match_list_type("two"), Some(ListType::Grocery));
    assert_eq!(match_list_type("Shopping."), Some(ListType::Shopping));
    assert_eq!(match_list_type("4"), Some(ListType::Other));
    assert_eq!(match_list_type("say todo"), None);
    assert_eq!(match_list_type("what type of list"), None);
    assert_eq!(match_list_type("banana"), None);
}

#[test]
fn parses_create_list_phrases() {
    let intent = parse_create_list("Create list called Weekend chores.").unwrap();
    assert_eq!(intent.name, "Weekend chores");
    assert_eq!(intent.list_type, None);

    let intent = parse_create_list("make a new grocery list named Costco").unwrap();
    assert_eq!(intent.name, "Costco");
    assert_eq!(intent.list_type, Some(ListType::Grocery));

    assert!(parse_create_list("what's the weather").is_none());
    assert!(parse_create_list("create list").is_none());
    assert!(parse_create_list("create a list called").is_none());
    assert!(parse_create_list("create list named.").is_none());
    assert_eq!(
        parse_create_list("new list called Named Things").unwrap().name,
        "Named Things"
    );
}

#[test]
fn inline_type_creates_immediately() {
    let mut session = session(3);
    let action = session.on_transcript("create a shopping list called Gifts", Instant::now());
    assert_eq!(
        action,
        VoiceAction::CreateList {
            name: "Gifts".into(),
            list_type: ListType::Shopping
        }
    );
    assert!(session.is_idle());
}

#[test]
fn grace_window_ignores_prompt_echo() {
    let mut session = session(3);
    let start = Instant::now();
    assert_eq!(
        session.on_transcript("create list Camping", start),
        VoiceAction::Speak(LIST_TYPE_PROMPT.to_string())
    );
    assert_eq!(
        session.on_transcript("todo", start + Duration::from_millis(500)),
        VoiceAction::Ignore
    );
    assert!(matches!(session.state(), VoiceState::AwaitingListType { .. }));

    let action = session.on_transcript("todo", start + Duration::from_millis(2500));
    assert_eq!(
        action,
        VoiceAction::CreateList {
            name: "Camping".into(),
            list_type: ListType::Todo
        }
    );
    assert!(session.is_idle());
}

#[test]
fn gives_up_after_reprompt_budget() {
    let mut session = session(2);
    let mut now = Instant::now();
    session.on_transcript("create list Camping", now);

    for _ in 0..2 {
        now += Duration::from_secs(3);
        assert_eq!(
            session.on_transcript("banana", now),
            VoiceAction::Speak(LIST_TYPE_REPROMPT.to_string())
        );
    }
    now += Duration::from_secs(3);
    assert!(matches!(session.on_transcript("banana", now), VoiceAction::GiveUp(_)));
    assert!(session.is_idle());
}

#[test]
fn reprompt_restarts_grace_window() {
    let mut session = session(3);
    let start = Instant::now();
    session.on_transcript("create list Camping", start);
    session.on_transcript("hmm", start + Duration::from_secs(3));
    assert_eq!(
        session.on_transcript("todo", start + Duration::from_secs(4)),
        VoiceAction::Ignore
    );
}

#[test]
fn unknown_phrase_is_not_understood() {
    let mut session = session(3);
    assert!(matches!(
        session.on_transcript("play some music", Instant::now()),
        VoiceAction::NotUnderstood(_)
    ));
    assert!(session.is_idle());
}
